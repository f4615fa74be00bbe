// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{path::PathBuf, time::Duration};

use catchup_core::{InstanceId, ReadFilter, ReaderConfig, defaults};
use catchup_store_sqlite::SqliteConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt};

pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "catchup", version, about = "Competing-consumers reader for a partitioned event log")]
pub struct Cli {
	/// SQLite database file holding the events and bookmarks tables
	#[arg(long, env = "CATCHUP_DB", default_value = "catchup.db", global = true)]
	pub db: PathBuf,

	/// Filter directives (e.g. "info,catchup_reader=debug"); overrides RUST_LOG
	#[arg(long, env = "CATCHUP_LOG", global = true)]
	pub log_filter: Option<String>,

	#[arg(long, env = "CATCHUP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
	pub log_format: LogFormat,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
	Text,
	Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Create the events and bookmarks tables
	Init,
	/// Append events read as JSON lines from stdin
	Append,
	/// Run a reader instance and print every delivered event as a JSON line
	Read(ReadArgs),
	/// Print the bookmarks of a reader
	Status {
		#[arg(long, env = "CATCHUP_READER")]
		reader: String,
	},
}

#[derive(Args, Debug)]
pub struct ReadArgs {
	/// Name of the consumer group
	#[arg(long, env = "CATCHUP_READER")]
	pub reader: String,

	/// Identity of this instance; random when absent
	#[arg(long, env = "CATCHUP_INSTANCE")]
	pub instance: Option<String>,

	#[arg(long, env = "CATCHUP_LIMIT", default_value_t = defaults::DEFAULT_LIMIT)]
	pub limit: u32,

	#[arg(long, env = "CATCHUP_LEASE_WINDOW_MS", default_value_t = defaults::DEFAULT_LEASE_WINDOW.as_millis() as u64)]
	pub lease_window_ms: u64,

	#[arg(long, env = "CATCHUP_LEASE_TTL_MS", default_value_t = defaults::DEFAULT_LEASE_TTL.as_millis() as u64)]
	pub lease_ttl_ms: u64,

	#[arg(
		long,
		env = "CATCHUP_DRAINED_BACKOFF_MS",
		default_value_t = defaults::DEFAULT_DRAINED_BACKOFF.as_millis() as u64
	)]
	pub drained_backoff_ms: u64,

	#[arg(long, env = "CATCHUP_IDLE_BACKOFF_MS", default_value_t = defaults::DEFAULT_IDLE_BACKOFF.as_millis() as u64)]
	pub idle_backoff_ms: u64,

	/// Only deliver events of these types
	#[arg(long = "type", value_delimiter = ',')]
	pub types: Vec<String>,

	#[arg(long = "aggregate-type", value_delimiter = ',')]
	pub aggregate_types: Vec<String>,

	#[arg(long = "aggregate-id", value_delimiter = ',')]
	pub aggregate_ids: Vec<String>,

	#[arg(long = "actor", value_delimiter = ',')]
	pub actors: Vec<String>,
}

impl ReadArgs {
	pub fn reader_config(&self) -> ReaderConfig {
		let filter = ReadFilter::new()
			.with_types(self.types.iter().cloned())
			.with_aggregate_types(self.aggregate_types.iter().cloned())
			.with_aggregate_ids(self.aggregate_ids.iter().cloned())
			.with_actors(self.actors.iter().cloned());

		ReaderConfig::new(self.reader.as_str())
			.with_limit(self.limit)
			.with_lease_window(Duration::from_millis(self.lease_window_ms))
			.with_lease_ttl(Duration::from_millis(self.lease_ttl_ms))
			.with_drained_backoff(Duration::from_millis(self.drained_backoff_ms))
			.with_idle_backoff(Duration::from_millis(self.idle_backoff_ms))
			.with_filter(filter)
	}

	pub fn instance(&self) -> InstanceId {
		self.instance.clone().map(InstanceId::new).unwrap_or_else(InstanceId::random)
	}
}

impl Cli {
	pub fn sqlite_config(&self) -> SqliteConfig {
		SqliteConfig::new(&self.db)
	}
}

/// Installs the global subscriber. Logs go to stderr so stdout stays
/// reserved for event output.
pub fn init_logging(filter: Option<&str>, format: LogFormat) {
	let filter = match filter {
		Some(directives) => EnvFilter::new(directives),
		None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
	};

	let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
	match format {
		LogFormat::Text => builder.init(),
		LogFormat::Json => builder.json().init(),
	}
}
