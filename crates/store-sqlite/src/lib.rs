// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! SQLite implementation of the catchup storage interfaces.
//!
//! One [`SqliteStore`] owns one connection. Instances that compete for the
//! same partitions open their own store on the same database file; the
//! bookmark table is the only thing they share.

mod append;
pub mod config;
mod connection;
pub mod error;
mod lease;
mod query;
pub mod row;
mod scan;
mod schema;

use catchup_type::Result;
pub use config::{DbPath, JournalMode, OpenFlags, SqliteConfig, SynchronousMode};
use connection::Connection;
pub use error::StoreError;
pub use row::EventRow;
use tracing::instrument;

#[derive(Clone)]
pub struct SqliteStore {
	conn: Connection,
}

impl SqliteStore {
	#[instrument(name = "store::sqlite::new", level = "info", skip(config), fields(
		db_path = ?config.path,
		journal_mode = %config.journal_mode.as_str()
	))]
	pub fn new(config: SqliteConfig) -> Result<Self> {
		Ok(Self {
			conn: Connection::open(&config)?,
		})
	}

	/// Creates the `events` and `bookmarks` tables if they do not exist yet.
	#[instrument(name = "store::sqlite::install_schema", level = "debug", skip(self))]
	pub async fn install_schema(&self) -> Result<()> {
		self.conn.call("install schema", |conn| conn.execute_batch(schema::SCHEMA)).await
	}

	/// In-memory store with the schema installed.
	pub async fn testing_memory() -> Self {
		let store = Self::new(SqliteConfig::in_memory()).expect("failed to open in-memory database");
		store.install_schema().await.expect("failed to install schema");
		store
	}
}
