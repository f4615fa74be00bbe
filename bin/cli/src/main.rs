// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod cli;
mod command;
mod error;

use std::{io, process::ExitCode};

use catchup_store_sqlite::SqliteStore;
use catchup_type::Result;
use clap::Parser;
use tokio::signal;
use tracing::{error, warn};

use crate::cli::{Cli, Command, init_logging};

#[tokio::main]
async fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logging(cli.log_filter.as_deref(), cli.log_format);

	match run(cli).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!(code = %err.code(), "command failed");
			eprintln!("{err}");
			ExitCode::FAILURE
		}
	}
}

async fn run(cli: Cli) -> Result<()> {
	let store = SqliteStore::new(cli.sqlite_config())?;

	match cli.command {
		Command::Init => command::init(&store).await,
		Command::Append => command::append(&store, io::stdin().lock(), io::stdout().lock()).await.map(|_| ()),
		Command::Status {
			reader,
		} => command::status(&store, &reader, io::stdout().lock()).await,
		Command::Read(args) => {
			let ctrl_c = async {
				if let Err(err) = signal::ctrl_c().await {
					warn!("ctrl-c listener error: {err}");
				}
			};
			command::read(store, &args, ctrl_c).await
		}
	}
}
