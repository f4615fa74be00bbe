// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! SQLite connection owned by a dedicated thread.
//!
//! rusqlite connections block, so every statement runs on the connection
//! thread. Async callers send a closure over a channel and await the reply on
//! a oneshot, which keeps the runtime free while SQLite works or waits on a
//! lock held by another process.

use std::{
	sync::{Arc, Mutex},
	thread,
};

use catchup_type::Result;
use crossbeam_channel::{Receiver, Sender, unbounded};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::{
	config::{DbPath, OpenFlags, SqliteConfig},
	error::StoreError,
};

type Job = Box<dyn FnOnce(&mut rusqlite::Connection) + Send>;

enum Command {
	Call(Job),
	Shutdown,
}

#[derive(Clone)]
pub(crate) struct Connection {
	inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
	sender: Sender<Command>,
	thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Drop for ConnectionInner {
	fn drop(&mut self) {
		let _ = self.sender.send(Command::Shutdown);

		if let Ok(mut thread) = self.thread.lock() {
			if let Some(handle) = thread.take() {
				let _ = handle.join();
			}
		}
	}
}

impl Connection {
	pub(crate) fn open(config: &SqliteConfig) -> Result<Self> {
		let conn = connect(&config.path, convert_flags(&config.flags))?;

		configure(&conn, config).map_err(|e| StoreError::Open {
			path: describe(&config.path),
			reason: e.to_string(),
		})?;

		let (sender, receiver) = unbounded();
		let thread = thread::Builder::new()
			.name("catchup-sqlite".to_string())
			.spawn(move || run(receiver, conn))
			.map_err(|e| StoreError::Open {
				path: describe(&config.path),
				reason: e.to_string(),
			})?;

		Ok(Self {
			inner: Arc::new(ConnectionInner {
				sender,
				thread: Mutex::new(Some(thread)),
			}),
		})
	}

	/// Runs `f` on the connection thread and waits for its result.
	pub(crate) async fn call<F, R>(&self, operation: &'static str, f: F) -> Result<R>
	where
		F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<R> + Send + 'static,
		R: Send + 'static,
	{
		let (respond_to, receiver) = oneshot::channel();

		let job: Job = Box::new(move |conn| {
			let _ = respond_to.send(f(conn));
		});

		self.inner.sender.send(Command::Call(job)).map_err(|_| StoreError::Disconnected)?;

		let result = receiver.await.map_err(|_| StoreError::Disconnected)?;
		result.map_err(|e| StoreError::from_sqlite(operation, e).into())
	}
}

fn run(receiver: Receiver<Command>, mut conn: rusqlite::Connection) {
	debug!(name: "sqlite_connection", "connection thread started");

	while let Ok(command) = receiver.recv() {
		match command {
			Command::Call(job) => job(&mut conn),
			Command::Shutdown => {
				info!(name: "sqlite_connection", "connection thread shutting down");
				break;
			}
		}
	}
}

fn connect(path: &DbPath, flags: rusqlite::OpenFlags) -> Result<rusqlite::Connection> {
	let opened = match resolve_db_path(path) {
		DbPath::File(file) => rusqlite::Connection::open_with_flags(file, flags),
		DbPath::Memory => rusqlite::Connection::open_in_memory_with_flags(flags),
	};

	opened.map_err(|e| {
		StoreError::Open {
			path: describe(path),
			reason: e.to_string(),
		}
		.into()
	})
}

fn configure(conn: &rusqlite::Connection, config: &SqliteConfig) -> rusqlite::Result<()> {
	conn.busy_timeout(config.busy_timeout)?;
	conn.pragma_update(None, "journal_mode", config.journal_mode.as_str())?;
	conn.pragma_update(None, "synchronous", config.synchronous_mode.as_str())?;
	conn.pragma_update(None, "foreign_keys", "ON")?;
	Ok(())
}

/// Resolve the database path, creating directories as needed.
fn resolve_db_path(path: &DbPath) -> DbPath {
	match path {
		DbPath::Memory => DbPath::Memory,
		DbPath::File(config_path) => {
			let is_uri = config_path.to_string_lossy().contains(':');
			if is_uri {
				DbPath::File(config_path.clone())
			} else if config_path.extension().is_none() {
				std::fs::create_dir_all(config_path).ok();
				DbPath::File(config_path.join("catchup.db"))
			} else {
				if let Some(parent) = config_path.parent() {
					std::fs::create_dir_all(parent).ok();
				}
				DbPath::File(config_path.clone())
			}
		}
	}
}

fn describe(path: &DbPath) -> String {
	match path {
		DbPath::File(file) => file.display().to_string(),
		DbPath::Memory => ":memory:".to_string(),
	}
}

fn convert_flags(flags: &OpenFlags) -> rusqlite::OpenFlags {
	let mut rusqlite_flags = rusqlite::OpenFlags::empty();

	if flags.read_write {
		rusqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE;
	}
	if flags.create {
		rusqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_CREATE;
	}
	if flags.full_mutex {
		rusqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX;
	}
	if flags.no_mutex {
		rusqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX;
	}
	if flags.uri {
		rusqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_URI;
	}

	rusqlite_flags
}
