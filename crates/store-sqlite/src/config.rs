// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	path::{Path, PathBuf},
	time::Duration,
};

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbPath {
	/// A database file; a path without extension is treated as a directory
	/// holding `catchup.db`.
	File(PathBuf),
	/// A private in-memory database, visible only to the store that opened it.
	Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
	Delete,
	Truncate,
	Persist,
	Memory,
	Wal,
	Off,
}

impl JournalMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			JournalMode::Delete => "DELETE",
			JournalMode::Truncate => "TRUNCATE",
			JournalMode::Persist => "PERSIST",
			JournalMode::Memory => "MEMORY",
			JournalMode::Wal => "WAL",
			JournalMode::Off => "OFF",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynchronousMode {
	Off,
	Normal,
	Full,
	Extra,
}

impl SynchronousMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			SynchronousMode::Off => "OFF",
			SynchronousMode::Normal => "NORMAL",
			SynchronousMode::Full => "FULL",
			SynchronousMode::Extra => "EXTRA",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags {
	pub read_write: bool,
	pub create: bool,
	pub full_mutex: bool,
	pub no_mutex: bool,
	pub uri: bool,
}

impl Default for OpenFlags {
	fn default() -> Self {
		Self {
			read_write: true,
			create: true,
			full_mutex: false,
			no_mutex: true,
			uri: false,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
	pub path: DbPath,
	pub flags: OpenFlags,
	pub journal_mode: JournalMode,
	pub synchronous_mode: SynchronousMode,
	/// How long a statement waits for a lock held by another connection
	/// before failing with a busy error.
	pub busy_timeout: Duration,
}

impl SqliteConfig {
	/// A file database shared with other processes.
	pub fn new(path: impl AsRef<Path>) -> Self {
		Self {
			path: DbPath::File(path.as_ref().to_path_buf()),
			flags: OpenFlags::default(),
			journal_mode: JournalMode::Wal,
			synchronous_mode: SynchronousMode::Normal,
			busy_timeout: Duration::from_secs(5),
		}
	}

	pub fn in_memory() -> Self {
		Self {
			path: DbPath::Memory,
			flags: OpenFlags::default(),
			journal_mode: JournalMode::Memory,
			synchronous_mode: SynchronousMode::Off,
			busy_timeout: Duration::from_secs(5),
		}
	}

	pub fn journal_mode(mut self, journal_mode: JournalMode) -> Self {
		self.journal_mode = journal_mode;
		self
	}

	pub fn synchronous_mode(mut self, synchronous_mode: SynchronousMode) -> Self {
		self.synchronous_mode = synchronous_mode;
		self
	}

	pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
		self.busy_timeout = busy_timeout;
		self
	}
}
