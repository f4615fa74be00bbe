// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	env, fs,
	path::{Path, PathBuf},
};

use uuid::Uuid;

/// Uniquely named directory below the system temp dir, removed on drop.
#[derive(Debug)]
pub struct TempDir {
	path: PathBuf,
}

impl TempDir {
	pub fn new() -> std::io::Result<Self> {
		let mut path = env::temp_dir();
		path.push(format!("catchup-{}", Uuid::new_v4()));
		fs::create_dir(&path)?;
		Ok(Self {
			path,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Path of a file inside the directory.
	pub fn join(&self, name: &str) -> PathBuf {
		self.path.join(name)
	}
}

impl Drop for TempDir {
	fn drop(&mut self) {
		let _ = fs::remove_dir_all(&self.path);
	}
}
