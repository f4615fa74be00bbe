// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

use catchup_type::{Result, error::diagnostic::internal::internal};
use tokio::task::JoinHandle;

/// Requests a reader to stop at its next iteration boundary. Clones share
/// the same flag.
#[derive(Debug, Clone)]
pub struct Stopper(pub(crate) Arc<AtomicBool>);

impl Stopper {
	pub fn stop(&self) {
		self.0.store(false, Ordering::Release);
	}
}

/// Controls a reader running on a tokio task.
pub struct ReaderHandle {
	running: Arc<AtomicBool>,
	worker: JoinHandle<Result<()>>,
}

impl ReaderHandle {
	pub(crate) fn new(running: Arc<AtomicBool>, worker: JoinHandle<Result<()>>) -> Self {
		Self {
			running,
			worker,
		}
	}

	/// Requests a stop. The reader finishes its current step and returns any
	/// held lease before the task ends.
	pub fn stop(&self) {
		self.running.store(false, Ordering::Release);
	}

	pub fn is_running(&self) -> bool {
		self.running.load(Ordering::Acquire) && !self.worker.is_finished()
	}

	pub fn stopper(&self) -> Stopper {
		Stopper(Arc::clone(&self.running))
	}

	/// Waits for the task and returns the loop's result.
	pub async fn join(self) -> Result<()> {
		match self.worker.await {
			Ok(result) => result,
			Err(err) => Err(internal(format!("reader task failed: {err}")).into()),
		}
	}

	/// Stops the reader and waits for it.
	pub async fn shutdown(self) -> Result<()> {
		self.stop();
		self.join().await
	}
}
