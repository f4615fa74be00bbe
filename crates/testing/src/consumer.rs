// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Consumers that record what the read loop handed them.

use std::sync::Arc;

use async_trait::async_trait;
use catchup_core::{Event, EventIndex, PartitionId};
use catchup_reader::{ConsumeError, EventConsume};
use parking_lot::Mutex;

/// Accepts every batch and keeps a copy. Clones share the recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingConsumer {
	batches: Arc<Mutex<Vec<Vec<Event>>>>,
}

impl RecordingConsumer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn batches(&self) -> Vec<Vec<Event>> {
		self.batches.lock().clone()
	}

	pub fn batch_sizes(&self) -> Vec<usize> {
		self.batches.lock().iter().map(Vec::len).collect()
	}

	pub fn events(&self) -> Vec<Event> {
		self.batches.lock().iter().flatten().cloned().collect()
	}

	pub fn indexes(&self, partition: PartitionId) -> Vec<EventIndex> {
		self.batches
			.lock()
			.iter()
			.flatten()
			.filter(|event| event.partition == partition)
			.map(|event| event.index)
			.collect()
	}

	pub fn event_count(&self) -> usize {
		self.batches.lock().iter().map(Vec::len).sum()
	}
}

#[async_trait]
impl EventConsume for RecordingConsumer {
	async fn consume(&self, events: &[Event]) -> Result<(), ConsumeError> {
		self.batches.lock().push(events.to_vec());
		Ok(())
	}
}

/// Rejects the first `failures` batches, then accepts. Every rejected batch
/// is passed back through the error hook and recorded.
#[derive(Debug, Clone)]
pub struct FailingConsumer {
	remaining: Arc<Mutex<usize>>,
	accepted: RecordingConsumer,
	failed: Arc<Mutex<Vec<(String, Vec<Event>)>>>,
	hook_fails: bool,
}

impl FailingConsumer {
	pub fn new(failures: usize) -> Self {
		Self {
			remaining: Arc::new(Mutex::new(failures)),
			accepted: RecordingConsumer::new(),
			failed: Arc::new(Mutex::new(Vec::new())),
			hook_fails: false,
		}
	}

	pub fn always() -> Self {
		Self::new(usize::MAX)
	}

	/// Makes the error hook fail as well.
	pub fn with_failing_hook(mut self) -> Self {
		self.hook_fails = true;
		self
	}

	pub fn accepted(&self) -> &RecordingConsumer {
		&self.accepted
	}

	/// Error message and batch of every hook invocation.
	pub fn failed(&self) -> Vec<(String, Vec<Event>)> {
		self.failed.lock().clone()
	}
}

#[async_trait]
impl EventConsume for FailingConsumer {
	async fn consume(&self, events: &[Event]) -> Result<(), ConsumeError> {
		{
			let mut remaining = self.remaining.lock();
			if *remaining > 0 {
				*remaining -= 1;
				return Err(format!("rejected batch ending at {}", events[events.len() - 1].index).into());
			}
		}
		self.accepted.consume(events).await
	}

	async fn on_error(&self, error: &ConsumeError, events: &[Event]) -> Result<(), ConsumeError> {
		self.failed.lock().push((error.to_string(), events.to_vec()));
		if self.hook_fails {
			return Err("error hook failed".into());
		}
		Ok(())
	}
}
