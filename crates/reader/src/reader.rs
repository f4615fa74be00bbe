// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

use catchup_core::{
	BookmarkStore, Clock, EventIndex, EventLog, InstanceId, PartitionId, ReaderConfig, ScanRequest,
	error::{LEASE_LOST, LeaseError},
};
use catchup_type::Result;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, instrument, warn};

use crate::{BookmarkManager, EventConsume, ReaderHandle, Stopper};

/// Progress made while a lease was held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
	pub partition: PartitionId,
	/// Bookmark index when the lease was given back.
	pub index: EventIndex,
	pub batches: usize,
	pub events: usize,
}

/// How one pass from lease acquisition to lease return ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
	/// No partition could be leased; the idle backoff has elapsed.
	Idle,
	/// The partition was read up to its tail.
	Drained(CycleReport),
	/// The local lease window closed before the partition was drained.
	Expired(CycleReport),
	/// The consumer rejected a batch; the batch will be delivered again.
	ProcessFailed(CycleReport),
	/// The reader was asked to stop while polling.
	Stopped(CycleReport),
}

impl CycleOutcome {
	pub fn report(&self) -> Option<&CycleReport> {
		match self {
			CycleOutcome::Idle => None,
			CycleOutcome::Drained(report)
			| CycleOutcome::Expired(report)
			| CycleOutcome::ProcessFailed(report)
			| CycleOutcome::Stopped(report) => Some(report),
		}
	}
}

enum ReadState {
	AcquireLease,
	Polling {
		partition: PartitionId,
		deadline: Instant,
	},
	Draining(CycleOutcome),
}

/// One instance of a reader group.
///
/// Leases a partition, drains it in batches of at most `limit` events until
/// the partition is caught up or the local lease window closes, then gives
/// the lease back and starts over with whichever partition is free next.
pub struct CatchUpReader<S, C> {
	config: ReaderConfig,
	log: S,
	manager: BookmarkManager<S>,
	consumer: C,
	running: Arc<AtomicBool>,
}

impl<S, C> CatchUpReader<S, C>
where
	S: EventLog + BookmarkStore + Clone + 'static,
	C: EventConsume,
{
	pub fn new(config: ReaderConfig, store: S, consumer: C) -> Result<Self> {
		config.validate()?;

		let manager = BookmarkManager::new(store.clone(), config.reader.clone(), config.lease_ttl);
		Ok(Self {
			config,
			log: store,
			manager,
			consumer,
			running: Arc::new(AtomicBool::new(true)),
		})
	}

	pub fn with_instance(mut self, instance: InstanceId) -> Self {
		self.manager = self.manager.with_instance(instance);
		self
	}

	pub fn with_clock(mut self, clock: impl Clock) -> Self {
		self.manager = self.manager.with_clock(clock);
		self
	}

	pub fn config(&self) -> &ReaderConfig {
		&self.config
	}

	pub fn manager(&self) -> &BookmarkManager<S> {
		&self.manager
	}

	pub fn is_running(&self) -> bool {
		self.running.load(Ordering::Acquire)
	}

	/// Asks the loop to stop at its next iteration boundary.
	pub fn stop(&self) {
		self.stopper().stop();
	}

	pub fn stopper(&self) -> Stopper {
		Stopper(Arc::clone(&self.running))
	}

	/// Runs one pass `AcquireLease -> Polling -> Draining`.
	///
	/// Storage errors abandon the held lease locally and propagate. A lost
	/// lease surfaces as `LEASE_001` with the stale lease already dropped.
	#[instrument(name = "reader::cycle", level = "debug", skip(self), fields(
		reader = %self.config.reader,
		instance = %self.manager.instance()
	))]
	pub async fn cycle(&mut self) -> Result<CycleOutcome> {
		let mut state = ReadState::AcquireLease;

		loop {
			state = match state {
				ReadState::AcquireLease => match self.manager.checkout_bookmark().await? {
					None => {
						sleep(self.config.idle_backoff).await;
						return Ok(CycleOutcome::Idle);
					}
					Some(bookmark) => ReadState::Polling {
						partition: bookmark.partition,
						deadline: Instant::now() + self.config.lease_window,
					},
				},

				ReadState::Polling {
					partition,
					deadline,
				} => match self.poll(partition, deadline).await {
					Ok(outcome) => ReadState::Draining(outcome),
					Err(err) => {
						if err.code() != LEASE_LOST {
							self.manager.abandon();
						}
						return Err(err);
					}
				},

				ReadState::Draining(outcome) => {
					self.manager.return_bookmark().await.inspect_err(|err| {
						if err.code() != LEASE_LOST {
							self.manager.abandon();
						}
					})?;
					return Ok(outcome);
				}
			};
		}
	}

	async fn poll(&mut self, partition: PartitionId, deadline: Instant) -> Result<CycleOutcome> {
		let mut batches = 0;
		let mut events = 0;

		loop {
			let Some(lease) = self.manager.held() else {
				return Err(LeaseError::NotHeld.into());
			};
			let report = CycleReport {
				partition,
				index: lease.index(),
				batches,
				events,
			};

			if Instant::now() >= deadline {
				debug!(partition = %partition, batches, events, "lease window closed");
				return Ok(CycleOutcome::Expired(report));
			}

			if !self.is_running() {
				return Ok(CycleOutcome::Stopped(report));
			}

			let batch = self
				.log
				.scan(ScanRequest {
					partition,
					after: lease.index(),
					limit: self.config.limit,
					filter: &self.config.filter,
				})
				.await?;

			let Some(last) = batch.last().map(|event| event.index) else {
				debug!(partition = %partition, index = %report.index, "partition drained");
				sleep(self.config.drained_backoff).await;
				return Ok(CycleOutcome::Drained(report));
			};

			if let Err(err) = self.consumer.consume(&batch).await {
				warn!(
					partition = %partition,
					first = %batch[0].index,
					last = %last,
					error = %err,
					"consumer failed to process batch"
				);
				if let Err(hook) = self.consumer.on_error(&err, &batch).await {
					warn!(partition = %partition, error = %hook, "consumer error hook failed");
				}
				return Ok(CycleOutcome::ProcessFailed(report));
			}

			self.manager.update_bookmark(last).await?;
			batches += 1;
			events += batch.len();
		}
	}

	/// Runs cycles until [`stop`](Self::stop) is called.
	///
	/// A lost lease is logged and the loop starts over; storage errors end it.
	pub async fn run(&mut self) -> Result<()> {
		info!(reader = %self.config.reader, instance = %self.manager.instance(), "reader started");

		while self.is_running() {
			match self.cycle().await {
				Ok(CycleOutcome::Idle) => {}
				Ok(outcome) => {
					if let Some(report) = outcome.report() {
						debug!(
							partition = %report.partition,
							index = %report.index,
							batches = report.batches,
							events = report.events,
							"cycle finished"
						);
					}
				}
				Err(err) if err.code() == LEASE_LOST => {
					warn!(reader = %self.config.reader, error = %err, "restarting after lost lease");
				}
				Err(err) => {
					error!(reader = %self.config.reader, error = %err, "reader stopped on error");
					return Err(err);
				}
			}
		}

		info!(reader = %self.config.reader, instance = %self.manager.instance(), "reader stopped");
		Ok(())
	}

	/// Moves the reader onto a tokio task.
	pub fn spawn(mut self) -> ReaderHandle {
		let running = Arc::clone(&self.running);
		let worker = tokio::spawn(async move { self.run().await });
		ReaderHandle::new(running, worker)
	}
}
