// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Wall clock used for persisted lease timestamps.
//!
//! Persisted leases are compared across processes, so they are expressed in
//! unix milliseconds. The local lease deadline of a reader does not use this
//! clock; it is measured against the monotonic runtime clock.

use std::{
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
	time::Duration,
};

use chrono::Utc;

pub trait Clock: Send + Sync + 'static {
	/// Current time in unix milliseconds.
	fn now_millis(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> u64 {
		Utc::now().timestamp_millis().max(0) as u64
	}
}

/// Manually driven clock; clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct MockClock(Arc<AtomicU64>);

impl MockClock {
	pub fn new(millis: u64) -> Self {
		Self(Arc::new(AtomicU64::new(millis)))
	}

	pub fn set(&self, millis: u64) {
		self.0.store(millis, Ordering::Release);
	}

	pub fn advance(&self, by: Duration) {
		self.0.fetch_add(by.as_millis() as u64, Ordering::AcqRel);
	}
}

impl Clock for MockClock {
	fn now_millis(&self) -> u64 {
		self.0.load(Ordering::Acquire)
	}
}
