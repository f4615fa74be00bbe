// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Polling waits for tests that observe a background reader.

use std::time::{Duration, Instant};

use tokio::time::sleep;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Polls `condition` until it holds.
///
/// # Panics
/// Panics with `timeout_message` if the condition does not hold within `timeout`.
pub async fn wait_for_condition<F>(condition: F, timeout: Duration, poll_interval: Duration, timeout_message: &str)
where
	F: Fn() -> bool,
{
	let start = Instant::now();

	while !condition() {
		if start.elapsed() > timeout {
			panic!("Timeout after {:?}: {}", timeout, timeout_message);
		}
		sleep(poll_interval).await;
	}
}

pub async fn wait_for<F>(condition: F, message: &str)
where
	F: Fn() -> bool,
{
	wait_for_condition(condition, DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL, message).await;
}
