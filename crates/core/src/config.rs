// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use catchup_type::Result;

use crate::{
	bookmark::ReaderId,
	defaults::{DEFAULT_DRAINED_BACKOFF, DEFAULT_IDLE_BACKOFF, DEFAULT_LEASE_TTL, DEFAULT_LEASE_WINDOW, DEFAULT_LIMIT},
	error::ConfigError,
	filter::ReadFilter,
};

/// Configuration of one catch-up reader.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
	/// Consumer group whose bookmarks this reader leases
	pub reader: ReaderId,
	/// Maximum number of events per batch
	pub limit: u32,
	/// Local lease deadline, measured from checkout
	pub lease_window: Duration,
	/// Lifetime of the persisted lease, renewed on every bookmark update
	pub lease_ttl: Duration,
	/// Sleep after a scan returned no events
	pub drained_backoff: Duration,
	/// Sleep after no bookmark could be checked out
	pub idle_backoff: Duration,
	/// Restricts which events are delivered
	pub filter: ReadFilter,
}

impl ReaderConfig {
	pub fn new(reader: impl Into<ReaderId>) -> Self {
		Self {
			reader: reader.into(),
			limit: DEFAULT_LIMIT,
			lease_window: DEFAULT_LEASE_WINDOW,
			lease_ttl: DEFAULT_LEASE_TTL,
			drained_backoff: DEFAULT_DRAINED_BACKOFF,
			idle_backoff: DEFAULT_IDLE_BACKOFF,
			filter: ReadFilter::default(),
		}
	}

	pub fn with_limit(mut self, limit: u32) -> Self {
		self.limit = limit;
		self
	}

	pub fn with_lease_window(mut self, lease_window: Duration) -> Self {
		self.lease_window = lease_window;
		self
	}

	pub fn with_lease_ttl(mut self, lease_ttl: Duration) -> Self {
		self.lease_ttl = lease_ttl;
		self
	}

	pub fn with_drained_backoff(mut self, drained_backoff: Duration) -> Self {
		self.drained_backoff = drained_backoff;
		self
	}

	pub fn with_idle_backoff(mut self, idle_backoff: Duration) -> Self {
		self.idle_backoff = idle_backoff;
		self
	}

	pub fn with_filter(mut self, filter: ReadFilter) -> Self {
		self.filter = filter;
		self
	}

	pub fn validate(&self) -> Result<()> {
		if self.reader.as_str().trim().is_empty() {
			return Err(ConfigError::EmptyReader.into());
		}
		if self.limit == 0 {
			return Err(ConfigError::ZeroLimit.into());
		}
		if self.lease_ttl <= self.lease_window {
			return Err(ConfigError::LeaseTtlTooShort {
				ttl: self.lease_ttl,
				window: self.lease_window,
			}
			.into());
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = ReaderConfig::new("projector");

		assert_eq!(config.limit, 100);
		assert_eq!(config.lease_window, Duration::from_secs(30));
		assert_eq!(config.drained_backoff, Duration::from_millis(500));
		assert_eq!(config.idle_backoff, Duration::from_millis(2000));
		assert!(config.lease_ttl > config.lease_window);
		assert!(config.filter.is_empty());
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_empty_reader_rejected() {
		let err = ReaderConfig::new("  ").validate().unwrap_err();
		assert_eq!(err.code(), "CONFIG_001");
	}

	#[test]
	fn test_zero_limit_rejected() {
		let err = ReaderConfig::new("r").with_limit(0).validate().unwrap_err();
		assert_eq!(err.code(), "CONFIG_002");
	}

	#[test]
	fn test_ttl_must_exceed_window() {
		let config =
			ReaderConfig::new("r").with_lease_window(Duration::from_secs(60)).with_lease_ttl(Duration::from_secs(60));
		let err = config.validate().unwrap_err();
		assert_eq!(err.code(), "CONFIG_003");
	}
}
