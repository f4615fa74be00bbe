// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use catchup_type::{Diagnostic, Error, IntoDiagnostic};

use crate::{
	bookmark::{InstanceId, ReaderId},
	event::{EventIndex, PartitionId},
};

pub const LEASE_LOST: &str = "LEASE_001";
pub const LEASE_ALREADY_HELD: &str = "LEASE_002";
pub const LEASE_NOT_HELD: &str = "LEASE_003";
pub const LEASE_INDEX_REGRESSION: &str = "LEASE_004";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
	#[error("reader identity must not be empty")]
	EmptyReader,

	#[error("batch limit must be positive")]
	ZeroLimit,

	#[error("persisted lease ttl {ttl:?} must be longer than the lease window {window:?}")]
	LeaseTtlTooShort {
		ttl: Duration,
		window: Duration,
	},
}

impl IntoDiagnostic for ConfigError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			ConfigError::EmptyReader => Diagnostic {
				code: "CONFIG_001".to_string(),
				message,
				label: None,
				help: Some("Set the reader to the name of the consumer group".to_string()),
				notes: vec![],
				cause: None,
			},
			ConfigError::ZeroLimit => Diagnostic {
				code: "CONFIG_002".to_string(),
				message,
				label: None,
				help: Some("Use a limit of at least 1".to_string()),
				notes: vec![],
				cause: None,
			},
			ConfigError::LeaseTtlTooShort {
				..
			} => Diagnostic {
				code: "CONFIG_003".to_string(),
				message,
				label: None,
				help: Some("Increase the lease ttl or shorten the lease window".to_string()),
				notes: vec![
					"An instance still inside its lease window would lose the partition to another instance"
						.to_string(),
				],
				cause: None,
			},
		}
	}
}

impl From<ConfigError> for Error {
	fn from(err: ConfigError) -> Self {
		Error::new(err)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaseError {
	#[error("lease of reader {reader} on partition {partition} is no longer held by {owner}")]
	Lost {
		reader: ReaderId,
		partition: PartitionId,
		owner: InstanceId,
	},

	#[error("a lease on partition {partition} is already held")]
	AlreadyHeld {
		partition: PartitionId,
	},

	#[error("no lease is held")]
	NotHeld,

	#[error("cannot move bookmark of partition {partition} back from {current} to {requested}")]
	IndexRegression {
		partition: PartitionId,
		current: EventIndex,
		requested: EventIndex,
	},
}

impl IntoDiagnostic for LeaseError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			LeaseError::Lost {
				..
			} => Diagnostic {
				code: LEASE_LOST.to_string(),
				message,
				label: None,
				help: Some("The lease expired or was claimed by another instance; stop using it".to_string()),
				notes: vec!["Events processed since the last committed index will be replayed".to_string()],
				cause: None,
			},
			LeaseError::AlreadyHeld {
				..
			} => Diagnostic {
				code: LEASE_ALREADY_HELD.to_string(),
				message,
				label: None,
				help: Some("Return the held bookmark before checking out another one".to_string()),
				notes: vec![],
				cause: None,
			},
			LeaseError::NotHeld => Diagnostic {
				code: LEASE_NOT_HELD.to_string(),
				message,
				label: None,
				help: Some("Check out a bookmark first".to_string()),
				notes: vec![],
				cause: None,
			},
			LeaseError::IndexRegression {
				..
			} => Diagnostic {
				code: LEASE_INDEX_REGRESSION.to_string(),
				message,
				label: None,
				help: None,
				notes: vec!["Bookmarks only move forward".to_string()],
				cause: None,
			},
		}
	}
}

impl From<LeaseError> for Error {
	fn from(err: LeaseError) -> Self {
		Error::new(err)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_lease_lost_code() {
		let err: Error = LeaseError::Lost {
			reader: ReaderId::new("r"),
			partition: PartitionId(3),
			owner: InstanceId::new("i-1"),
		}
		.into();

		assert_eq!(err.code(), LEASE_LOST);
		assert!(err.to_string().contains("partition 3"));
	}

	#[test]
	fn test_config_error_code() {
		let err: Error = ConfigError::LeaseTtlTooShort {
			ttl: Duration::from_secs(10),
			window: Duration::from_secs(30),
		}
		.into();

		assert_eq!(err.code(), "CONFIG_003");
	}
}
