// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use catchup_type::{Diagnostic, Error, IntoDiagnostic};
use rusqlite::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
	#[error("failed to open database at {path}: {reason}")]
	Open {
		path: String,
		reason: String,
	},

	#[error("{operation} failed: {reason}")]
	Sqlite {
		operation: &'static str,
		reason: String,
	},

	#[error("{operation} failed: database is locked by another connection")]
	Busy {
		operation: &'static str,
	},

	#[error("sqlite connection thread is gone")]
	Disconnected,
}

impl StoreError {
	pub(crate) fn from_sqlite(operation: &'static str, err: rusqlite::Error) -> Self {
		match err.sqlite_error_code() {
			Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => StoreError::Busy {
				operation,
			},
			_ => StoreError::Sqlite {
				operation,
				reason: err.to_string(),
			},
		}
	}
}

impl IntoDiagnostic for StoreError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			StoreError::Open {
				..
			} => Diagnostic {
				code: "STORE_001".to_string(),
				message,
				label: None,
				help: Some("Check that the path exists and is writable".to_string()),
				notes: vec![],
				cause: None,
			},
			StoreError::Sqlite {
				..
			} => Diagnostic {
				code: "STORE_002".to_string(),
				message,
				label: None,
				help: Some("Check that the schema is installed and the database is not corrupted".to_string()),
				notes: vec![],
				cause: None,
			},
			StoreError::Busy {
				..
			} => Diagnostic {
				code: "STORE_003".to_string(),
				message,
				label: None,
				help: Some("Raise the busy timeout or reduce the number of concurrent writers".to_string()),
				notes: vec![],
				cause: None,
			},
			StoreError::Disconnected => Diagnostic {
				code: "STORE_004".to_string(),
				message,
				label: None,
				help: None,
				notes: vec!["The connection thread stopped, usually because the store is shutting down".to_string()],
				cause: None,
			},
		}
	}
}

impl From<StoreError> for Error {
	fn from(err: StoreError) -> Self {
		Error::new(err)
	}
}
