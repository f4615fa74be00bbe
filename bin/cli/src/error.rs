// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use catchup_type::{Diagnostic, Error, IntoDiagnostic};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
	#[error("line {line} is not a valid event: {reason}")]
	InvalidEvent {
		line: usize,
		reason: String,
	},

	#[error("{operation} failed: {reason}")]
	Io {
		operation: &'static str,
		reason: String,
	},
}

impl IntoDiagnostic for CliError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			CliError::InvalidEvent {
				..
			} => Diagnostic {
				code: "CLI_001".to_string(),
				message,
				label: None,
				help: Some(
					r#"Each line must be a JSON object such as {"partition": 1, "type": "OrderPlaced"}"#
						.to_string(),
				),
				notes: vec!["No events were appended".to_string()],
				cause: None,
			},
			CliError::Io {
				..
			} => Diagnostic {
				code: "CLI_002".to_string(),
				message,
				label: None,
				help: None,
				notes: vec![],
				cause: None,
			},
		}
	}
}

impl From<CliError> for Error {
	fn from(err: CliError) -> Self {
		Error::new(err)
	}
}
