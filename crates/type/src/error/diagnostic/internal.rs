// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::error::Diagnostic;

/// An invariant of the system was violated; this is always a bug.
pub fn internal(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "INTERNAL_001".to_string(),
		message: format!("internal error: {}", reason.into()),
		label: None,
		help: Some("This is a bug, please report it together with the log output".to_string()),
		notes: vec![],
		cause: None,
	}
}
