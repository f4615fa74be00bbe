// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

pub mod diagnostic;

mod render;

pub use render::DefaultRenderer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub code: String,
	pub message: String,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
	pub cause: Option<Box<Diagnostic>>,
}

impl Display for Diagnostic {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("{}", self.code))
	}
}

/// Conversion of a domain error into its user facing [`Diagnostic`].
pub trait IntoDiagnostic {
	fn into_diagnostic(self) -> Diagnostic;
}

impl IntoDiagnostic for Diagnostic {
	fn into_diagnostic(self) -> Diagnostic {
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Box<Diagnostic>);

impl Error {
	pub fn new(diagnostic: impl IntoDiagnostic) -> Self {
		Self(Box::new(diagnostic.into_diagnostic()))
	}

	pub fn code(&self) -> &str {
		&self.0.code
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let out = DefaultRenderer::render_string(&self.0);
		f.write_str(out.as_str())
	}
}

impl std::error::Error for Error {}

impl From<Diagnostic> for Error {
	fn from(diagnostic: Diagnostic) -> Self {
		Self(Box::new(diagnostic))
	}
}
