// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod consumer;
pub mod fixture;
pub mod tempdir;
pub mod wait;

pub use consumer::{FailingConsumer, RecordingConsumer};
pub use tempdir::TempDir;
pub use wait::{wait_for, wait_for_condition};
