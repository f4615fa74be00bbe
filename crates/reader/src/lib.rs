// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! Competing-consumers reader for a partitioned event log.
//!
//! Every instance of a reader group runs a [`CatchUpReader`]. The reader
//! leases one partition bookmark at a time through its [`BookmarkManager`],
//! drains the partition in bounded batches and hands each batch to an
//! [`EventConsume`] implementation. Instances never talk to each other; the
//! bookmark table decides who reads what.

mod consume;
mod handle;
mod manager;
mod reader;

pub use consume::{ConsumeError, EventConsume};
pub use handle::{ReaderHandle, Stopper};
pub use manager::BookmarkManager;
pub use reader::{CatchUpReader, CycleOutcome, CycleReport};
