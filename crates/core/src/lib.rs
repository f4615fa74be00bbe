// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod bookmark;
pub mod clock;
pub mod config;
pub mod defaults;
pub mod error;
pub mod event;
pub mod filter;
pub mod interface;

pub use bookmark::{Bookmark, InstanceId, Lease, ReaderId};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::ReaderConfig;
pub use event::{Event, EventIndex, NewEvent, PartitionId};
pub use filter::{FilterField, ReadFilter};
pub use interface::{BookmarkStore, EventLog, ScanRequest};
