// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Storage seams of the reader.
//!
//! Both traits are implemented by the SQLite store; the reader only talks to
//! storage through them.

use async_trait::async_trait;
use catchup_type::Result;

use crate::{
	bookmark::{Bookmark, InstanceId, Lease, ReaderId},
	event::{Event, EventIndex, PartitionId},
	filter::ReadFilter,
};

/// One bounded range scan over a partition.
#[derive(Debug, Clone, Copy)]
pub struct ScanRequest<'a> {
	pub partition: PartitionId,
	/// Exclusive lower bound
	pub after: EventIndex,
	pub limit: u32,
	pub filter: &'a ReadFilter,
}

#[async_trait]
pub trait EventLog: Send + Sync {
	/// Events of `request.partition` with an index greater than
	/// `request.after` that match the filter, in ascending index order and at
	/// most `request.limit` of them.
	async fn scan(&self, request: ScanRequest<'_>) -> Result<Vec<Event>>;
}

#[async_trait]
pub trait BookmarkStore: Send + Sync {
	/// Atomically leases one bookmark of `reader` that is unowned or whose
	/// lease lapsed at `now`, recording `owner` and `expires_at`.
	///
	/// Bookmarks are created on the fly for partitions the reader has not
	/// seen yet. Returns `None` if nothing can be claimed.
	async fn claim(&self, reader: &ReaderId, owner: &InstanceId, now: u64, expires_at: u64)
	-> Result<Option<Bookmark>>;

	/// Moves the bookmark of `lease` to `index` and renews the persisted lease
	/// until `expires_at`.
	///
	/// Returns `false` if `lease.owner` no longer holds an unexpired lease at
	/// `now`, in which case nothing was written.
	async fn advance(&self, lease: &Lease, index: EventIndex, now: u64, expires_at: u64) -> Result<bool>;

	/// Clears the owner of the bookmark of `lease`.
	///
	/// Returns `false` if the bookmark is owned by another instance.
	async fn release(&self, lease: &Lease, now: u64) -> Result<bool>;

	/// All bookmarks of `reader`, ordered by partition.
	async fn list(&self, reader: &ReaderId) -> Result<Vec<Bookmark>>;
}
