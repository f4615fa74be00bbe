// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::{EventIndex, PartitionId};

/// Name of a consumer group; every instance of the group shares it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReaderId(String);

impl ReaderId {
	pub fn new(reader: impl Into<String>) -> Self {
		Self(reader.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for ReaderId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ReaderId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<String> for ReaderId {
	fn from(value: String) -> Self {
		Self(value)
	}
}

/// Identity of one running reader instance, written as the lease owner.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
	pub fn new(instance: impl Into<String>) -> Self {
		Self(instance.into())
	}

	pub fn random() -> Self {
		Self(Uuid::new_v4().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for InstanceId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Persisted read progress of one reader on one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
	pub reader: ReaderId,
	pub partition: PartitionId,
	/// Last processed index; the next scan starts strictly after it.
	pub index: EventIndex,
	pub lease_owner: Option<InstanceId>,
	/// Unix milliseconds. While `lease_owner` is set this is when the lease
	/// lapses; after a release it records the release time.
	pub lease_expiry: Option<u64>,
}

/// A bookmark checked out by this instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
	pub bookmark: Bookmark,
	pub owner: InstanceId,
	/// Persisted lease expiry last written by this instance, unix milliseconds.
	pub expires_at: u64,
}

impl Lease {
	pub fn reader(&self) -> &ReaderId {
		&self.bookmark.reader
	}

	pub fn partition(&self) -> PartitionId {
		self.bookmark.partition
	}

	pub fn index(&self) -> EventIndex {
		self.bookmark.index
	}
}
