// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Position of an event inside its partition.
///
/// Indexes are unique within a partition and define the total order in which
/// the partition is read. A bookmark at index `n` means every event up to and
/// including `n` has been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventIndex(pub i64);

impl EventIndex {
	/// Index of a bookmark that has not processed anything yet.
	pub const ORIGIN: EventIndex = EventIndex(0);
}

impl Display for EventIndex {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl From<i64> for EventIndex {
	fn from(value: i64) -> Self {
		Self(value)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(pub i64);

impl Display for PartitionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl From<i64> for PartitionId {
	fn from(value: i64) -> Self {
		Self(value)
	}
}

/// An immutable fact read from the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
	pub index: EventIndex,
	pub partition: PartitionId,
	pub occurred_at: DateTime<Utc>,
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub event_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub aggregate_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub aggregate_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub actor: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub payload: Option<Value>,
}

/// An event that has not been appended yet; the log assigns its index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
	pub partition: PartitionId,
	#[serde(default = "Utc::now")]
	pub occurred_at: DateTime<Utc>,
	#[serde(rename = "type", default)]
	pub event_type: Option<String>,
	#[serde(default)]
	pub aggregate_type: Option<String>,
	#[serde(default)]
	pub aggregate_id: Option<String>,
	#[serde(default)]
	pub actor: Option<String>,
	#[serde(default)]
	pub payload: Option<Value>,
}

impl NewEvent {
	pub fn new(partition: impl Into<PartitionId>) -> Self {
		Self {
			partition: partition.into(),
			occurred_at: Utc::now(),
			event_type: None,
			aggregate_type: None,
			aggregate_id: None,
			actor: None,
			payload: None,
		}
	}

	pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
		self.occurred_at = occurred_at;
		self
	}

	pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
		self.event_type = Some(event_type.into());
		self
	}

	pub fn aggregate(mut self, aggregate_type: impl Into<String>, aggregate_id: impl Into<String>) -> Self {
		self.aggregate_type = Some(aggregate_type.into());
		self.aggregate_id = Some(aggregate_id.into());
		self
	}

	pub fn actor(mut self, actor: impl Into<String>) -> Self {
		self.actor = Some(actor.into());
		self
	}

	pub fn payload(mut self, payload: Value) -> Self {
		self.payload = Some(payload);
		self
	}

	/// Turns this into the stored event once the log assigned `index`.
	pub fn into_event(self, index: EventIndex) -> Event {
		Event {
			index,
			partition: self.partition,
			occurred_at: self.occurred_at,
			event_type: self.event_type,
			aggregate_type: self.aggregate_type,
			aggregate_id: self.aggregate_id,
			actor: self.actor,
			payload: self.payload,
		}
	}
}
