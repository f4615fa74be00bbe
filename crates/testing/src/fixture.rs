// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use catchup_core::{NewEvent, PartitionId};

/// An event of `event_type` on an `order` aggregate.
pub fn typed(partition: impl Into<PartitionId>, event_type: &str) -> NewEvent {
	NewEvent::new(partition).event_type(event_type).aggregate("order", "o-1").actor("tester")
}

/// `count` events of type `Tick` in one partition.
pub fn ticks(partition: impl Into<PartitionId> + Copy, count: usize) -> Vec<NewEvent> {
	(0..count).map(|_| typed(partition, "Tick")).collect()
}
