// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

/// Maximum number of events handed to the consumer in one batch.
pub const DEFAULT_LIMIT: u32 = 100;

/// How long an instance works a partition before handing it back.
pub const DEFAULT_LEASE_WINDOW: Duration = Duration::from_secs(30);

/// Lifetime of the persisted lease; must outlast the lease window.
pub const DEFAULT_LEASE_TTL: Duration = Duration::from_secs(90);

/// Pause after a scan found the partition drained.
pub const DEFAULT_DRAINED_BACKOFF: Duration = Duration::from_millis(500);

/// Pause when no partition could be checked out.
pub const DEFAULT_IDLE_BACKOFF: Duration = Duration::from_millis(2000);
