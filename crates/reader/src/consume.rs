// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use async_trait::async_trait;
use catchup_core::Event;

pub type ConsumeError = Box<dyn std::error::Error + Send + Sync>;

/// Processing logic invoked by the read loop.
#[async_trait]
pub trait EventConsume: Send + Sync + 'static {
	/// Processes a non-empty batch from a single partition, in ascending index
	/// order. An error leaves the bookmark where it was; the batch will be
	/// delivered again to whichever instance leases the partition next.
	async fn consume(&self, events: &[Event]) -> Result<(), ConsumeError>;

	/// Called with the failed batch after `consume` returned `error`.
	async fn on_error(&self, _error: &ConsumeError, _events: &[Event]) -> Result<(), ConsumeError> {
		Ok(())
	}
}

#[async_trait]
impl<C: EventConsume + ?Sized> EventConsume for Arc<C> {
	async fn consume(&self, events: &[Event]) -> Result<(), ConsumeError> {
		(**self).consume(events).await
	}

	async fn on_error(&self, error: &ConsumeError, events: &[Event]) -> Result<(), ConsumeError> {
		(**self).on_error(error, events).await
	}
}
