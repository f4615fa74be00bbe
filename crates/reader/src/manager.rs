// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{sync::Arc, time::Duration};

use catchup_core::{
	Bookmark, BookmarkStore, Clock, EventIndex, InstanceId, Lease, ReaderId, SystemClock, error::LeaseError,
};
use catchup_type::Result;
use tracing::{debug, info, instrument, warn};

/// Leases partition bookmarks of one reader on behalf of one instance.
///
/// At most one lease is held at a time. Persisted lease timestamps come from
/// the manager's [`Clock`]; every successful update renews the persisted
/// expiry to `now + lease_ttl`.
pub struct BookmarkManager<S> {
	store: S,
	reader: ReaderId,
	instance: InstanceId,
	clock: Arc<dyn Clock>,
	lease_ttl: Duration,
	held: Option<Lease>,
}

impl<S: BookmarkStore> BookmarkManager<S> {
	pub fn new(store: S, reader: ReaderId, lease_ttl: Duration) -> Self {
		Self {
			store,
			reader,
			instance: InstanceId::random(),
			clock: Arc::new(SystemClock),
			lease_ttl,
			held: None,
		}
	}

	pub fn with_instance(mut self, instance: InstanceId) -> Self {
		self.instance = instance;
		self
	}

	pub fn with_clock(mut self, clock: impl Clock) -> Self {
		self.clock = Arc::new(clock);
		self
	}

	pub fn reader(&self) -> &ReaderId {
		&self.reader
	}

	pub fn instance(&self) -> &InstanceId {
		&self.instance
	}

	pub fn held(&self) -> Option<&Lease> {
		self.held.as_ref()
	}

	fn expiry_from(&self, now: u64) -> u64 {
		now.saturating_add(self.lease_ttl.as_millis() as u64)
	}

	/// Claims any bookmark of the reader that is unowned or whose lease
	/// lapsed. Returns `None` when every bookmark is leased by a live owner.
	#[instrument(name = "reader::bookmark::checkout", level = "debug", skip(self), fields(
		reader = %self.reader,
		instance = %self.instance
	))]
	pub async fn checkout_bookmark(&mut self) -> Result<Option<Bookmark>> {
		if let Some(lease) = &self.held {
			return Err(LeaseError::AlreadyHeld {
				partition: lease.partition(),
			}
			.into());
		}

		let now = self.clock.now_millis();
		let expires_at = self.expiry_from(now);

		let Some(bookmark) = self.store.claim(&self.reader, &self.instance, now, expires_at).await? else {
			debug!("no bookmark available");
			return Ok(None);
		};

		info!(partition = %bookmark.partition, index = %bookmark.index, "checked out bookmark");
		self.held = Some(Lease {
			bookmark: bookmark.clone(),
			owner: self.instance.clone(),
			expires_at,
		});
		Ok(Some(bookmark))
	}

	/// Moves the held bookmark to `index` and renews the lease.
	///
	/// Fails with `LEASE_001` and drops the local lease when the store no
	/// longer recognises this instance as the live owner.
	#[instrument(name = "reader::bookmark::update", level = "trace", skip(self, index), fields(index = %index))]
	pub async fn update_bookmark(&mut self, index: EventIndex) -> Result<()> {
		let Some(lease) = &self.held else {
			return Err(LeaseError::NotHeld.into());
		};

		if index < lease.index() {
			return Err(LeaseError::IndexRegression {
				partition: lease.partition(),
				current: lease.index(),
				requested: index,
			}
			.into());
		}

		let now = self.clock.now_millis();
		let expires_at = self.expiry_from(now);

		if self.store.advance(lease, index, now, expires_at).await? {
			if let Some(lease) = self.held.as_mut() {
				lease.bookmark.index = index;
				lease.bookmark.lease_expiry = Some(expires_at);
				lease.expires_at = expires_at;
			}
			return Ok(());
		}

		match self.held.take() {
			Some(lease) => Err(self.lost(lease)),
			None => Err(LeaseError::NotHeld.into()),
		}
	}

	/// Gives the held lease back so any instance may claim the partition.
	#[instrument(name = "reader::bookmark::return", level = "debug", skip(self))]
	pub async fn return_bookmark(&mut self) -> Result<()> {
		let Some(lease) = &self.held else {
			return Err(LeaseError::NotHeld.into());
		};

		let now = self.clock.now_millis();
		let released = self.store.release(lease, now).await;

		let Some(lease) = self.held.take() else {
			return Err(LeaseError::NotHeld.into());
		};

		if released? {
			info!(partition = %lease.partition(), index = %lease.index(), "returned bookmark");
			return Ok(());
		}

		Err(self.lost(lease))
	}

	/// Forgets the held lease without touching the store. The persisted lease
	/// lapses on its own once its expiry passes.
	pub fn abandon(&mut self) -> Option<Lease> {
		let lease = self.held.take();
		if let Some(lease) = &lease {
			warn!(partition = %lease.partition(), index = %lease.index(), "abandoned bookmark");
		}
		lease
	}

	fn lost(&self, lease: Lease) -> catchup_type::Error {
		warn!(reader = %self.reader, partition = %lease.partition(), index = %lease.index(), "lease lost");

		LeaseError::Lost {
			reader: self.reader.clone(),
			partition: lease.partition(),
			owner: lease.owner,
		}
		.into()
	}
}
