// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Bookmark leasing.
//!
//! A bookmark is claimable when it has no owner or its persisted lease lapsed.
//! The claim is a single conditional `UPDATE ... RETURNING`, so the predicate
//! and the write happen atomically even with many connections competing.
//! Released bookmarks keep the release time in `lease_expiry`; claiming the
//! smallest expiry first rotates an instance through all partitions.

use async_trait::async_trait;
use catchup_core::{Bookmark, BookmarkStore, EventIndex, InstanceId, Lease, PartitionId, ReaderId};
use catchup_type::Result;
use rusqlite::{OptionalExtension, Row, TransactionBehavior, params};
use tracing::{debug, instrument};

use crate::SqliteStore;

// Walks the distinct partitions through `events_partition_index` one seek at a
// time, so the cost follows the partition count rather than the log size.
const REGISTER_PARTITIONS: &str = r#"
WITH RECURSIVE partitions(p) AS (
    SELECT MIN("partition") FROM events
    UNION ALL
    SELECT (SELECT MIN("partition") FROM events WHERE "partition" > p)
    FROM partitions
    WHERE p IS NOT NULL
)
INSERT OR IGNORE INTO bookmarks (reader, "partition", "index")
SELECT ?1, p, 0 FROM partitions WHERE p IS NOT NULL
"#;

const CLAIM: &str = r#"
UPDATE bookmarks
SET lease_owner = ?2, lease_expiry = ?3
WHERE reader = ?1
  AND "partition" = (
      SELECT "partition" FROM bookmarks
      WHERE reader = ?1 AND (lease_owner IS NULL OR lease_expiry IS NULL OR lease_expiry <= ?4)
      ORDER BY lease_expiry ASC, "partition" ASC
      LIMIT 1
  )
  AND (lease_owner IS NULL OR lease_expiry IS NULL OR lease_expiry <= ?4)
RETURNING reader, "partition", "index", lease_owner, lease_expiry
"#;

const ADVANCE: &str = r#"
UPDATE bookmarks
SET "index" = ?1, lease_expiry = ?2
WHERE reader = ?3 AND "partition" = ?4 AND lease_owner = ?5 AND lease_expiry > ?6 AND "index" <= ?1
"#;

const RELEASE: &str = r#"
UPDATE bookmarks
SET lease_owner = NULL, lease_expiry = ?1
WHERE reader = ?2 AND "partition" = ?3 AND lease_owner = ?4
"#;

const LIST: &str = r#"
SELECT reader, "partition", "index", lease_owner, lease_expiry
FROM bookmarks
WHERE reader = ?1
ORDER BY "partition" ASC
"#;

fn millis(value: u64) -> i64 {
	i64::try_from(value).unwrap_or(i64::MAX)
}

fn bookmark_from_row(row: &Row<'_>) -> rusqlite::Result<Bookmark> {
	Ok(Bookmark {
		reader: ReaderId::new(row.get::<_, String>(0)?),
		partition: PartitionId(row.get(1)?),
		index: EventIndex(row.get(2)?),
		lease_owner: row.get::<_, Option<String>>(3)?.map(InstanceId::new),
		lease_expiry: row.get::<_, Option<i64>>(4)?.map(|expiry| expiry.max(0) as u64),
	})
}

#[async_trait]
impl BookmarkStore for SqliteStore {
	#[instrument(name = "store::sqlite::claim", level = "debug", skip(self, reader, owner), fields(
		reader = %reader,
		owner = %owner
	))]
	async fn claim(
		&self,
		reader: &ReaderId,
		owner: &InstanceId,
		now: u64,
		expires_at: u64,
	) -> Result<Option<Bookmark>> {
		let reader = reader.as_str().to_string();
		let owner = owner.as_str().to_string();

		let claimed = self
			.conn
			.call("claim bookmark", move |conn| {
				let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
				let registered = tx.execute(REGISTER_PARTITIONS, params![reader])?;
				let claimed = tx
					.query_row(CLAIM, params![reader, owner, millis(expires_at), millis(now)], bookmark_from_row)
					.optional()?;
				tx.commit()?;

				if registered > 0 {
					debug!(reader = %reader, registered, "created bookmarks for new partitions");
				}
				Ok(claimed)
			})
			.await?;

		Ok(claimed)
	}

	#[instrument(name = "store::sqlite::advance", level = "trace", skip(self, lease, index), fields(
		partition = %lease.partition(),
		index = %index
	))]
	async fn advance(&self, lease: &Lease, index: EventIndex, now: u64, expires_at: u64) -> Result<bool> {
		let reader = lease.reader().as_str().to_string();
		let partition = lease.partition().0;
		let owner = lease.owner.as_str().to_string();

		self.conn
			.call("advance bookmark", move |conn| {
				let updated = conn.prepare_cached(ADVANCE)?.execute(params![
					index.0,
					millis(expires_at),
					reader,
					partition,
					owner,
					millis(now)
				])?;
				Ok(updated == 1)
			})
			.await
	}

	#[instrument(name = "store::sqlite::release", level = "debug", skip(self, lease), fields(
		partition = %lease.partition()
	))]
	async fn release(&self, lease: &Lease, now: u64) -> Result<bool> {
		let reader = lease.reader().as_str().to_string();
		let partition = lease.partition().0;
		let owner = lease.owner.as_str().to_string();

		self.conn
			.call("release bookmark", move |conn| {
				let updated =
					conn.prepare_cached(RELEASE)?.execute(params![millis(now), reader, partition, owner])?;
				Ok(updated == 1)
			})
			.await
	}

	#[instrument(name = "store::sqlite::list", level = "trace", skip(self, reader), fields(reader = %reader))]
	async fn list(&self, reader: &ReaderId) -> Result<Vec<Bookmark>> {
		let reader = reader.as_str().to_string();

		self.conn
			.call("list bookmarks", move |conn| {
				let mut stmt = conn.prepare_cached(LIST)?;
				let rows = stmt.query_map(params![reader], bookmark_from_row)?;
				rows.collect()
			})
			.await
	}
}

#[cfg(test)]
mod tests {
	use catchup_core::NewEvent;

	use super::*;

	fn reader() -> ReaderId {
		ReaderId::new("projector")
	}

	fn lease(bookmark: Bookmark, owner: &InstanceId, expires_at: u64) -> Lease {
		Lease {
			bookmark,
			owner: owner.clone(),
			expires_at,
		}
	}

	#[tokio::test]
	async fn test_claim_without_events_is_none() {
		let store = SqliteStore::testing_memory().await;
		let claimed = store.claim(&reader(), &InstanceId::new("a"), 1_000, 2_000).await.unwrap();
		assert!(claimed.is_none());
	}

	#[tokio::test]
	async fn test_claim_creates_bookmark_at_origin() {
		let store = SqliteStore::testing_memory().await;
		store.append(vec![NewEvent::new(3)]).await.unwrap();

		let owner = InstanceId::new("a");
		let claimed = store.claim(&reader(), &owner, 1_000, 2_000).await.unwrap().unwrap();

		assert_eq!(claimed.partition, PartitionId(3));
		assert_eq!(claimed.index, EventIndex::ORIGIN);
		assert_eq!(claimed.lease_owner, Some(owner));
		assert_eq!(claimed.lease_expiry, Some(2_000));
	}

	#[tokio::test]
	async fn test_claim_registers_every_partition_once() {
		let store = SqliteStore::testing_memory().await;
		let mut events = Vec::new();
		for partition in [1_000i64, -5, 7, 0, 7, -5, 1_000, 7] {
			events.push(NewEvent::new(partition));
		}
		store.append(events).await.unwrap();

		let a = InstanceId::new("a");
		let first = store.claim(&reader(), &a, 1_000, 60_000).await.unwrap().unwrap();
		assert_eq!(first.partition, PartitionId(-5));

		let partitions: Vec<_> =
			store.list(&reader()).await.unwrap().into_iter().map(|bookmark| bookmark.partition).collect();
		assert_eq!(partitions, vec![PartitionId(-5), PartitionId(0), PartitionId(7), PartitionId(1_000)]);

		store.append(vec![NewEvent::new(42i64), NewEvent::new(i64::MIN), NewEvent::new(0i64)]).await.unwrap();
		store.claim(&reader(), &a, 1_001, 60_000).await.unwrap().unwrap();

		let listed = store.list(&reader()).await.unwrap();
		let partitions: Vec<_> = listed.iter().map(|bookmark| bookmark.partition).collect();
		assert_eq!(
			partitions,
			vec![
				PartitionId(i64::MIN),
				PartitionId(-5),
				PartitionId(0),
				PartitionId(7),
				PartitionId(42),
				PartitionId(1_000)
			]
		);
		assert!(listed.iter().all(|bookmark| bookmark.index == EventIndex::ORIGIN));
		assert_eq!(listed.iter().filter(|bookmark| bookmark.lease_owner.is_some()).count(), 2);
	}

	#[tokio::test]
	async fn test_partition_registration_seeks_the_index() {
		let store = SqliteStore::testing_memory().await;
		let plan: Vec<String> = store
			.conn
			.call("explain", |conn| {
				let mut stmt = conn.prepare(&format!("EXPLAIN QUERY PLAN {REGISTER_PARTITIONS}"))?;
				let rows = stmt.query_map(params!["projector"], |row| row.get::<_, String>(3))?;
				rows.collect()
			})
			.await
			.unwrap();

		assert!(plan.iter().any(|detail| detail.contains("events_partition_index")), "{plan:?}");
		assert!(!plan.iter().any(|detail| detail.starts_with("SCAN events")), "{plan:?}");
	}

	#[tokio::test]
	async fn test_owned_bookmark_is_not_claimable_until_expiry() {
		let store = SqliteStore::testing_memory().await;
		store.append(vec![NewEvent::new(1)]).await.unwrap();

		let a = InstanceId::new("a");
		let b = InstanceId::new("b");
		assert!(store.claim(&reader(), &a, 1_000, 2_000).await.unwrap().is_some());
		assert!(store.claim(&reader(), &b, 1_999, 3_000).await.unwrap().is_none());

		let stolen = store.claim(&reader(), &b, 2_000, 4_000).await.unwrap().unwrap();
		assert_eq!(stolen.lease_owner, Some(b));
	}

	#[tokio::test]
	async fn test_readers_have_independent_bookmarks() {
		let store = SqliteStore::testing_memory().await;
		store.append(vec![NewEvent::new(1)]).await.unwrap();

		let owner = InstanceId::new("a");
		assert!(store.claim(&ReaderId::new("left"), &owner, 0, 10).await.unwrap().is_some());
		assert!(store.claim(&ReaderId::new("right"), &owner, 0, 10).await.unwrap().is_some());
	}

	#[tokio::test]
	async fn test_advance_requires_unexpired_ownership() {
		let store = SqliteStore::testing_memory().await;
		store.append(vec![NewEvent::new(1)]).await.unwrap();

		let a = InstanceId::new("a");
		let bookmark = store.claim(&reader(), &a, 1_000, 2_000).await.unwrap().unwrap();
		let held = lease(bookmark, &a, 2_000);

		assert!(store.advance(&held, EventIndex(5), 1_500, 2_500).await.unwrap());
		assert!(!store.advance(&held, EventIndex(6), 2_500, 3_500).await.unwrap());

		let listed = store.list(&reader()).await.unwrap();
		assert_eq!(listed[0].index, EventIndex(5));
		assert_eq!(listed[0].lease_expiry, Some(2_500));
	}

	#[tokio::test]
	async fn test_advance_never_moves_backwards() {
		let store = SqliteStore::testing_memory().await;
		store.append(vec![NewEvent::new(1)]).await.unwrap();

		let a = InstanceId::new("a");
		let bookmark = store.claim(&reader(), &a, 0, 10_000).await.unwrap().unwrap();
		let held = lease(bookmark, &a, 10_000);

		assert!(store.advance(&held, EventIndex(8), 1, 10_000).await.unwrap());
		assert!(!store.advance(&held, EventIndex(3), 2, 10_000).await.unwrap());
		assert_eq!(store.list(&reader()).await.unwrap()[0].index, EventIndex(8));
	}

	#[tokio::test]
	async fn test_release_makes_bookmark_claimable() {
		let store = SqliteStore::testing_memory().await;
		store.append(vec![NewEvent::new(1)]).await.unwrap();

		let a = InstanceId::new("a");
		let b = InstanceId::new("b");
		let bookmark = store.claim(&reader(), &a, 1_000, 60_000).await.unwrap().unwrap();
		assert!(store.release(&lease(bookmark, &a, 60_000), 1_100).await.unwrap());

		let claimed = store.claim(&reader(), &b, 1_200, 60_000).await.unwrap().unwrap();
		assert_eq!(claimed.lease_owner, Some(b));
	}

	#[tokio::test]
	async fn test_release_by_former_owner_fails() {
		let store = SqliteStore::testing_memory().await;
		store.append(vec![NewEvent::new(1)]).await.unwrap();

		let a = InstanceId::new("a");
		let b = InstanceId::new("b");
		let bookmark = store.claim(&reader(), &a, 0, 100).await.unwrap().unwrap();
		store.claim(&reader(), &b, 100, 200).await.unwrap().unwrap();

		assert!(!store.release(&lease(bookmark, &a, 100), 150).await.unwrap());
	}

	#[tokio::test]
	async fn test_claim_rotates_through_partitions() {
		let store = SqliteStore::testing_memory().await;
		store.append(vec![NewEvent::new(1), NewEvent::new(2), NewEvent::new(3)]).await.unwrap();

		let a = InstanceId::new("a");
		let mut seen = Vec::new();
		for step in 0..3u64 {
			let now = 1_000 + step * 10;
			let bookmark = store.claim(&reader(), &a, now, now + 60_000).await.unwrap().unwrap();
			seen.push(bookmark.partition);
			assert!(store.release(&lease(bookmark, &a, now + 60_000), now + 1).await.unwrap());
		}

		seen.sort();
		assert_eq!(seen, vec![PartitionId(1), PartitionId(2), PartitionId(3)]);
	}
}
