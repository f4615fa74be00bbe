// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use async_trait::async_trait;
use catchup_core::{Event, EventLog, ScanRequest};
use catchup_type::Result;
use rusqlite::params_from_iter;
use tracing::instrument;

use crate::{SqliteStore, query::ScanQuery, row::EventRow};

#[async_trait]
impl EventLog for SqliteStore {
	#[instrument(name = "store::sqlite::scan", level = "trace", skip(self, request), fields(
		partition = %request.partition,
		after = %request.after,
		limit = request.limit
	))]
	async fn scan(&self, request: ScanRequest<'_>) -> Result<Vec<Event>> {
		let query = ScanQuery::build(request);

		self.conn
			.call("scan", move |conn| {
				let mut stmt = conn.prepare_cached(&query.sql)?;
				let rows = stmt.query_map(params_from_iter(query.params.iter()), EventRow::from_row)?;

				let mut events = Vec::new();
				for row in rows {
					events.push(row?.into_event()?);
				}
				Ok(events)
			})
			.await
	}
}

#[cfg(test)]
mod tests {
	use catchup_core::{EventIndex, NewEvent, PartitionId, ReadFilter};

	use super::*;

	fn scan_request(partition: i64, after: i64, limit: u32, filter: &ReadFilter) -> ScanRequest<'_> {
		ScanRequest {
			partition: PartitionId(partition),
			after: EventIndex(after),
			limit,
			filter,
		}
	}

	#[tokio::test]
	async fn test_scan_only_reads_requested_partition() {
		let store = SqliteStore::testing_memory().await;
		store.append(vec![NewEvent::new(1), NewEvent::new(2), NewEvent::new(1)]).await.unwrap();

		let filter = ReadFilter::default();
		let events = store.scan(scan_request(1, 0, 10, &filter)).await.unwrap();

		assert_eq!(events.len(), 2);
		assert!(events.iter().all(|event| event.partition == PartitionId(1)));
		assert!(events[0].index < events[1].index);
	}

	#[tokio::test]
	async fn test_scan_is_exclusive_of_bookmark_and_limited() {
		let store = SqliteStore::testing_memory().await;
		let appended = store.append((0..5).map(|_| NewEvent::new(1)).collect()).await.unwrap();

		let filter = ReadFilter::default();
		let events = store.scan(scan_request(1, appended[1].index.0, 2, &filter)).await.unwrap();

		let indexes: Vec<_> = events.iter().map(|event| event.index).collect();
		assert_eq!(indexes, vec![appended[2].index, appended[3].index]);
	}

	#[tokio::test]
	async fn test_scan_applies_filter() {
		let store = SqliteStore::testing_memory().await;
		store.append(vec![
			NewEvent::new(1).event_type("A"),
			NewEvent::new(1).event_type("B"),
			NewEvent::new(1).event_type("A"),
		])
		.await
		.unwrap();

		let filter = ReadFilter::new().with_types(["A"]);
		let events = store.scan(scan_request(1, 0, 10, &filter)).await.unwrap();

		assert_eq!(events.len(), 2);
		assert!(events.iter().all(|event| event.event_type.as_deref() == Some("A")));
	}

	#[tokio::test]
	async fn test_scan_past_tail_is_empty() {
		let store = SqliteStore::testing_memory().await;
		let appended = store.append(vec![NewEvent::new(1)]).await.unwrap();

		let filter = ReadFilter::default();
		let events = store.scan(scan_request(1, appended[0].index.0, 10, &filter)).await.unwrap();
		assert!(events.is_empty());
	}
}
