// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::BTreeMap, time::Duration};

use catchup_core::{BookmarkStore, EventIndex, InstanceId, PartitionId, ReaderConfig, ReaderId};
use catchup_reader::CatchUpReader;
use catchup_store_sqlite::{SqliteConfig, SqliteStore};
use catchup_testing::{RecordingConsumer, TempDir, fixture, wait_for};

fn config() -> ReaderConfig {
	ReaderConfig::new("projector")
		.with_limit(3)
		.with_lease_window(Duration::from_millis(20))
		.with_drained_backoff(Duration::from_millis(2))
		.with_idle_backoff(Duration::from_millis(2))
}

fn is_strictly_increasing(indexes: &[EventIndex]) -> bool {
	indexes.windows(2).all(|pair| pair[0] < pair[1])
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_instances_share_partitions_without_overlap() {
	let dir = TempDir::new().unwrap();
	let path = dir.join("events.db");

	let writer = SqliteStore::new(SqliteConfig::new(&path)).unwrap();
	writer.install_schema().await.unwrap();
	let mut expected = Vec::new();
	for partition in 1..=4 {
		expected.extend(writer.append(fixture::ticks(partition, 7)).await.unwrap());
	}

	let mut consumers = Vec::new();
	let mut handles = Vec::new();
	for instance in ["a", "b", "c"] {
		let store = SqliteStore::new(SqliteConfig::new(&path)).unwrap();
		let consumer = RecordingConsumer::new();
		let reader = CatchUpReader::new(config(), store, consumer.clone())
			.unwrap()
			.with_instance(InstanceId::new(instance));
		handles.push(reader.spawn());
		consumers.push(consumer);
	}

	wait_for(
		|| consumers.iter().map(RecordingConsumer::event_count).sum::<usize>() >= expected.len(),
		"all events should be consumed",
	)
	.await;

	for handle in handles {
		handle.shutdown().await.unwrap();
	}

	let mut delivered: BTreeMap<PartitionId, Vec<EventIndex>> = BTreeMap::new();
	for consumer in &consumers {
		for partition in 1..=4 {
			let indexes = consumer.indexes(PartitionId(partition));
			assert!(is_strictly_increasing(&indexes));
			delivered.entry(PartitionId(partition)).or_default().extend(indexes);
		}
	}

	let delivered_count: usize = delivered.values().map(Vec::len).sum();
	assert_eq!(delivered_count, expected.len());
	for indexes in delivered.values_mut() {
		indexes.sort();
		assert!(is_strictly_increasing(indexes));
	}

	let bookmarks = writer.list(&ReaderId::new("projector")).await.unwrap();
	assert_eq!(bookmarks.len(), 4);
	for bookmark in bookmarks {
		assert_eq!(bookmark.lease_owner, None);
		assert_eq!(Some(&bookmark.index), delivered[&bookmark.partition].last());
	}
}

#[tokio::test]
async fn test_spawned_reader_catches_up_with_new_events() {
	let store = SqliteStore::testing_memory().await;
	store.append(fixture::ticks(1, 2)).await.unwrap();

	let consumer = RecordingConsumer::new();
	let handle = CatchUpReader::new(config(), store.clone(), consumer.clone()).unwrap().spawn();
	assert!(handle.is_running());

	wait_for(|| consumer.event_count() == 2, "initial events should be consumed").await;

	store.append(fixture::ticks(2, 1)).await.unwrap();
	store.append(fixture::ticks(1, 1)).await.unwrap();
	wait_for(|| consumer.event_count() == 4, "new events should be consumed").await;

	handle.stop();
	handle.join().await.unwrap();

	let indexes = consumer.indexes(PartitionId(1));
	assert_eq!(indexes.len(), 3);
	assert!(is_strictly_increasing(&indexes));
}
