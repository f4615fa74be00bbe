// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	future::Future,
	io::{BufRead, Write},
};

use async_trait::async_trait;
use catchup_core::{BookmarkStore, Event, NewEvent, ReaderId};
use catchup_reader::{CatchUpReader, ConsumeError, EventConsume};
use catchup_store_sqlite::SqliteStore;
use catchup_type::Result;
use tokio::{
	io::{AsyncWrite, AsyncWriteExt},
	sync::Mutex,
};
use tracing::info;

use crate::{cli::ReadArgs, error::CliError};

pub async fn init(store: &SqliteStore) -> Result<()> {
	store.install_schema().await?;
	info!("schema installed");
	Ok(())
}

/// Parses one event per non-blank line.
pub fn parse_events(input: impl BufRead) -> Result<Vec<NewEvent>> {
	let mut events = Vec::new();
	for (number, line) in input.lines().enumerate() {
		let line = line.map_err(|err| CliError::Io {
			operation: "read stdin",
			reason: err.to_string(),
		})?;
		if line.trim().is_empty() {
			continue;
		}

		let event = serde_json::from_str(&line).map_err(|err| CliError::InvalidEvent {
			line: number + 1,
			reason: err.to_string(),
		})?;
		events.push(event);
	}
	Ok(events)
}

/// Appends events from `input` and writes each stored event to `output`.
pub async fn append(store: &SqliteStore, input: impl BufRead, mut output: impl Write) -> Result<usize> {
	let events = parse_events(input)?;
	let appended = store.append(events).await?;

	for event in &appended {
		write_json(&mut output, event)?;
	}
	info!(event_count = appended.len(), "events appended");
	Ok(appended.len())
}

pub async fn status(store: &SqliteStore, reader: &str, mut output: impl Write) -> Result<()> {
	for bookmark in store.list(&ReaderId::new(reader)).await? {
		write_json(&mut output, &bookmark)?;
	}
	Ok(())
}

/// Runs a reader until `shutdown` resolves, then returns its lease.
pub async fn read(
	store: SqliteStore,
	args: &ReadArgs,
	shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
	let consumer = JsonLines::new(tokio::io::stdout());
	let reader = CatchUpReader::new(args.reader_config(), store, consumer)?.with_instance(args.instance());
	let handle = reader.spawn();

	let stopper = handle.stopper();
	tokio::spawn(async move {
		shutdown.await;
		info!("shutting down reader");
		stopper.stop();
	});

	handle.join().await
}

fn write_json<T: serde::Serialize>(output: &mut impl Write, value: &T) -> Result<()> {
	let line = serde_json::to_string(value).map_err(|err| CliError::Io {
		operation: "encode json",
		reason: err.to_string(),
	})?;
	writeln!(output, "{line}").map_err(|err| CliError::Io {
		operation: "write output",
		reason: err.to_string(),
	})?;
	Ok(())
}

/// Writes every delivered event as one JSON line.
struct JsonLines<W> {
	output: Mutex<W>,
}

impl<W> JsonLines<W> {
	fn new(output: W) -> Self {
		Self {
			output: Mutex::new(output),
		}
	}
}

#[async_trait]
impl<W> EventConsume for JsonLines<W>
where
	W: AsyncWrite + Unpin + Send + 'static,
{
	async fn consume(&self, events: &[Event]) -> std::result::Result<(), ConsumeError> {
		let mut lines = Vec::new();
		for event in events {
			serde_json::to_writer(&mut lines, event)?;
			lines.push(b'\n');
		}

		let mut output = self.output.lock().await;
		output.write_all(&lines).await?;
		output.flush().await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use catchup_core::PartitionId;

	use super::*;

	#[test]
	fn test_parse_events_skips_blank_lines() {
		let input = Cursor::new("{\"partition\": 1, \"type\": \"A\"}\n\n{\"partition\": 2, \"actor\": \"alice\"}\n");
		let events = parse_events(input).unwrap();

		assert_eq!(events.len(), 2);
		assert_eq!(events[0].partition, PartitionId(1));
		assert_eq!(events[0].event_type.as_deref(), Some("A"));
		assert_eq!(events[1].actor.as_deref(), Some("alice"));
	}

	#[test]
	fn test_parse_events_reports_line() {
		let input = Cursor::new("{\"partition\": 1}\nnot json\n");
		let err = parse_events(input).unwrap_err();

		assert_eq!(err.code(), "CLI_001");
		assert!(err.to_string().contains("line 2"));
	}

	#[tokio::test]
	async fn test_append_then_status() {
		let store = SqliteStore::testing_memory().await;
		let mut appended = Vec::new();
		let count = append(&store, Cursor::new("{\"partition\": 3}\n{\"partition\": 3}\n"), &mut appended)
			.await
			.unwrap();
		assert_eq!(count, 2);
		assert_eq!(String::from_utf8(appended).unwrap().lines().count(), 2);

		let mut listed = Vec::new();
		status(&store, "projector", &mut listed).await.unwrap();
		assert!(listed.is_empty());
	}

	#[tokio::test]
	async fn test_json_lines_writes_one_line_per_event() {
		let store = SqliteStore::testing_memory().await;
		let appended = store.append(vec![NewEvent::new(1i64).event_type("A"), NewEvent::new(2i64)]).await.unwrap();

		let consumer = JsonLines::new(Vec::new());
		consumer.consume(&appended).await.unwrap();
		consumer.consume(&appended[..1]).await.unwrap();

		let written = String::from_utf8(consumer.output.into_inner()).unwrap();
		let decoded: Vec<Event> = written.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
		assert_eq!(decoded, vec![appended[0].clone(), appended[1].clone(), appended[0].clone()]);
	}
}
