// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use catchup_core::{Event, NewEvent};
use catchup_type::Result;
use rusqlite::params_from_iter;
use tracing::instrument;

use crate::{SqliteStore, row::EventRow};

const INSERT_EVENT: &str = r#"
INSERT INTO events ("partition", date_time, type, aggregate_type, aggregate_id, actor, payload)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
RETURNING "index"
"#;

impl SqliteStore {
	/// Appends `events` in one transaction and returns them with the indexes
	/// the log assigned, in input order, exactly as a scan would read them.
	#[instrument(name = "store::sqlite::append", level = "debug", skip(self, events), fields(
		event_count = events.len()
	))]
	pub async fn append(&self, events: Vec<NewEvent>) -> Result<Vec<Event>> {
		self.conn
			.call("append", move |conn| {
				let tx = conn.transaction()?;
				let mut appended = Vec::with_capacity(events.len());
				{
					let mut stmt = tx.prepare_cached(INSERT_EVENT)?;
					for event in events {
						let mut row = EventRow::from(&event);
						row.index = stmt.query_row(params_from_iter(row.insert_params()), |row| row.get(0))?;
						appended.push(row.into_event()?);
					}
				}
				tx.commit()?;
				Ok(appended)
			})
			.await
	}
}
