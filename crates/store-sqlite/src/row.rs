// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use catchup_core::{Event, EventIndex, NewEvent, PartitionId};
use chrono::{DateTime, Utc};
use rusqlite::{
	Row,
	types::{Type, Value},
};

/// Columns of the `events` table in the order [`EventRow::from_row`] reads them.
pub(crate) const EVENT_COLUMNS: &str =
	r#""index", "partition", date_time, type, aggregate_type, aggregate_id, actor, payload"#;

/// An `events` row as stored, before decoding timestamps and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
	pub index: i64,
	pub partition: i64,
	/// Unix milliseconds
	pub date_time: i64,
	pub r#type: Option<String>,
	pub aggregate_type: Option<String>,
	pub aggregate_id: Option<String>,
	pub actor: Option<String>,
	/// JSON text
	pub payload: Option<String>,
}

impl EventRow {
	pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
		Ok(Self {
			index: row.get(0)?,
			partition: row.get(1)?,
			date_time: row.get(2)?,
			r#type: row.get(3)?,
			aggregate_type: row.get(4)?,
			aggregate_id: row.get(5)?,
			actor: row.get(6)?,
			payload: row.get(7)?,
		})
	}

	pub fn from_event(event: &Event) -> Self {
		Self {
			index: event.index.0,
			partition: event.partition.0,
			date_time: event.occurred_at.timestamp_millis(),
			r#type: event.event_type.clone(),
			aggregate_type: event.aggregate_type.clone(),
			aggregate_id: event.aggregate_id.clone(),
			actor: event.actor.clone(),
			payload: event.payload.as_ref().map(|payload| payload.to_string()),
		}
	}

	pub fn into_event(self) -> rusqlite::Result<Event> {
		let occurred_at = DateTime::<Utc>::from_timestamp_millis(self.date_time)
			.ok_or(rusqlite::Error::IntegralValueOutOfRange(2, self.date_time))?;

		let payload = self
			.payload
			.map(|text| serde_json::from_str(&text))
			.transpose()
			.map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

		Ok(Event {
			index: EventIndex(self.index),
			partition: PartitionId(self.partition),
			occurred_at,
			event_type: self.r#type,
			aggregate_type: self.aggregate_type,
			aggregate_id: self.aggregate_id,
			actor: self.actor,
			payload,
		})
	}

	/// Bind values for every column except `index`, in [`EVENT_COLUMNS`] order.
	pub fn insert_params(&self) -> [Value; 7] {
		[
			Value::Integer(self.partition),
			Value::Integer(self.date_time),
			optional_text(&self.r#type),
			optional_text(&self.aggregate_type),
			optional_text(&self.aggregate_id),
			optional_text(&self.actor),
			optional_text(&self.payload),
		]
	}
}

impl From<&NewEvent> for EventRow {
	fn from(event: &NewEvent) -> Self {
		Self {
			index: 0,
			partition: event.partition.0,
			date_time: event.occurred_at.timestamp_millis(),
			r#type: event.event_type.clone(),
			aggregate_type: event.aggregate_type.clone(),
			aggregate_id: event.aggregate_id.clone(),
			actor: event.actor.clone(),
			payload: event.payload.as_ref().map(|payload| payload.to_string()),
		}
	}
}

fn optional_text(value: &Option<String>) -> Value {
	match value {
		Some(text) => Value::Text(text.clone()),
		None => Value::Null,
	}
}

#[cfg(test)]
mod tests {
	use rusqlite::{Connection, params_from_iter};
	use serde_json::json;

	use super::*;
	use crate::schema::SCHEMA;

	fn stored(conn: &Connection, event: &NewEvent) -> EventRow {
		let row = EventRow::from(event);
		conn.execute(
			r#"INSERT INTO events ("partition", date_time, type, aggregate_type, aggregate_id, actor, payload)
			   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
			params_from_iter(row.insert_params()),
		)
		.unwrap();

		conn.query_row(
			&format!(r#"SELECT {EVENT_COLUMNS} FROM events WHERE "index" = ?1"#),
			[conn.last_insert_rowid()],
			EventRow::from_row,
		)
		.unwrap()
	}

	#[test]
	fn test_row_event_row_round_trip() {
		let conn = Connection::open_in_memory().unwrap();
		conn.execute_batch(SCHEMA).unwrap();

		let new = NewEvent::new(4)
			.event_type("OrderPlaced")
			.aggregate("order", "o-17")
			.actor("alice")
			.payload(json!({"total": 12.5, "items": [1, 2]}));

		let row = stored(&conn, &new);
		let event = row.clone().into_event().unwrap();

		assert_eq!(event.partition, PartitionId(4));
		assert_eq!(event.index, EventIndex(row.index));
		assert_eq!(event.payload, Some(json!({"total": 12.5, "items": [1, 2]})));

		let back = EventRow::from_event(&event);
		assert_eq!(back.index, row.index);
		assert_eq!(back.partition, row.partition);
		assert_eq!(back.r#type.as_deref(), Some("OrderPlaced"));
		assert_eq!(back.aggregate_type.as_deref(), Some("order"));
		assert_eq!(back.aggregate_id.as_deref(), Some("o-17"));
		assert_eq!(back.actor.as_deref(), Some("alice"));
		assert_eq!(back.insert_params(), row.insert_params());
	}

	#[test]
	fn test_missing_optionals_stay_null() {
		let conn = Connection::open_in_memory().unwrap();
		conn.execute_batch(SCHEMA).unwrap();

		let row = stored(&conn, &NewEvent::new(1));
		let event = row.into_event().unwrap();

		assert!(event.event_type.is_none());
		assert!(event.actor.is_none());
		assert!(event.payload.is_none());
	}

	#[test]
	fn test_invalid_payload_is_conversion_error() {
		let row = EventRow {
			index: 1,
			partition: 1,
			date_time: 0,
			r#type: None,
			aggregate_type: None,
			aggregate_id: None,
			actor: None,
			payload: Some("{not json".to_string()),
		};

		assert!(matches!(row.into_event(), Err(rusqlite::Error::FromSqlConversionFailure(7, Type::Text, _))));
	}
}
