// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Translation of a scan request into parameterised SQL.

use catchup_core::{ReadFilter, ScanRequest};
use rusqlite::types::Value;

use crate::row::EVENT_COLUMNS;

/// Number of positional parameters fixed by the scan statement itself:
/// `?1` bookmark index, `?2` partition, `?3` limit.
const FIXED_PARAMS: usize = 3;

/// `IN (...)` predicates of a filter and the values they bind.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FilterSql {
	pub sql: String,
	pub params: Vec<String>,
}

/// Builds one `column IN (?n, ...)` predicate per non-empty filter field,
/// joined with `AND`, numbering placeholders from `first_placeholder`.
pub(crate) fn filter_to_sql(first_placeholder: usize, filter: &ReadFilter) -> FilterSql {
	let mut placeholder = first_placeholder;
	let mut parts = Vec::new();
	let mut params = Vec::new();

	for (field, values) in filter.active() {
		let placeholders = values
			.iter()
			.map(|value| {
				params.push(value.clone());
				let current = format!("?{placeholder}");
				placeholder += 1;
				current
			})
			.collect::<Vec<_>>()
			.join(", ");

		parts.push(format!("\"{}\" IN ({})", field.column(), placeholders));
	}

	FilterSql {
		sql: parts.join(" AND "),
		params,
	}
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScanQuery {
	pub sql: String,
	pub params: Vec<Value>,
}

impl ScanQuery {
	pub(crate) fn build(request: ScanRequest<'_>) -> Self {
		let filter = filter_to_sql(FIXED_PARAMS + 1, request.filter);

		let predicate = if filter.sql.is_empty() {
			String::new()
		} else {
			format!(" AND {}", filter.sql)
		};

		let sql = format!(
			"SELECT {EVENT_COLUMNS} FROM events WHERE \"index\" > ?1 AND \"partition\" = ?2{predicate} \
			 ORDER BY \"index\" ASC LIMIT ?3"
		);

		let mut params = Vec::with_capacity(FIXED_PARAMS + filter.params.len());
		params.push(Value::Integer(request.after.0));
		params.push(Value::Integer(request.partition.0));
		params.push(Value::Integer(i64::from(request.limit)));
		params.extend(filter.params.into_iter().map(Value::Text));

		Self {
			sql,
			params,
		}
	}
}
