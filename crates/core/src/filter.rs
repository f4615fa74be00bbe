// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The closed set of event attributes a [`ReadFilter`] can restrict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
	Type,
	AggregateType,
	AggregateId,
	Actor,
}

impl FilterField {
	/// All fields, in the order their predicates are emitted.
	pub const ALL: [FilterField; 4] =
		[FilterField::Type, FilterField::AggregateType, FilterField::AggregateId, FilterField::Actor];

	/// Column of the `events` table holding this attribute.
	pub const fn column(self) -> &'static str {
		match self {
			FilterField::Type => "type",
			FilterField::AggregateType => "aggregate_type",
			FilterField::AggregateId => "aggregate_id",
			FilterField::Actor => "actor",
		}
	}
}

/// Conjunction of optional inclusion sets over event attributes.
///
/// An empty set places no restriction on its attribute, so the default
/// filter matches every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadFilter {
	pub types: BTreeSet<String>,
	pub aggregate_types: BTreeSet<String>,
	pub aggregate_ids: BTreeSet<String>,
	pub actors: BTreeSet<String>,
}

impl ReadFilter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_types<I, S>(mut self, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.types.extend(values.into_iter().map(Into::into));
		self
	}

	pub fn with_aggregate_types<I, S>(mut self, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.aggregate_types.extend(values.into_iter().map(Into::into));
		self
	}

	pub fn with_aggregate_ids<I, S>(mut self, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.aggregate_ids.extend(values.into_iter().map(Into::into));
		self
	}

	pub fn with_actors<I, S>(mut self, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.actors.extend(values.into_iter().map(Into::into));
		self
	}

	pub fn values(&self, field: FilterField) -> &BTreeSet<String> {
		match field {
			FilterField::Type => &self.types,
			FilterField::AggregateType => &self.aggregate_types,
			FilterField::AggregateId => &self.aggregate_ids,
			FilterField::Actor => &self.actors,
		}
	}

	/// Fields with a non-empty inclusion set, in [`FilterField::ALL`] order.
	pub fn active(&self) -> impl Iterator<Item = (FilterField, &BTreeSet<String>)> {
		FilterField::ALL.into_iter().map(|field| (field, self.values(field))).filter(|(_, set)| !set.is_empty())
	}

	pub fn is_empty(&self) -> bool {
		self.active().next().is_none()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_is_empty() {
		let filter = ReadFilter::default();

		assert!(filter.is_empty());
		assert_eq!(filter.active().count(), 0);
	}

	#[test]
	fn test_values_per_field() {
		let filter = ReadFilter::new().with_types(["A", "B", "A"]).with_aggregate_ids(["o-1"]);

		assert!(!filter.is_empty());
		assert_eq!(filter.values(FilterField::Type).len(), 2);
		assert!(filter.values(FilterField::AggregateId).contains("o-1"));
		assert!(filter.values(FilterField::Actor).is_empty());
	}

	#[test]
	fn test_active_order_skips_empty() {
		let filter = ReadFilter::new().with_actors(["x"]).with_types(["t"]);
		let fields: Vec<_> = filter.active().map(|(field, _)| field).collect();
		assert_eq!(fields, vec![FilterField::Type, FilterField::Actor]);
	}

	#[test]
	fn test_columns() {
		let columns: Vec<_> = FilterField::ALL.iter().map(|field| field.column()).collect();
		assert_eq!(columns, vec!["type", "aggregate_type", "aggregate_id", "actor"]);
	}

	#[test]
	fn test_deserialize_partial() {
		let filter: ReadFilter = serde_json::from_str(r#"{"aggregate_ids": ["o-1", "o-2"]}"#).unwrap();
		assert_eq!(filter.aggregate_ids.len(), 2);
		assert!(filter.types.is_empty());
	}
}
