// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Tables read and written by the store.
//!
//! The event table belongs to the writers of the log; installing it here is a
//! convenience for development and tests, there is no migration support.

pub(crate) const SCHEMA: &str = r#"
BEGIN;

CREATE TABLE IF NOT EXISTS events (
    "index"        INTEGER PRIMARY KEY AUTOINCREMENT,
    "partition"    INTEGER NOT NULL,
    date_time      INTEGER NOT NULL,
    type           TEXT,
    aggregate_type TEXT,
    aggregate_id   TEXT,
    actor          TEXT,
    payload        TEXT
);

CREATE INDEX IF NOT EXISTS events_partition_index ON events ("partition", "index");

CREATE TABLE IF NOT EXISTS bookmarks (
    reader       TEXT    NOT NULL,
    "partition"  INTEGER NOT NULL,
    "index"      INTEGER NOT NULL DEFAULT 0,
    lease_owner  TEXT,
    lease_expiry INTEGER,
    PRIMARY KEY (reader, "partition")
);

COMMIT;
"#;
