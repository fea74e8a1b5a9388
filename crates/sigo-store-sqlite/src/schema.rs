//! SQL schema for the SIGO SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Persons, absences and restrictions, one JSON document per record.
CREATE TABLE IF NOT EXISTS records (
    kind  TEXT    NOT NULL,   -- 'person' | 'absence' | 'restriction'
    id    INTEGER NOT NULL,
    body  TEXT    NOT NULL,
    PRIMARY KEY (kind, id)
);

-- Last issued value of each id sequence.
CREATE TABLE IF NOT EXISTS counters (
    name   TEXT PRIMARY KEY,
    value  INTEGER NOT NULL
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS audit_log (
    id           INTEGER PRIMARY KEY,
    entity       TEXT    NOT NULL,
    entity_id    INTEGER NOT NULL,
    action       TEXT    NOT NULL,   -- 'CREATE' | 'UPDATE' | 'DELETE'
    actor        TEXT    NOT NULL,
    recorded_at  TEXT    NOT NULL,   -- RFC 3339 UTC
    before_json  TEXT,
    after_json   TEXT,
    description  TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS audit_entity_idx ON audit_log(entity, entity_id);

PRAGMA user_version = 1;
";
