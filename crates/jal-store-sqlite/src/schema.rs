//! SQL schema for the Jal SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Derived from scheme_status; rewritten wholesale by refresh.
CREATE TABLE IF NOT EXISTS region (
    region_name                     TEXT PRIMARY KEY
                                    CHECK (region_name = trim(region_name) AND region_name <> ''),
    total_schemes_integrated        INTEGER NOT NULL DEFAULT 0,
    fully_completed_schemes         INTEGER NOT NULL DEFAULT 0,
    total_villages_integrated       INTEGER NOT NULL DEFAULT 0,
    fully_completed_villages        INTEGER NOT NULL DEFAULT 0,
    total_esr_integrated            INTEGER NOT NULL DEFAULT 0,
    fully_completed_esr             INTEGER NOT NULL DEFAULT 0,
    partial_esr                     INTEGER NOT NULL DEFAULT 0,
    flow_meter_integrated           INTEGER NOT NULL DEFAULT 0,
    rca_integrated                  INTEGER NOT NULL DEFAULT 0,
    pressure_transmitter_integrated INTEGER NOT NULL DEFAULT 0,
    updated_at                      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scheme_status (
    scheme_id                            TEXT NOT NULL CHECK (scheme_id <> ''),
    block                                TEXT NOT NULL COLLATE NOCASE CHECK (block <> ''),
    scheme_name                          TEXT NOT NULL,
    region                               TEXT NOT NULL CHECK (region = trim(region)),
    circle                               TEXT NOT NULL DEFAULT '',
    division                             TEXT NOT NULL DEFAULT '',
    sub_division                         TEXT NOT NULL DEFAULT '',
    agency                               TEXT,
    total_villages                       INTEGER NOT NULL DEFAULT 0 CHECK (total_villages >= 0),
    villages_integrated                  INTEGER NOT NULL DEFAULT 0 CHECK (villages_integrated >= 0),
    fully_completed_villages             INTEGER NOT NULL DEFAULT 0 CHECK (fully_completed_villages >= 0),
    total_esr                            INTEGER NOT NULL DEFAULT 0 CHECK (total_esr >= 0),
    esr_integrated_on_iot                INTEGER NOT NULL DEFAULT 0 CHECK (esr_integrated_on_iot >= 0),
    fully_completed_esr                  INTEGER NOT NULL DEFAULT 0 CHECK (fully_completed_esr >= 0),
    flow_meters_connected                INTEGER NOT NULL DEFAULT 0,
    residual_chlorine_analyzer_connected INTEGER NOT NULL DEFAULT 0,
    pressure_transmitter_connected       INTEGER NOT NULL DEFAULT 0,
    functional_status                    TEXT NOT NULL DEFAULT 'unknown',
    -- Segments as the report spelled them, for regions whose AF elements
    -- keep the original spacing.
    reported_circle                      TEXT,
    reported_division                    TEXT,
    reported_sub_division                TEXT,
    reported_block                       TEXT,
    dashboard_url                        TEXT,
    updated_at                           TEXT NOT NULL,
    PRIMARY KEY (scheme_id, block),
    CHECK (villages_integrated <= total_villages),
    CHECK (fully_completed_villages <= villages_integrated),
    CHECK (esr_integrated_on_iot <= total_esr),
    CHECK (fully_completed_esr <= esr_integrated_on_iot)
);

CREATE TABLE IF NOT EXISTS water_scheme_data (
    scheme_id                       TEXT NOT NULL CHECK (scheme_id <> ''),
    village_name                    TEXT NOT NULL COLLATE NOCASE CHECK (village_name <> ''),
    scheme_name                     TEXT NOT NULL,
    region                          TEXT NOT NULL CHECK (region = trim(region)),
    circle                          TEXT NOT NULL DEFAULT '',
    division                        TEXT NOT NULL DEFAULT '',
    sub_division                    TEXT NOT NULL DEFAULT '',
    block                           TEXT NOT NULL DEFAULT '',
    population                      INTEGER,
    number_of_esr                   INTEGER,
    water_values                    TEXT NOT NULL DEFAULT '[]',   -- JSON array of number|null
    lpcd_values                     TEXT NOT NULL DEFAULT '[]',   -- JSON array of number|null
    day_labels                      TEXT NOT NULL DEFAULT '[]',   -- JSON array of string|null
    consistent_zero_lpcd_for_a_week INTEGER NOT NULL DEFAULT 0,
    below_55_lpcd_count             INTEGER NOT NULL DEFAULT 0,
    above_55_lpcd_count             INTEGER NOT NULL DEFAULT 0,
    latest_lpcd                     REAL,
    reported_circle                 TEXT,
    reported_division               TEXT,
    reported_sub_division           TEXT,
    reported_block                  TEXT,
    dashboard_url                   TEXT,
    updated_at                      TEXT NOT NULL,
    PRIMARY KEY (scheme_id, village_name)
);

-- Append-only.
CREATE TABLE IF NOT EXISTS activity_log (
    id            TEXT PRIMARY KEY,
    session_id    TEXT,
    activity_type TEXT NOT NULL,
    description   TEXT,
    page          TEXT,
    metadata      TEXT,              -- JSON or NULL
    recorded_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS import_batch (
    batch_id           TEXT PRIMARY KEY,
    kind               TEXT NOT NULL,   -- 'scheme_status' | 'water_data'
    file_name          TEXT,
    content_sha256     TEXT NOT NULL,
    rows_read          INTEGER NOT NULL,
    inserted           INTEGER NOT NULL,
    updated            INTEGER NOT NULL,
    skipped_duplicates INTEGER NOT NULL,
    invalid_rows       INTEGER NOT NULL,
    imported_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS scheme_status_region_idx ON scheme_status(region);
CREATE INDEX IF NOT EXISTS water_region_idx         ON water_scheme_data(region);
CREATE INDEX IF NOT EXISTS water_latest_lpcd_idx    ON water_scheme_data(latest_lpcd);
CREATE INDEX IF NOT EXISTS activity_recorded_idx    ON activity_log(recorded_at);
CREATE INDEX IF NOT EXISTS import_hash_idx          ON import_batch(content_sha256);

PRAGMA user_version = 1;
";
