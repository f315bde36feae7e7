//! SQL schema for the fleet PM SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Display-only; plans reference plates without a foreign key so that a plan
-- can be set up before its vehicle is registered.
CREATE TABLE IF NOT EXISTS vehicles (
    license_plate TEXT PRIMARY KEY,
    make          TEXT,
    model         TEXT,
    description   TEXT
);

CREATE TABLE IF NOT EXISTS maintenance_plans (
    plan_id               TEXT PRIMARY KEY,
    vehicle_license_plate TEXT NOT NULL,
    plan_name             TEXT NOT NULL,
    last_service_date     TEXT NOT NULL,     -- YYYY-MM-DD
    frequency_value       INTEGER NOT NULL,
    frequency_unit        TEXT NOT NULL,     -- 'days' | 'weeks' | 'months'
    last_service_mileage  INTEGER NOT NULL,
    mileage_frequency     INTEGER NOT NULL,
    created_at            TEXT NOT NULL,     -- RFC 3339 UTC
    updated_at            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS repair_records (
    repair_id             TEXT PRIMARY KEY,
    vehicle_license_plate TEXT NOT NULL,
    repair_date           TEXT,
    mileage               INTEGER,
    description           TEXT NOT NULL DEFAULT '',
    created_at            TEXT NOT NULL      -- server-assigned
);

-- Sparse manual overrides: months_json maps month index (0-11) to status.
CREATE TABLE IF NOT EXISTS annual_pm_plans (
    vehicle_license_plate TEXT NOT NULL,
    maintenance_plan_id   TEXT NOT NULL,
    year                  INTEGER NOT NULL,
    months_json           TEXT NOT NULL DEFAULT '{}',
    PRIMARY KEY (vehicle_license_plate, maintenance_plan_id, year)
);

-- Service history outlives the plan it was logged against.
CREATE TABLE IF NOT EXISTS pm_history (
    history_id            TEXT PRIMARY KEY,
    maintenance_plan_id   TEXT NOT NULL,
    vehicle_license_plate TEXT NOT NULL,
    plan_name             TEXT NOT NULL,
    service_date          TEXT NOT NULL,
    mileage               INTEGER NOT NULL,
    technician_id         TEXT,
    target_service_date   TEXT,
    target_mileage        INTEGER,
    notes                 TEXT NOT NULL DEFAULT '',
    recorded_at           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS plans_vehicle_idx   ON maintenance_plans(vehicle_license_plate);
CREATE INDEX IF NOT EXISTS repairs_vehicle_idx ON repair_records(vehicle_license_plate);
CREATE INDEX IF NOT EXISTS annual_year_idx     ON annual_pm_plans(year);
CREATE INDEX IF NOT EXISTS history_plan_idx    ON pm_history(maintenance_plan_id);

PRAGMA user_version = 1;
";
