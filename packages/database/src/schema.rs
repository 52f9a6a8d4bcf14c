//! Schema bootstrap.
//!
//! Creates all tables if they don't already exist. The DDL is written to
//! the SQL subset both Postgres and `SQLite` accept, so the same
//! bootstrap serves production and the in-memory test databases.

use switchy_database::Database;

use crate::DbError;

/// Creates all tables and indexes if they don't already exist.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails.
pub async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS locations (
            id            TEXT PRIMARY KEY,
            latitude      DOUBLE PRECISION,
            longitude     DOUBLE PRECISION,
            accuracy      DOUBLE PRECISION,
            speed         DOUBLE PRECISION,
            heading       DOUBLE PRECISION,
            time_created  TEXT NOT NULL,
            time_updated  TEXT
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS addresses (
            id              TEXT PRIMARY KEY,
            street_number   TEXT,
            street_name     TEXT,
            neighborhood    TEXT,
            city            TEXT,
            state           TEXT,
            postal_code     TEXT,
            country         TEXT,
            country_code    TEXT,
            latitude        DOUBLE PRECISION,
            longitude       DOUBLE PRECISION,
            address_line_1  TEXT,
            time_created    TEXT NOT NULL,
            time_updated    TEXT
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS resources (
            id               TEXT PRIMARY KEY,
            name             TEXT NOT NULL,
            resource_type    TEXT NOT NULL,
            status           TEXT NOT NULL,
            actual_location  TEXT REFERENCES locations(id),
            actual_address   TEXT REFERENCES addresses(id),
            normal_location  TEXT REFERENCES locations(id),
            normal_address   TEXT REFERENCES addresses(id),
            responsible      TEXT,
            telephone        TEXT,
            email            TEXT,
            time_created     TEXT NOT NULL,
            time_updated     TEXT
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS emergencies (
            id                    TEXT PRIMARY KEY,
            name                  TEXT NOT NULL,
            description           TEXT NOT NULL,
            emergency_type        TEXT NOT NULL,
            priority              TEXT NOT NULL,
            status                TEXT NOT NULL,
            location_emergency    TEXT REFERENCES locations(id),
            address_emergency     TEXT REFERENCES addresses(id),
            resource_id           TEXT REFERENCES resources(id),
            location_resource     TEXT REFERENCES locations(id),
            address_resource      TEXT REFERENCES addresses(id),
            destination_id        TEXT REFERENCES resources(id),
            location_destination  TEXT REFERENCES locations(id),
            address_destination   TEXT REFERENCES addresses(id),
            name_contact          TEXT,
            telephone_contact     TEXT,
            id_contact            TEXT,
            time_created          TEXT NOT NULL,
            time_updated          TEXT
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS emergency_resource_links (
            emergency_id  TEXT NOT NULL REFERENCES emergencies(id),
            resource_id   TEXT NOT NULL REFERENCES resources(id),
            PRIMARY KEY (emergency_id, resource_id)
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_links_resource
         ON emergency_resource_links (resource_id)",
    )
    .await?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_emergencies_status
         ON emergencies (status)",
    )
    .await?;

    log::info!("Database schema ensured");

    Ok(())
}
