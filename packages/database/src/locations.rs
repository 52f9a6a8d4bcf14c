//! Query functions for location records.

use dispatch_emergency_models::Location;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use uuid::Uuid;

use crate::{DbError, now_rfc3339, parse_uuid};

/// Inserts a new location with a client-generated id and returns it.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert(
    db: &dyn Database,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Uuid, DbError> {
    let id = Uuid::new_v4();

    db.exec_raw_params(
        "INSERT INTO locations (id, latitude, longitude, time_created)
         VALUES ($1, $2, $3, $4)",
        &[
            DatabaseValue::String(id.to_string()),
            latitude.map_or(DatabaseValue::Null, DatabaseValue::Real64),
            longitude.map_or(DatabaseValue::Null, DatabaseValue::Real64),
            DatabaseValue::String(now_rfc3339()),
        ],
    )
    .await?;

    Ok(id)
}

/// Fetches a location by id, or `None` if it doesn't exist.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get(db: &dyn Database, id: Uuid) -> Result<Option<Location>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, latitude, longitude, accuracy, speed, heading,
                    time_created, time_updated
             FROM locations WHERE id = $1",
            &[DatabaseValue::String(id.to_string())],
        )
        .await?;

    rows.first().map(from_row).transpose()
}

/// Updates a location's coordinates, bumping `time_updated`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn update_coordinates(
    db: &dyn Database,
    id: Uuid,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE locations SET latitude = $2, longitude = $3, time_updated = $4
         WHERE id = $1",
        &[
            DatabaseValue::String(id.to_string()),
            latitude.map_or(DatabaseValue::Null, DatabaseValue::Real64),
            longitude.map_or(DatabaseValue::Null, DatabaseValue::Real64),
            DatabaseValue::String(now_rfc3339()),
        ],
    )
    .await?;

    Ok(())
}

/// Decodes a `locations` row into a [`Location`].
fn from_row(row: &switchy_database::Row) -> Result<Location, DbError> {
    let id: String = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to read location id: {e}"),
    })?;

    Ok(Location {
        id: parse_uuid("id", &id)?,
        latitude: row.to_value("latitude").unwrap_or(None),
        longitude: row.to_value("longitude").unwrap_or(None),
        accuracy: row.to_value("accuracy").unwrap_or(None),
        speed: row.to_value("speed").unwrap_or(None),
        heading: row.to_value("heading").unwrap_or(None),
        time_created: row.to_value("time_created").unwrap_or_default(),
        time_updated: row.to_value("time_updated").unwrap_or(None),
    })
}
