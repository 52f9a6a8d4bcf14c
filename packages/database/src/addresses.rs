//! Query functions for address records.

use dispatch_emergency_models::Address;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use uuid::Uuid;

use crate::{DbError, now_rfc3339, parse_uuid};

/// Inserts a new address with a client-generated id and returns it.
///
/// Only coordinates are captured at creation time; the postal fields are
/// reserved for reverse-geocoding enrichment.
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
        "INSERT INTO addresses (id, latitude, longitude, time_created)
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

/// Fetches an address by id, or `None` if it doesn't exist.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get(db: &dyn Database, id: Uuid) -> Result<Option<Address>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, street_number, street_name, neighborhood, city, state,
                    postal_code, country, country_code, latitude, longitude,
                    address_line_1, time_created, time_updated
             FROM addresses WHERE id = $1",
            &[DatabaseValue::String(id.to_string())],
        )
        .await?;

    rows.first().map(from_row).transpose()
}

/// Updates an address's coordinates, bumping `time_updated`.
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
        "UPDATE addresses SET latitude = $2, longitude = $3, time_updated = $4
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

/// Decodes an `addresses` row into an [`Address`].
fn from_row(row: &switchy_database::Row) -> Result<Address, DbError> {
    let id: String = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to read address id: {e}"),
    })?;

    Ok(Address {
        id: parse_uuid("id", &id)?,
        street_number: row.to_value("street_number").unwrap_or(None),
        street_name: row.to_value("street_name").unwrap_or(None),
        neighborhood: row.to_value("neighborhood").unwrap_or(None),
        city: row.to_value("city").unwrap_or(None),
        state: row.to_value("state").unwrap_or(None),
        postal_code: row.to_value("postal_code").unwrap_or(None),
        country: row.to_value("country").unwrap_or(None),
        country_code: row.to_value("country_code").unwrap_or(None),
        latitude: row.to_value("latitude").unwrap_or(None),
        longitude: row.to_value("longitude").unwrap_or(None),
        address_line_1: row.to_value("address_line_1").unwrap_or(None),
        time_created: row.to_value("time_created").unwrap_or_default(),
        time_updated: row.to_value("time_updated").unwrap_or(None),
    })
}
