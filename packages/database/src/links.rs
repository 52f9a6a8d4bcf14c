//! Query functions for the emergency↔resource assignment table.
//!
//! The assignment table is mutated only through the coordination crate's
//! transactional services; these functions are the raw building blocks.

use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use uuid::Uuid;

use crate::{DbError, parse_uuid};

/// Returns the ids of all resources currently linked to an emergency.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn resource_ids_for_emergency(
    db: &dyn Database,
    emergency_id: Uuid,
) -> Result<Vec<Uuid>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT resource_id FROM emergency_resource_links
             WHERE emergency_id = $1
             ORDER BY resource_id",
            &[DatabaseValue::String(emergency_id.to_string())],
        )
        .await?;

    rows.iter()
        .map(|row| {
            let id: String = row.to_value("resource_id").unwrap_or_default();
            parse_uuid("resource_id", &id)
        })
        .collect()
}

/// Inserts one assignment link row.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert(
    db: &dyn Database,
    emergency_id: Uuid,
    resource_id: Uuid,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO emergency_resource_links (emergency_id, resource_id)
         VALUES ($1, $2)",
        &[
            DatabaseValue::String(emergency_id.to_string()),
            DatabaseValue::String(resource_id.to_string()),
        ],
    )
    .await?;

    Ok(())
}

/// Deletes every link row for an emergency. Returns the number deleted.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete_for_emergency(db: &dyn Database, emergency_id: Uuid) -> Result<u64, DbError> {
    let deleted = db
        .exec_raw_params(
            "DELETE FROM emergency_resource_links WHERE emergency_id = $1",
            &[DatabaseValue::String(emergency_id.to_string())],
        )
        .await?;

    Ok(deleted)
}

/// Deletes every link row referencing a resource. Returns the number
/// deleted.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete_for_resource(db: &dyn Database, resource_id: Uuid) -> Result<u64, DbError> {
    let deleted = db
        .exec_raw_params(
            "DELETE FROM emergency_resource_links WHERE resource_id = $1",
            &[DatabaseValue::String(resource_id.to_string())],
        )
        .await?;

    Ok(deleted)
}
