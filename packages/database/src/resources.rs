//! Query functions for responder resources.

use dispatch_emergency_models::{Location, Resource, ResourceStatus, ResourceType};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use uuid::Uuid;

use crate::{DbError, now_rfc3339, parse_opt_uuid, parse_uuid};

/// A resource joined with its current-position location record.
#[derive(Debug, Clone)]
pub struct ResourceWithLocation {
    /// The resource row.
    pub resource: Resource,
    /// The joined `actual_location` row, if set.
    pub location: Option<Location>,
}

/// Inserts a fully-populated resource record.
///
/// The caller owns id generation and timestamps so that the same record
/// round-trips through [`get`].
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert(db: &dyn Database, resource: &Resource) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO resources (
            id, name, resource_type, status,
            actual_location, actual_address, normal_location, normal_address,
            responsible, telephone, email, time_created
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        &[
            DatabaseValue::String(resource.id.to_string()),
            DatabaseValue::String(resource.name.clone()),
            DatabaseValue::String(resource.resource_type.to_string()),
            DatabaseValue::String(resource.status.to_string()),
            opt_uuid_value(resource.actual_location),
            opt_uuid_value(resource.actual_address),
            opt_uuid_value(resource.normal_location),
            opt_uuid_value(resource.normal_address),
            opt_string_value(resource.responsible.as_ref()),
            opt_string_value(resource.telephone.as_ref()),
            opt_string_value(resource.email.as_ref()),
            DatabaseValue::String(resource.time_created.clone()),
        ],
    )
    .await?;

    Ok(())
}

/// Fetches a resource by id, or `None` if it doesn't exist.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get(db: &dyn Database, id: Uuid) -> Result<Option<Resource>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, resource_type, status,
                    actual_location, actual_address, normal_location, normal_address,
                    responsible, telephone, email, time_created, time_updated
             FROM resources WHERE id = $1",
            &[DatabaseValue::String(id.to_string())],
        )
        .await?;

    rows.first().map(from_row).transpose()
}

/// Lists all resources joined with their current-position locations.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_with_location(db: &dyn Database) -> Result<Vec<ResourceWithLocation>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT r.id, r.name, r.resource_type, r.status,
                    r.actual_location, r.actual_address,
                    r.normal_location, r.normal_address,
                    r.responsible, r.telephone, r.email,
                    r.time_created, r.time_updated,
                    l.id as loc_id, l.latitude as loc_latitude,
                    l.longitude as loc_longitude, l.accuracy as loc_accuracy,
                    l.speed as loc_speed, l.heading as loc_heading,
                    l.time_created as loc_time_created,
                    l.time_updated as loc_time_updated
             FROM resources r
             LEFT JOIN locations l ON l.id = r.actual_location
             ORDER BY r.time_created",
            &[],
        )
        .await?;

    let mut result = Vec::with_capacity(rows.len());
    for row in &rows {
        result.push(ResourceWithLocation {
            resource: from_row(row)?,
            location: joined_location(row)?,
        });
    }

    Ok(result)
}

/// Updates the directly-patchable scalar fields of a resource, bumping
/// `time_updated`. Location/address coordinates are written through
/// their own records, not here.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn update_fields(db: &dyn Database, resource: &Resource) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE resources SET
            name = $2, resource_type = $3, status = $4,
            responsible = $5, telephone = $6, email = $7,
            time_updated = $8
         WHERE id = $1",
        &[
            DatabaseValue::String(resource.id.to_string()),
            DatabaseValue::String(resource.name.clone()),
            DatabaseValue::String(resource.resource_type.to_string()),
            DatabaseValue::String(resource.status.to_string()),
            opt_string_value(resource.responsible.as_ref()),
            opt_string_value(resource.telephone.as_ref()),
            opt_string_value(resource.email.as_ref()),
            DatabaseValue::String(now_rfc3339()),
        ],
    )
    .await?;

    Ok(())
}

/// Sets a resource's availability status, bumping `time_updated`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn update_status(
    db: &dyn Database,
    id: Uuid,
    status: ResourceStatus,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE resources SET status = $2, time_updated = $3 WHERE id = $1",
        &[
            DatabaseValue::String(id.to_string()),
            DatabaseValue::String(status.to_string()),
            DatabaseValue::String(now_rfc3339()),
        ],
    )
    .await?;

    Ok(())
}

/// Deletes a resource row. Returns the number of rows deleted.
///
/// Callers must have removed assignment links and nulled emergency
/// pointers first; see the coordination crate's deletion cascade.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete(db: &dyn Database, id: Uuid) -> Result<u64, DbError> {
    let deleted = db
        .exec_raw_params(
            "DELETE FROM resources WHERE id = $1",
            &[DatabaseValue::String(id.to_string())],
        )
        .await?;

    Ok(deleted)
}

/// Decodes a `resources` row into a [`Resource`].
pub(crate) fn from_row(row: &switchy_database::Row) -> Result<Resource, DbError> {
    let id: String = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to read resource id: {e}"),
    })?;

    let resource_type: String = row.to_value("resource_type").unwrap_or_default();
    let status: String = row.to_value("status").unwrap_or_default();

    Ok(Resource {
        id: parse_uuid("id", &id)?,
        name: row.to_value("name").unwrap_or_default(),
        resource_type: resource_type
            .parse::<ResourceType>()
            .unwrap_or(ResourceType::Unknown),
        status: status
            .parse::<ResourceStatus>()
            .unwrap_or(ResourceStatus::Unknown),
        actual_location: parse_opt_uuid(
            "actual_location",
            row.to_value("actual_location").unwrap_or(None),
        )?,
        actual_address: parse_opt_uuid(
            "actual_address",
            row.to_value("actual_address").unwrap_or(None),
        )?,
        normal_location: parse_opt_uuid(
            "normal_location",
            row.to_value("normal_location").unwrap_or(None),
        )?,
        normal_address: parse_opt_uuid(
            "normal_address",
            row.to_value("normal_address").unwrap_or(None),
        )?,
        responsible: row.to_value("responsible").unwrap_or(None),
        telephone: row.to_value("telephone").unwrap_or(None),
        email: row.to_value("email").unwrap_or(None),
        time_created: row.to_value("time_created").unwrap_or_default(),
        time_updated: row.to_value("time_updated").unwrap_or(None),
    })
}

/// Decodes the `loc_`-prefixed columns of a joined row into a
/// [`Location`], or `None` when the LEFT JOIN matched nothing.
pub(crate) fn joined_location(row: &switchy_database::Row) -> Result<Option<Location>, DbError> {
    let loc_id: Option<String> = row.to_value("loc_id").unwrap_or(None);

    let Some(loc_id) = loc_id else {
        return Ok(None);
    };

    Ok(Some(Location {
        id: parse_uuid("loc_id", &loc_id)?,
        latitude: row.to_value("loc_latitude").unwrap_or(None),
        longitude: row.to_value("loc_longitude").unwrap_or(None),
        accuracy: row.to_value("loc_accuracy").unwrap_or(None),
        speed: row.to_value("loc_speed").unwrap_or(None),
        heading: row.to_value("loc_heading").unwrap_or(None),
        time_created: row.to_value("loc_time_created").unwrap_or_default(),
        time_updated: row.to_value("loc_time_updated").unwrap_or(None),
    }))
}

/// Converts an optional [`Uuid`] into a TEXT parameter.
pub(crate) fn opt_uuid_value(id: Option<Uuid>) -> DatabaseValue {
    id.map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.to_string()))
}

/// Converts an optional string into a TEXT parameter.
pub(crate) fn opt_string_value(value: Option<&String>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone()))
}
