//! Query functions for emergency records.

use dispatch_emergency_models::{Emergency, EmergencyStatus, EmergencyType, Location, Priority};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use uuid::Uuid;

use crate::resources::{joined_location, opt_string_value, opt_uuid_value};
use crate::{DbError, now_rfc3339, parse_opt_uuid, parse_uuid};

/// An emergency joined with its incident-site location record.
#[derive(Debug, Clone)]
pub struct EmergencyWithLocation {
    /// The emergency row.
    pub emergency: Emergency,
    /// The joined `location_emergency` row, if set.
    pub location: Option<Location>,
}

/// Inserts a fully-populated emergency record.
///
/// The caller owns id generation and timestamps so that the same record
/// round-trips through [`get`].
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert(db: &dyn Database, emergency: &Emergency) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO emergencies (
            id, name, description, emergency_type, priority, status,
            location_emergency, address_emergency,
            resource_id, location_resource, address_resource,
            destination_id, location_destination, address_destination,
            name_contact, telephone_contact, id_contact, time_created
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                  $14, $15, $16, $17, $18)",
        &[
            DatabaseValue::String(emergency.id.to_string()),
            DatabaseValue::String(emergency.name.clone()),
            DatabaseValue::String(emergency.description.clone()),
            DatabaseValue::String(emergency.emergency_type.to_string()),
            DatabaseValue::String(emergency.priority.to_string()),
            DatabaseValue::String(emergency.status.to_string()),
            opt_uuid_value(emergency.location_emergency),
            opt_uuid_value(emergency.address_emergency),
            opt_uuid_value(emergency.resource_id),
            opt_uuid_value(emergency.location_resource),
            opt_uuid_value(emergency.address_resource),
            opt_uuid_value(emergency.destination_id),
            opt_uuid_value(emergency.location_destination),
            opt_uuid_value(emergency.address_destination),
            opt_string_value(emergency.name_contact.as_ref()),
            opt_string_value(emergency.telephone_contact.as_ref()),
            opt_string_value(emergency.id_contact.as_ref()),
            DatabaseValue::String(emergency.time_created.clone()),
        ],
    )
    .await?;

    Ok(())
}

/// Fetches an emergency by id, or `None` if it doesn't exist.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get(db: &dyn Database, id: Uuid) -> Result<Option<Emergency>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, description, emergency_type, priority, status,
                    location_emergency, address_emergency,
                    resource_id, location_resource, address_resource,
                    destination_id, location_destination, address_destination,
                    name_contact, telephone_contact, id_contact,
                    time_created, time_updated
             FROM emergencies WHERE id = $1",
            &[DatabaseValue::String(id.to_string())],
        )
        .await?;

    rows.first().map(from_row).transpose()
}

/// Lists all emergencies joined with their incident-site locations.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_with_location(db: &dyn Database) -> Result<Vec<EmergencyWithLocation>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT e.id, e.name, e.description, e.emergency_type, e.priority,
                    e.status, e.location_emergency, e.address_emergency,
                    e.resource_id, e.location_resource, e.address_resource,
                    e.destination_id, e.location_destination,
                    e.address_destination, e.name_contact,
                    e.telephone_contact, e.id_contact,
                    e.time_created, e.time_updated,
                    l.id as loc_id, l.latitude as loc_latitude,
                    l.longitude as loc_longitude, l.accuracy as loc_accuracy,
                    l.speed as loc_speed, l.heading as loc_heading,
                    l.time_created as loc_time_created,
                    l.time_updated as loc_time_updated
             FROM emergencies e
             LEFT JOIN locations l ON l.id = e.location_emergency
             ORDER BY e.time_created",
            &[],
        )
        .await?;

    let mut result = Vec::with_capacity(rows.len());
    for row in &rows {
        result.push(EmergencyWithLocation {
            emergency: from_row(row)?,
            location: joined_location(row)?,
        });
    }

    Ok(result)
}

/// Writes back every patchable field of an emergency, bumping
/// `time_updated`. The caller merges the sparse patch onto a loaded
/// record first; this persists the merged result.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn update(db: &dyn Database, emergency: &Emergency) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE emergencies SET
            name = $2, description = $3, emergency_type = $4, priority = $5,
            status = $6, location_emergency = $7, address_emergency = $8,
            resource_id = $9, location_resource = $10, address_resource = $11,
            destination_id = $12, location_destination = $13,
            address_destination = $14, name_contact = $15,
            telephone_contact = $16, id_contact = $17, time_updated = $18
         WHERE id = $1",
        &[
            DatabaseValue::String(emergency.id.to_string()),
            DatabaseValue::String(emergency.name.clone()),
            DatabaseValue::String(emergency.description.clone()),
            DatabaseValue::String(emergency.emergency_type.to_string()),
            DatabaseValue::String(emergency.priority.to_string()),
            DatabaseValue::String(emergency.status.to_string()),
            opt_uuid_value(emergency.location_emergency),
            opt_uuid_value(emergency.address_emergency),
            opt_uuid_value(emergency.resource_id),
            opt_uuid_value(emergency.location_resource),
            opt_uuid_value(emergency.address_resource),
            opt_uuid_value(emergency.destination_id),
            opt_uuid_value(emergency.location_destination),
            opt_uuid_value(emergency.address_destination),
            opt_string_value(emergency.name_contact.as_ref()),
            opt_string_value(emergency.telephone_contact.as_ref()),
            opt_string_value(emergency.id_contact.as_ref()),
            DatabaseValue::String(now_rfc3339()),
        ],
    )
    .await?;

    Ok(())
}

/// Deletes an emergency row. Returns the number of rows deleted.
///
/// Assignment links are cleaned up by the coordination crate in the same
/// transaction.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete(db: &dyn Database, id: Uuid) -> Result<u64, DbError> {
    let deleted = db
        .exec_raw_params(
            "DELETE FROM emergencies WHERE id = $1",
            &[DatabaseValue::String(id.to_string())],
        )
        .await?;

    Ok(deleted)
}

/// Nulls the primary-responder pointer on every emergency that points at
/// the given resource.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn clear_resource_pointer(db: &dyn Database, resource_id: Uuid) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE emergencies SET resource_id = NULL, time_updated = $2
         WHERE resource_id = $1",
        &[
            DatabaseValue::String(resource_id.to_string()),
            DatabaseValue::String(now_rfc3339()),
        ],
    )
    .await?;

    Ok(())
}

/// Nulls the destination pointer on every emergency that points at the
/// given resource.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn clear_destination_pointer(
    db: &dyn Database,
    resource_id: Uuid,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE emergencies SET destination_id = NULL, time_updated = $2
         WHERE destination_id = $1",
        &[
            DatabaseValue::String(resource_id.to_string()),
            DatabaseValue::String(now_rfc3339()),
        ],
    )
    .await?;

    Ok(())
}

/// Lists the emergencies currently linked to a resource through the
/// assignment table.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_for_resource(
    db: &dyn Database,
    resource_id: Uuid,
) -> Result<Vec<Emergency>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT e.id, e.name, e.description, e.emergency_type, e.priority,
                    e.status, e.location_emergency, e.address_emergency,
                    e.resource_id, e.location_resource, e.address_resource,
                    e.destination_id, e.location_destination,
                    e.address_destination, e.name_contact,
                    e.telephone_contact, e.id_contact,
                    e.time_created, e.time_updated
             FROM emergencies e
             JOIN emergency_resource_links erl ON erl.emergency_id = e.id
             WHERE erl.resource_id = $1
             ORDER BY e.time_created",
            &[DatabaseValue::String(resource_id.to_string())],
        )
        .await?;

    rows.iter().map(from_row).collect()
}

/// Decodes an `emergencies` row into an [`Emergency`].
fn from_row(row: &switchy_database::Row) -> Result<Emergency, DbError> {
    let id: String = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to read emergency id: {e}"),
    })?;

    let emergency_type: String = row.to_value("emergency_type").unwrap_or_default();
    let priority: String = row.to_value("priority").unwrap_or_default();
    let status: String = row.to_value("status").unwrap_or_default();

    Ok(Emergency {
        id: parse_uuid("id", &id)?,
        name: row.to_value("name").unwrap_or_default(),
        description: row.to_value("description").unwrap_or_default(),
        emergency_type: emergency_type
            .parse::<EmergencyType>()
            .unwrap_or_default(),
        priority: priority.parse::<Priority>().unwrap_or_default(),
        status: status.parse::<EmergencyStatus>().unwrap_or_default(),
        location_emergency: parse_opt_uuid(
            "location_emergency",
            row.to_value("location_emergency").unwrap_or(None),
        )?,
        address_emergency: parse_opt_uuid(
            "address_emergency",
            row.to_value("address_emergency").unwrap_or(None),
        )?,
        resource_id: parse_opt_uuid("resource_id", row.to_value("resource_id").unwrap_or(None))?,
        location_resource: parse_opt_uuid(
            "location_resource",
            row.to_value("location_resource").unwrap_or(None),
        )?,
        address_resource: parse_opt_uuid(
            "address_resource",
            row.to_value("address_resource").unwrap_or(None),
        )?,
        destination_id: parse_opt_uuid(
            "destination_id",
            row.to_value("destination_id").unwrap_or(None),
        )?,
        location_destination: parse_opt_uuid(
            "location_destination",
            row.to_value("location_destination").unwrap_or(None),
        )?,
        address_destination: parse_opt_uuid(
            "address_destination",
            row.to_value("address_destination").unwrap_or(None),
        )?,
        name_contact: row.to_value("name_contact").unwrap_or(None),
        telephone_contact: row.to_value("telephone_contact").unwrap_or(None),
        id_contact: row.to_value("id_contact").unwrap_or(None),
        time_created: row.to_value("time_created").unwrap_or_default(),
        time_updated: row.to_value("time_updated").unwrap_or(None),
    })
}
