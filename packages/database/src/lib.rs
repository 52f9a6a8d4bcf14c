#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database connection, schema, and queries for the dispatch backend.
//!
//! Uses `switchy_database` for all database access: Postgres in
//! production (`connect_from_env`), `SQLite` for local runs and tests
//! (`open_sqlite`). Every query function takes `&dyn Database` so it
//! works both on a connection and inside a transaction obtained from
//! `begin_transaction()`.
//!
//! Identifiers are UUIDs generated client-side and stored as TEXT;
//! timestamps are RFC 3339 TEXT columns (`time_created`, `time_updated`).

pub mod addresses;
pub mod db;
pub mod emergencies;
pub mod links;
pub mod locations;
pub mod resources;
pub mod schema;

use uuid::Uuid;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Returns the current UTC time as an RFC 3339 string, the format used
/// for every `time_created`/`time_updated` column.
#[must_use]
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Parses a TEXT id column back into a [`Uuid`].
pub(crate) fn parse_uuid(column: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Conversion {
        message: format!("Failed to parse {column} as UUID: {e}"),
    })
}

/// Parses an optional TEXT id column back into an `Option<Uuid>`.
pub(crate) fn parse_opt_uuid(column: &str, value: Option<String>) -> Result<Option<Uuid>, DbError> {
    value.map(|v| parse_uuid(column, &v)).transpose()
}

#[cfg(test)]
mod tests {
    use dispatch_emergency_models::{
        Emergency, EmergencyStatus, EmergencyType, Priority, Resource, ResourceStatus,
        ResourceType,
    };
    use switchy_database::Database;
    use uuid::Uuid;

    use super::*;

    async fn test_db() -> Box<dyn Database> {
        let db = crate::db::open_sqlite(None).expect("Failed to open in-memory SQLite");
        crate::schema::ensure_schema(db.as_ref())
            .await
            .expect("Failed to ensure schema");
        db
    }

    fn sample_resource() -> Resource {
        Resource {
            id: Uuid::new_v4(),
            name: "Ambulance 12".to_string(),
            resource_type: ResourceType::Ambulance,
            status: ResourceStatus::Available,
            actual_location: None,
            actual_address: None,
            normal_location: None,
            normal_address: None,
            responsible: Some("A. Medic".to_string()),
            telephone: Some("+34600000001".to_string()),
            email: Some("medic@example.org".to_string()),
            time_created: now_rfc3339(),
            time_updated: None,
        }
    }

    fn sample_emergency() -> Emergency {
        Emergency {
            id: Uuid::new_v4(),
            name: "Warehouse fire".to_string(),
            description: "Smoke reported on the second floor".to_string(),
            emergency_type: EmergencyType::Fire,
            priority: Priority::High,
            status: EmergencyStatus::Active,
            location_emergency: None,
            address_emergency: None,
            resource_id: None,
            location_resource: None,
            address_resource: None,
            destination_id: None,
            location_destination: None,
            address_destination: None,
            name_contact: Some("J. Caller".to_string()),
            telephone_contact: Some("+34600000002".to_string()),
            id_contact: None,
            time_created: now_rfc3339(),
            time_updated: None,
        }
    }

    #[tokio::test]
    async fn location_insert_get_roundtrip() {
        let db = test_db().await;

        let id = locations::insert(db.as_ref(), Some(41.38), Some(2.17))
            .await
            .unwrap();

        let location = locations::get(db.as_ref(), id).await.unwrap().unwrap();
        assert_eq!(location.id, id);
        assert_eq!(location.latitude, Some(41.38));
        assert_eq!(location.longitude, Some(2.17));
        assert!(location.time_updated.is_none());
    }

    #[tokio::test]
    async fn location_update_coordinates_bumps_time_updated() {
        let db = test_db().await;

        let id = locations::insert(db.as_ref(), Some(0.0), Some(0.0))
            .await
            .unwrap();
        locations::update_coordinates(db.as_ref(), id, Some(1.0), Some(2.0))
            .await
            .unwrap();

        let location = locations::get(db.as_ref(), id).await.unwrap().unwrap();
        assert_eq!(location.latitude, Some(1.0));
        assert_eq!(location.longitude, Some(2.0));
        assert!(location.time_updated.is_some());
    }

    #[tokio::test]
    async fn resource_insert_get_roundtrip() {
        let db = test_db().await;

        let resource = sample_resource();
        resources::insert(db.as_ref(), &resource).await.unwrap();

        let fetched = resources::get(db.as_ref(), resource.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, resource);
    }

    #[tokio::test]
    async fn emergency_insert_get_roundtrip() {
        let db = test_db().await;

        let emergency = sample_emergency();
        emergencies::insert(db.as_ref(), &emergency).await.unwrap();

        let fetched = emergencies::get(db.as_ref(), emergency.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, emergency);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let db = test_db().await;

        assert!(
            emergencies::get(db.as_ref(), Uuid::new_v4())
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            resources::get(db.as_ref(), Uuid::new_v4())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn link_rows_follow_inserts_and_deletes() {
        let db = test_db().await;

        let emergency = sample_emergency();
        emergencies::insert(db.as_ref(), &emergency).await.unwrap();
        let a = sample_resource();
        let b = sample_resource();
        resources::insert(db.as_ref(), &a).await.unwrap();
        resources::insert(db.as_ref(), &b).await.unwrap();

        links::insert(db.as_ref(), emergency.id, a.id).await.unwrap();
        links::insert(db.as_ref(), emergency.id, b.id).await.unwrap();

        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(
            links::resource_ids_for_emergency(db.as_ref(), emergency.id)
                .await
                .unwrap(),
            expected
        );

        assert_eq!(
            links::delete_for_resource(db.as_ref(), a.id).await.unwrap(),
            1
        );
        assert_eq!(
            links::delete_for_emergency(db.as_ref(), emergency.id)
                .await
                .unwrap(),
            1
        );
        assert!(
            links::resource_ids_for_emergency(db.as_ref(), emergency.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn emergency_list_joins_location() {
        let db = test_db().await;

        let location_id = locations::insert(db.as_ref(), Some(40.4), Some(-3.7))
            .await
            .unwrap();
        let mut emergency = sample_emergency();
        emergency.location_emergency = Some(location_id);
        emergencies::insert(db.as_ref(), &emergency).await.unwrap();

        let listed = emergencies::list_with_location(db.as_ref()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].emergency.id, emergency.id);
        let joined = listed[0].location.as_ref().unwrap();
        assert_eq!(joined.id, location_id);
        assert_eq!(joined.latitude, Some(40.4));
    }
}
