//! Transactional assignment of resources to emergencies.
//!
//! The assignment table is replaced wholesale on every call: the input
//! resource set becomes exactly the linked set, previously-linked
//! resources not retained are released to `Available`, and every
//! resource in the new set is marked `Busy`. The whole operation runs in
//! one transaction — a missing id or storage failure rolls everything
//! back.

use std::collections::BTreeSet;

use dispatch_database::{DbError, emergencies, links, resources};
use dispatch_emergency_models::ResourceStatus;
use switchy_database::Database;
use uuid::Uuid;

use crate::CoordinationError;

/// Replaces the set of resources assigned to an emergency.
///
/// Duplicate ids in the input collapse to one; first-seen order is
/// preserved in the returned set. An empty input is the valid
/// "unassign all" operation, not an error.
///
/// # Errors
///
/// Returns [`CoordinationError::EmergencyNotFound`] if the emergency
/// does not exist, [`CoordinationError::ResourceNotFound`] naming the
/// first missing resource id, or [`CoordinationError::Storage`] if the
/// transaction fails. In every error case no status or link change is
/// persisted.
pub async fn assign_resources(
    db: &dyn Database,
    emergency_id: Uuid,
    resource_ids: &[Uuid],
) -> Result<Vec<Uuid>, CoordinationError> {
    let requested = dedupe(resource_ids);

    let txn = db.begin_transaction().await.map_err(DbError::from)?;

    match apply(txn.as_ref(), emergency_id, &requested).await {
        Ok(()) => {
            txn.commit().await.map_err(DbError::from)?;
            Ok(requested)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                log::error!(
                    "Failed to roll back assignment for emergency {emergency_id}: {rollback_err}"
                );
            }
            Err(e)
        }
    }
}

/// The in-transaction body of [`assign_resources`].
async fn apply(
    db: &dyn Database,
    emergency_id: Uuid,
    requested: &[Uuid],
) -> Result<(), CoordinationError> {
    if emergencies::get(db, emergency_id).await?.is_none() {
        return Err(CoordinationError::EmergencyNotFound(emergency_id));
    }

    // Verify the whole input before mutating anything so the error
    // names the offending id with no work to unwind.
    for &id in requested {
        if resources::get(db, id).await?.is_none() {
            return Err(CoordinationError::ResourceNotFound(id));
        }
    }

    let current = links::resource_ids_for_emergency(db, emergency_id).await?;
    let retained: BTreeSet<Uuid> = requested.iter().copied().collect();

    // Release resources dropped from the set. Retained ones are skipped
    // so they never pass through `Available`.
    for &id in &current {
        if !retained.contains(&id) {
            resources::update_status(db, id, ResourceStatus::Available).await?;
        }
    }

    for &id in requested {
        resources::update_status(db, id, ResourceStatus::Busy).await?;
    }

    links::delete_for_emergency(db, emergency_id).await?;
    for &id in requested {
        links::insert(db, emergency_id, id).await?;
    }

    Ok(())
}

/// Deletes a resource together with everything that references it.
///
/// Within one transaction, in order: every assignment link row for the
/// resource, every emergency `resource_id` pointer, every emergency
/// `destination_id` pointer, then the resource row itself.
///
/// # Errors
///
/// Returns [`CoordinationError::ResourceNotFound`] if the resource does
/// not exist, or [`CoordinationError::Storage`] if the transaction
/// fails (nothing is deleted in that case).
pub async fn delete_resource(
    db: &dyn Database,
    resource_id: Uuid,
) -> Result<(), CoordinationError> {
    let txn = db.begin_transaction().await.map_err(DbError::from)?;

    match apply_delete(txn.as_ref(), resource_id).await {
        Ok(()) => {
            txn.commit().await.map_err(DbError::from)?;
            Ok(())
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                log::error!(
                    "Failed to roll back deletion of resource {resource_id}: {rollback_err}"
                );
            }
            Err(e)
        }
    }
}

/// The in-transaction body of [`delete_resource`].
async fn apply_delete(db: &dyn Database, resource_id: Uuid) -> Result<(), CoordinationError> {
    if resources::get(db, resource_id).await?.is_none() {
        return Err(CoordinationError::ResourceNotFound(resource_id));
    }

    links::delete_for_resource(db, resource_id).await?;
    emergencies::clear_resource_pointer(db, resource_id).await?;
    emergencies::clear_destination_pointer(db, resource_id).await?;
    resources::delete(db, resource_id).await?;

    Ok(())
}

/// Collapses duplicates while preserving first-seen order.
fn dedupe(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = BTreeSet::new();
    ids.iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use dispatch_emergency_models::{
        Emergency, EmergencyStatus, EmergencyType, Priority, Resource, ResourceStatus,
        ResourceType,
    };
    use switchy_database::Database;

    use super::*;

    async fn test_db() -> Box<dyn Database> {
        let db = dispatch_database::db::open_sqlite(None).expect("Failed to open SQLite");
        dispatch_database::schema::ensure_schema(db.as_ref())
            .await
            .expect("Failed to ensure schema");
        db
    }

    async fn insert_emergency(db: &dyn Database) -> Uuid {
        let emergency = Emergency {
            id: Uuid::new_v4(),
            name: "Apartment fire".to_string(),
            description: "Third floor, smoke visible".to_string(),
            emergency_type: EmergencyType::Fire,
            priority: Priority::Critical,
            status: EmergencyStatus::Active,
            location_emergency: None,
            address_emergency: None,
            resource_id: None,
            location_resource: None,
            address_resource: None,
            destination_id: None,
            location_destination: None,
            address_destination: None,
            name_contact: None,
            telephone_contact: None,
            id_contact: None,
            time_created: dispatch_database::now_rfc3339(),
            time_updated: None,
        };
        emergencies::insert(db, &emergency).await.unwrap();
        emergency.id
    }

    async fn insert_resource(db: &dyn Database, status: ResourceStatus) -> Uuid {
        let resource = Resource {
            id: Uuid::new_v4(),
            name: "Unit".to_string(),
            resource_type: ResourceType::Firetruck,
            status,
            actual_location: None,
            actual_address: None,
            normal_location: None,
            normal_address: None,
            responsible: None,
            telephone: None,
            email: None,
            time_created: dispatch_database::now_rfc3339(),
            time_updated: None,
        };
        resources::insert(db, &resource).await.unwrap();
        resource.id
    }

    async fn status_of(db: &dyn Database, id: Uuid) -> ResourceStatus {
        resources::get(db, id).await.unwrap().unwrap().status
    }

    async fn linked(db: &dyn Database, emergency_id: Uuid) -> Vec<Uuid> {
        links::resource_ids_for_emergency(db, emergency_id)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn assignment_replaces_link_set_and_busies_resources() {
        let db = test_db().await;
        let db = db.as_ref();

        let emergency = insert_emergency(db).await;
        let a = insert_resource(db, ResourceStatus::Available).await;
        let b = insert_resource(db, ResourceStatus::Available).await;

        let assigned = assign_resources(db, emergency, &[a, b]).await.unwrap();
        assert_eq!(assigned, vec![a, b]);

        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(linked(db, emergency).await, expected);
        assert_eq!(status_of(db, a).await, ResourceStatus::Busy);
        assert_eq!(status_of(db, b).await, ResourceStatus::Busy);

        // Narrowing to just A releases B and keeps A busy
        assign_resources(db, emergency, &[a]).await.unwrap();
        assert_eq!(linked(db, emergency).await, vec![a]);
        assert_eq!(status_of(db, a).await, ResourceStatus::Busy);
        assert_eq!(status_of(db, b).await, ResourceStatus::Available);
    }

    #[tokio::test]
    async fn assignment_is_idempotent() {
        let db = test_db().await;
        let db = db.as_ref();

        let emergency = insert_emergency(db).await;
        let a = insert_resource(db, ResourceStatus::Available).await;
        let b = insert_resource(db, ResourceStatus::Available).await;

        assign_resources(db, emergency, &[a, b]).await.unwrap();
        let links_first = linked(db, emergency).await;

        assign_resources(db, emergency, &[a, b]).await.unwrap();
        assert_eq!(linked(db, emergency).await, links_first);
        assert_eq!(status_of(db, a).await, ResourceStatus::Busy);
        assert_eq!(status_of(db, b).await, ResourceStatus::Busy);
    }

    #[tokio::test]
    async fn duplicate_input_ids_collapse_to_a_set() {
        let db = test_db().await;
        let db = db.as_ref();

        let emergency = insert_emergency(db).await;
        let a = insert_resource(db, ResourceStatus::Available).await;

        let assigned = assign_resources(db, emergency, &[a, a, a]).await.unwrap();
        assert_eq!(assigned, vec![a]);
        assert_eq!(linked(db, emergency).await, vec![a]);
    }

    #[tokio::test]
    async fn empty_input_unassigns_everything() {
        let db = test_db().await;
        let db = db.as_ref();

        let emergency = insert_emergency(db).await;
        let a = insert_resource(db, ResourceStatus::Available).await;
        let b = insert_resource(db, ResourceStatus::Available).await;
        assign_resources(db, emergency, &[a, b]).await.unwrap();

        let assigned = assign_resources(db, emergency, &[]).await.unwrap();
        assert!(assigned.is_empty());
        assert!(linked(db, emergency).await.is_empty());
        assert_eq!(status_of(db, a).await, ResourceStatus::Available);
        assert_eq!(status_of(db, b).await, ResourceStatus::Available);
    }

    #[tokio::test]
    async fn missing_resource_rolls_back_completely() {
        let db = test_db().await;
        let db = db.as_ref();

        let emergency = insert_emergency(db).await;
        let a = insert_resource(db, ResourceStatus::Available).await;
        assign_resources(db, emergency, &[a]).await.unwrap();

        let ghost = Uuid::new_v4();
        let err = assign_resources(db, emergency, &[ghost])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoordinationError::ResourceNotFound(id) if id == ghost
        ));

        // Prior links and statuses are untouched
        assert_eq!(linked(db, emergency).await, vec![a]);
        assert_eq!(status_of(db, a).await, ResourceStatus::Busy);
    }

    #[tokio::test]
    async fn missing_emergency_is_not_found() {
        let db = test_db().await;
        let db = db.as_ref();

        let a = insert_resource(db, ResourceStatus::Available).await;
        let ghost = Uuid::new_v4();

        let err = assign_resources(db, ghost, &[a]).await.unwrap_err();
        assert!(matches!(
            err,
            CoordinationError::EmergencyNotFound(id) if id == ghost
        ));
        assert_eq!(status_of(db, a).await, ResourceStatus::Available);
    }

    #[tokio::test]
    async fn delete_resource_cascades_links_and_pointers() {
        let db = test_db().await;
        let db = db.as_ref();

        let e1 = insert_emergency(db).await;
        let e2 = insert_emergency(db).await;
        let r = insert_resource(db, ResourceStatus::Available).await;

        assign_resources(db, e1, &[r]).await.unwrap();
        assign_resources(db, e2, &[r]).await.unwrap();

        // Point the legacy pointers at the doomed resource too
        let mut em1 = emergencies::get(db, e1).await.unwrap().unwrap();
        em1.resource_id = Some(r);
        emergencies::update(db, &em1).await.unwrap();
        let mut em2 = emergencies::get(db, e2).await.unwrap().unwrap();
        em2.destination_id = Some(r);
        emergencies::update(db, &em2).await.unwrap();

        delete_resource(db, r).await.unwrap();

        assert!(resources::get(db, r).await.unwrap().is_none());
        assert!(linked(db, e1).await.is_empty());
        assert!(linked(db, e2).await.is_empty());
        assert!(
            emergencies::get(db, e1)
                .await
                .unwrap()
                .unwrap()
                .resource_id
                .is_none()
        );
        assert!(
            emergencies::get(db, e2)
                .await
                .unwrap()
                .unwrap()
                .destination_id
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_missing_resource_is_not_found() {
        let db = test_db().await;
        let db = db.as_ref();

        let ghost = Uuid::new_v4();
        let err = delete_resource(db, ghost).await.unwrap_err();
        assert!(matches!(
            err,
            CoordinationError::ResourceNotFound(id) if id == ghost
        ));
    }
}
