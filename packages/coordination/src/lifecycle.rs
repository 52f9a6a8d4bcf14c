//! Emergency lifecycle: creation, partial update, deletion.
//!
//! Statuses nominally progress `Active → Pending → Solved → Archived`,
//! but any status may be written directly through a patch — updates are
//! unconstrained writes, not a guarded state machine. Reaching `Solved`
//! triggers QoS teardown for every linked resource, strictly after the
//! update transaction commits.

use dispatch_database::{DbError, addresses, emergencies, links, locations};
use dispatch_emergency_models::{Emergency, EmergencyStatus, EmergencyType, Priority};
use dispatch_gateway::QosControl;
use serde::{Deserialize, Serialize};
use switchy_database::Database;
use uuid::Uuid;

use crate::{CoordinationError, validate_latitude, validate_longitude};

/// Input for creating an emergency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmergency {
    /// Short incident name.
    pub name: String,
    /// Incident description.
    pub description: String,
    /// Incident site latitude.
    pub latitude: f64,
    /// Incident site longitude.
    pub longitude: f64,
    /// Kind of incident.
    pub emergency_type: EmergencyType,
    /// Dispatch priority.
    pub priority: Priority,
    /// Initial lifecycle status.
    pub status: EmergencyStatus,
    /// Reporting contact name.
    pub name_contact: Option<String>,
    /// Reporting contact phone.
    pub telephone_contact: Option<String>,
    /// Reporting contact document id.
    pub id_contact: Option<String>,
}

/// A sparse patch for an emergency.
///
/// Only the enumerated fields here are patchable — the merge is explicit
/// field-by-field, never attribute injection. A `None` field is left
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyPatch {
    /// New incident name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New incident kind.
    pub emergency_type: Option<EmergencyType>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New lifecycle status.
    pub status: Option<EmergencyStatus>,
    /// New incident site location record.
    pub location_emergency: Option<Uuid>,
    /// New incident site address record.
    pub address_emergency: Option<Uuid>,
    /// New primary responder pointer.
    pub resource_id: Option<Uuid>,
    /// New primary responder location snapshot.
    pub location_resource: Option<Uuid>,
    /// New primary responder address snapshot.
    pub address_resource: Option<Uuid>,
    /// New destination resource pointer.
    pub destination_id: Option<Uuid>,
    /// New destination location snapshot.
    pub location_destination: Option<Uuid>,
    /// New destination address snapshot.
    pub address_destination: Option<Uuid>,
    /// New reporting contact name.
    pub name_contact: Option<String>,
    /// New reporting contact phone.
    pub telephone_contact: Option<String>,
    /// New reporting contact document id.
    pub id_contact: Option<String>,
}

impl EmergencyPatch {
    /// Merges the set fields of this patch onto `emergency`.
    pub fn apply_to(&self, emergency: &mut Emergency) {
        if let Some(name) = &self.name {
            emergency.name = name.clone();
        }
        if let Some(description) = &self.description {
            emergency.description = description.clone();
        }
        if let Some(emergency_type) = self.emergency_type {
            emergency.emergency_type = emergency_type;
        }
        if let Some(priority) = self.priority {
            emergency.priority = priority;
        }
        if let Some(status) = self.status {
            emergency.status = status;
        }
        if let Some(id) = self.location_emergency {
            emergency.location_emergency = Some(id);
        }
        if let Some(id) = self.address_emergency {
            emergency.address_emergency = Some(id);
        }
        if let Some(id) = self.resource_id {
            emergency.resource_id = Some(id);
        }
        if let Some(id) = self.location_resource {
            emergency.location_resource = Some(id);
        }
        if let Some(id) = self.address_resource {
            emergency.address_resource = Some(id);
        }
        if let Some(id) = self.destination_id {
            emergency.destination_id = Some(id);
        }
        if let Some(id) = self.location_destination {
            emergency.location_destination = Some(id);
        }
        if let Some(id) = self.address_destination {
            emergency.address_destination = Some(id);
        }
        if let Some(name_contact) = &self.name_contact {
            emergency.name_contact = Some(name_contact.clone());
        }
        if let Some(telephone_contact) = &self.telephone_contact {
            emergency.telephone_contact = Some(telephone_contact.clone());
        }
        if let Some(id_contact) = &self.id_contact {
            emergency.id_contact = Some(id_contact.clone());
        }
    }
}

/// Creates an emergency together with its owned location and address
/// records, in one transaction. Returns the new emergency id.
///
/// # Errors
///
/// Returns [`CoordinationError::Validation`] if the coordinates are out
/// of range, or [`CoordinationError::Storage`] if the transaction fails.
pub async fn create_emergency(
    db: &dyn Database,
    input: &NewEmergency,
) -> Result<Uuid, CoordinationError> {
    validate_latitude(input.latitude)?;
    validate_longitude(input.longitude)?;

    let txn = db.begin_transaction().await.map_err(DbError::from)?;

    match apply_create(txn.as_ref(), input).await {
        Ok(id) => {
            txn.commit().await.map_err(DbError::from)?;
            Ok(id)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                log::error!("Failed to roll back emergency creation: {rollback_err}");
            }
            Err(e)
        }
    }
}

/// The in-transaction body of [`create_emergency`].
async fn apply_create(db: &dyn Database, input: &NewEmergency) -> Result<Uuid, CoordinationError> {
    let location_id = locations::insert(db, Some(input.latitude), Some(input.longitude)).await?;
    let address_id = addresses::insert(db, Some(input.latitude), Some(input.longitude)).await?;

    let emergency = Emergency {
        id: Uuid::new_v4(),
        name: input.name.clone(),
        description: input.description.clone(),
        emergency_type: input.emergency_type,
        priority: input.priority,
        status: input.status,
        location_emergency: Some(location_id),
        address_emergency: Some(address_id),
        resource_id: None,
        location_resource: None,
        address_resource: None,
        destination_id: None,
        location_destination: None,
        address_destination: None,
        name_contact: input.name_contact.clone(),
        telephone_contact: input.telephone_contact.clone(),
        id_contact: input.id_contact.clone(),
        time_created: dispatch_database::now_rfc3339(),
        time_updated: None,
    };

    emergencies::insert(db, &emergency).await?;

    Ok(emergency.id)
}

/// Applies a sparse patch to an emergency.
///
/// When the resulting status is [`EmergencyStatus::Solved`], the QoS
/// session of every linked resource is torn down after the transaction
/// commits. Teardown is best-effort: failures are logged and never fail
/// the update. Returns the emergency id; callers re-fetch for full
/// state.
///
/// # Errors
///
/// Returns [`CoordinationError::EmergencyNotFound`] if the emergency
/// does not exist, or [`CoordinationError::Storage`] if the transaction
/// fails.
pub async fn update_emergency(
    db: &dyn Database,
    qos: &dyn QosControl,
    emergency_id: Uuid,
    patch: &EmergencyPatch,
) -> Result<Uuid, CoordinationError> {
    let txn = db.begin_transaction().await.map_err(DbError::from)?;

    let solved_resources = match apply_update(txn.as_ref(), emergency_id, patch).await {
        Ok(solved_resources) => {
            txn.commit().await.map_err(DbError::from)?;
            solved_resources
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                log::error!(
                    "Failed to roll back update of emergency {emergency_id}: {rollback_err}"
                );
            }
            return Err(e);
        }
    };

    // Post-commit, best-effort: tear down QoS for every resource that
    // was working the now-solved emergency.
    for resource_id in solved_resources {
        match qos.deactivate_for_resource(resource_id).await {
            Ok(true) => {
                log::info!(
                    "Deactivated QoS for resource {resource_id} on solved emergency {emergency_id}"
                );
            }
            Ok(false) => {}
            Err(e) => {
                log::warn!(
                    "Failed to deactivate QoS for resource {resource_id} on solved emergency {emergency_id}: {e}"
                );
            }
        }
    }

    Ok(emergency_id)
}

/// The in-transaction body of [`update_emergency`]. Returns the linked
/// resource ids when the update left the emergency `Solved`, so the
/// caller can tear down QoS after commit.
async fn apply_update(
    db: &dyn Database,
    emergency_id: Uuid,
    patch: &EmergencyPatch,
) -> Result<Vec<Uuid>, CoordinationError> {
    let Some(mut emergency) = emergencies::get(db, emergency_id).await? else {
        return Err(CoordinationError::EmergencyNotFound(emergency_id));
    };

    patch.apply_to(&mut emergency);
    emergencies::update(db, &emergency).await?;

    if emergency.status == EmergencyStatus::Solved {
        Ok(links::resource_ids_for_emergency(db, emergency_id).await?)
    } else {
        Ok(Vec::new())
    }
}

/// Deletes an emergency and its assignment link rows in one
/// transaction.
///
/// The owned location/address records are left in place (consistent with
/// resource deletion, which nulls references rather than cascading into
/// coordinate records).
///
/// # Errors
///
/// Returns [`CoordinationError::EmergencyNotFound`] if the emergency
/// does not exist, or [`CoordinationError::Storage`] if the transaction
/// fails.
pub async fn delete_emergency(
    db: &dyn Database,
    emergency_id: Uuid,
) -> Result<(), CoordinationError> {
    let txn = db.begin_transaction().await.map_err(DbError::from)?;

    match apply_delete(txn.as_ref(), emergency_id).await {
        Ok(()) => {
            txn.commit().await.map_err(DbError::from)?;
            Ok(())
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                log::error!(
                    "Failed to roll back deletion of emergency {emergency_id}: {rollback_err}"
                );
            }
            Err(e)
        }
    }
}

/// The in-transaction body of [`delete_emergency`].
async fn apply_delete(db: &dyn Database, emergency_id: Uuid) -> Result<(), CoordinationError> {
    if emergencies::get(db, emergency_id).await?.is_none() {
        return Err(CoordinationError::EmergencyNotFound(emergency_id));
    }

    links::delete_for_emergency(db, emergency_id).await?;
    emergencies::delete(db, emergency_id).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use dispatch_database::resources;
    use dispatch_emergency_models::{Resource, ResourceStatus, ResourceType};
    use dispatch_gateway::GatewayError;

    use super::*;
    use crate::assignment::assign_resources;

    /// Records which resources had QoS torn down.
    #[derive(Default)]
    struct RecordingQos {
        deactivated: Mutex<Vec<Uuid>>,
        fail: bool,
    }

    #[async_trait]
    impl QosControl for RecordingQos {
        async fn deactivate_for_resource(&self, resource_id: Uuid) -> Result<bool, GatewayError> {
            if self.fail {
                return Err(GatewayError::Parse {
                    message: "gateway down".to_string(),
                });
            }
            self.deactivated.lock().unwrap().push(resource_id);
            Ok(true)
        }
    }

    async fn test_db() -> Box<dyn Database> {
        let db = dispatch_database::db::open_sqlite(None).expect("Failed to open SQLite");
        dispatch_database::schema::ensure_schema(db.as_ref())
            .await
            .expect("Failed to ensure schema");
        db
    }

    fn new_emergency() -> NewEmergency {
        NewEmergency {
            name: "Highway pileup".to_string(),
            description: "Multiple vehicles involved".to_string(),
            latitude: 41.39,
            longitude: 2.15,
            emergency_type: EmergencyType::Accident,
            priority: Priority::High,
            status: EmergencyStatus::Active,
            name_contact: Some("Witness".to_string()),
            telephone_contact: Some("+34600000003".to_string()),
            id_contact: None,
        }
    }

    async fn insert_resource(db: &dyn Database) -> Uuid {
        let resource = Resource {
            id: Uuid::new_v4(),
            name: "Unit".to_string(),
            resource_type: ResourceType::Ambulance,
            status: ResourceStatus::Available,
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

    #[tokio::test]
    async fn create_then_get_roundtrips_fields() {
        let db = test_db().await;
        let db = db.as_ref();

        let input = new_emergency();
        let id = create_emergency(db, &input).await.unwrap();

        let emergency = emergencies::get(db, id).await.unwrap().unwrap();
        assert_eq!(emergency.name, input.name);
        assert_eq!(emergency.description, input.description);
        assert_eq!(emergency.emergency_type, input.emergency_type);
        assert_eq!(emergency.priority, input.priority);
        assert_eq!(emergency.status, input.status);
        assert_eq!(emergency.name_contact, input.name_contact);
        assert_eq!(emergency.telephone_contact, input.telephone_contact);

        // Owned records exist and carry the incident coordinates
        let location = dispatch_database::locations::get(db, emergency.location_emergency.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(location.latitude, Some(input.latitude));
        assert_eq!(location.longitude, Some(input.longitude));
        assert!(
            dispatch_database::addresses::get(db, emergency.address_emergency.unwrap())
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn create_accepts_boundary_coordinates() {
        let db = test_db().await;
        let db = db.as_ref();

        let mut input = new_emergency();
        input.latitude = 90.0;
        input.longitude = 180.0;
        assert!(create_emergency(db, &input).await.is_ok());

        input.latitude = -90.0;
        input.longitude = -180.0;
        assert!(create_emergency(db, &input).await.is_ok());
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_coordinates() {
        let db = test_db().await;
        let db = db.as_ref();

        let mut input = new_emergency();
        input.latitude = 90.0001;
        let err = create_emergency(db, &input).await.unwrap_err();
        assert!(matches!(err, CoordinationError::Validation { .. }));

        let mut input = new_emergency();
        input.longitude = -180.0001;
        let err = create_emergency(db, &input).await.unwrap_err();
        assert!(matches!(err, CoordinationError::Validation { .. }));
    }

    #[tokio::test]
    async fn patch_updates_only_set_fields() {
        let db = test_db().await;
        let db = db.as_ref();
        let qos = RecordingQos::default();

        let id = create_emergency(db, &new_emergency()).await.unwrap();

        let patch = EmergencyPatch {
            priority: Some(Priority::Low),
            status: Some(EmergencyStatus::Pending),
            ..EmergencyPatch::default()
        };
        update_emergency(db, &qos, id, &patch).await.unwrap();

        let emergency = emergencies::get(db, id).await.unwrap().unwrap();
        assert_eq!(emergency.priority, Priority::Low);
        assert_eq!(emergency.status, EmergencyStatus::Pending);
        // Untouched fields survive
        assert_eq!(emergency.name, "Highway pileup");
        assert_eq!(emergency.emergency_type, EmergencyType::Accident);
        assert!(emergency.time_updated.is_some());
        assert!(qos.deactivated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn solving_tears_down_qos_for_linked_resources() {
        let db = test_db().await;
        let db = db.as_ref();
        let qos = RecordingQos::default();

        let id = create_emergency(db, &new_emergency()).await.unwrap();
        let a = insert_resource(db).await;
        let b = insert_resource(db).await;
        assign_resources(db, id, &[a, b]).await.unwrap();

        let patch = EmergencyPatch {
            status: Some(EmergencyStatus::Solved),
            ..EmergencyPatch::default()
        };
        update_emergency(db, &qos, id, &patch).await.unwrap();

        let mut deactivated = qos.deactivated.lock().unwrap().clone();
        deactivated.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(deactivated, expected);
    }

    #[tokio::test]
    async fn qos_failure_does_not_fail_the_update() {
        let db = test_db().await;
        let db = db.as_ref();
        let qos = RecordingQos {
            fail: true,
            ..RecordingQos::default()
        };

        let id = create_emergency(db, &new_emergency()).await.unwrap();
        let a = insert_resource(db).await;
        assign_resources(db, id, &[a]).await.unwrap();

        let patch = EmergencyPatch {
            status: Some(EmergencyStatus::Solved),
            ..EmergencyPatch::default()
        };
        // Update succeeds and the status is persisted
        update_emergency(db, &qos, id, &patch).await.unwrap();
        let emergency = emergencies::get(db, id).await.unwrap().unwrap();
        assert_eq!(emergency.status, EmergencyStatus::Solved);
    }

    #[tokio::test]
    async fn update_missing_emergency_is_not_found() {
        let db = test_db().await;
        let db = db.as_ref();
        let qos = RecordingQos::default();

        let ghost = Uuid::new_v4();
        let err = update_emergency(db, &qos, ghost, &EmergencyPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoordinationError::EmergencyNotFound(id) if id == ghost
        ));
    }

    #[tokio::test]
    async fn delete_emergency_removes_its_links() {
        let db = test_db().await;
        let db = db.as_ref();

        let id = create_emergency(db, &new_emergency()).await.unwrap();
        let a = insert_resource(db).await;
        assign_resources(db, id, &[a]).await.unwrap();

        delete_emergency(db, id).await.unwrap();

        assert!(emergencies::get(db, id).await.unwrap().is_none());
        assert!(
            links::resource_ids_for_emergency(db, id)
                .await
                .unwrap()
                .is_empty()
        );
        // The resource survives deletion of the emergency
        assert!(resources::get(db, a).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_missing_emergency_is_not_found() {
        let db = test_db().await;
        let db = db.as_ref();

        let err = delete_emergency(db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CoordinationError::EmergencyNotFound(_)));
    }
}
