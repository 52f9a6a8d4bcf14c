//! Resource roster: creation and partial update of responder units.
//!
//! Each resource owns four coordinate records — current and home-base,
//! location and address. Creation builds all four plus the resource row
//! in one transaction; updates merge the enumerated scalar fields and
//! write coordinate changes through to the owned records, also in one
//! transaction.

use dispatch_database::{DbError, addresses, locations, resources};
use dispatch_emergency_models::{Resource, ResourceStatus, ResourceType};
use serde::{Deserialize, Serialize};
use switchy_database::Database;
use uuid::Uuid;

use crate::{CoordinationError, validate_opt_latitude, validate_opt_longitude};

/// Input for creating a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResource {
    /// Unit call name.
    pub name: String,
    /// Kind of unit.
    #[serde(default)]
    pub resource_type: ResourceType,
    /// Initial availability status.
    #[serde(default)]
    pub status: ResourceStatus,
    /// Current position latitude.
    pub actual_latitude: Option<f64>,
    /// Current position longitude.
    pub actual_longitude: Option<f64>,
    /// Current postal-address latitude.
    pub actual_address_latitude: Option<f64>,
    /// Current postal-address longitude.
    pub actual_address_longitude: Option<f64>,
    /// Home-base position latitude.
    pub normal_latitude: Option<f64>,
    /// Home-base position longitude.
    pub normal_longitude: Option<f64>,
    /// Home-base postal-address latitude.
    pub normal_address_latitude: Option<f64>,
    /// Home-base postal-address longitude.
    pub normal_address_longitude: Option<f64>,
    /// Responsible contact name.
    pub responsible: Option<String>,
    /// Responsible contact phone.
    pub telephone: Option<String>,
    /// Responsible contact email.
    pub email: Option<String>,
}

/// A sparse patch for a resource.
///
/// Scalar fields merge onto the resource row; coordinate fields write
/// through to the owned location/address records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePatch {
    /// New unit call name.
    pub name: Option<String>,
    /// New unit kind.
    pub resource_type: Option<ResourceType>,
    /// New availability status.
    pub status: Option<ResourceStatus>,
    /// New current position latitude.
    pub actual_latitude: Option<f64>,
    /// New current position longitude.
    pub actual_longitude: Option<f64>,
    /// New current postal-address latitude.
    pub actual_address_latitude: Option<f64>,
    /// New current postal-address longitude.
    pub actual_address_longitude: Option<f64>,
    /// New home-base position latitude.
    pub normal_latitude: Option<f64>,
    /// New home-base position longitude.
    pub normal_longitude: Option<f64>,
    /// New home-base postal-address latitude.
    pub normal_address_latitude: Option<f64>,
    /// New home-base postal-address longitude.
    pub normal_address_longitude: Option<f64>,
    /// New responsible contact name.
    pub responsible: Option<String>,
    /// New responsible contact phone.
    pub telephone: Option<String>,
    /// New responsible contact email.
    pub email: Option<String>,
}

impl ResourcePatch {
    fn validate(&self) -> Result<(), CoordinationError> {
        validate_opt_latitude(self.actual_latitude)?;
        validate_opt_longitude(self.actual_longitude)?;
        validate_opt_latitude(self.actual_address_latitude)?;
        validate_opt_longitude(self.actual_address_longitude)?;
        validate_opt_latitude(self.normal_latitude)?;
        validate_opt_longitude(self.normal_longitude)?;
        validate_opt_latitude(self.normal_address_latitude)?;
        validate_opt_longitude(self.normal_address_longitude)?;
        Ok(())
    }
}

impl NewResource {
    fn validate(&self) -> Result<(), CoordinationError> {
        validate_opt_latitude(self.actual_latitude)?;
        validate_opt_longitude(self.actual_longitude)?;
        validate_opt_latitude(self.actual_address_latitude)?;
        validate_opt_longitude(self.actual_address_longitude)?;
        validate_opt_latitude(self.normal_latitude)?;
        validate_opt_longitude(self.normal_longitude)?;
        validate_opt_latitude(self.normal_address_latitude)?;
        validate_opt_longitude(self.normal_address_longitude)?;
        Ok(())
    }
}

/// Creates a resource together with its four owned coordinate records,
/// in one transaction. Returns the new resource id.
///
/// # Errors
///
/// Returns [`CoordinationError::Validation`] if any coordinate is out of
/// range, or [`CoordinationError::Storage`] if the transaction fails.
pub async fn create_resource(
    db: &dyn Database,
    input: &NewResource,
) -> Result<Uuid, CoordinationError> {
    input.validate()?;

    let txn = db.begin_transaction().await.map_err(DbError::from)?;

    match apply_create(txn.as_ref(), input).await {
        Ok(id) => {
            txn.commit().await.map_err(DbError::from)?;
            Ok(id)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                log::error!("Failed to roll back resource creation: {rollback_err}");
            }
            Err(e)
        }
    }
}

/// The in-transaction body of [`create_resource`].
async fn apply_create(db: &dyn Database, input: &NewResource) -> Result<Uuid, CoordinationError> {
    let actual_location =
        locations::insert(db, input.actual_latitude, input.actual_longitude).await?;
    let actual_address = addresses::insert(
        db,
        input.actual_address_latitude,
        input.actual_address_longitude,
    )
    .await?;
    let normal_location =
        locations::insert(db, input.normal_latitude, input.normal_longitude).await?;
    let normal_address = addresses::insert(
        db,
        input.normal_address_latitude,
        input.normal_address_longitude,
    )
    .await?;

    let resource = Resource {
        id: Uuid::new_v4(),
        name: input.name.clone(),
        resource_type: input.resource_type,
        status: input.status,
        actual_location: Some(actual_location),
        actual_address: Some(actual_address),
        normal_location: Some(normal_location),
        normal_address: Some(normal_address),
        responsible: input.responsible.clone(),
        telephone: input.telephone.clone(),
        email: input.email.clone(),
        time_created: dispatch_database::now_rfc3339(),
        time_updated: None,
    };

    resources::insert(db, &resource).await?;

    Ok(resource.id)
}

/// Applies a sparse patch to a resource, writing coordinate changes
/// through to the owned location/address records, all in one
/// transaction. Returns the resource id.
///
/// # Errors
///
/// Returns [`CoordinationError::ResourceNotFound`] if the resource does
/// not exist, [`CoordinationError::Validation`] for out-of-range
/// coordinates, or [`CoordinationError::Storage`] if the transaction
/// fails.
pub async fn update_resource(
    db: &dyn Database,
    resource_id: Uuid,
    patch: &ResourcePatch,
) -> Result<Uuid, CoordinationError> {
    patch.validate()?;

    let txn = db.begin_transaction().await.map_err(DbError::from)?;

    match apply_update(txn.as_ref(), resource_id, patch).await {
        Ok(()) => {
            txn.commit().await.map_err(DbError::from)?;
            Ok(resource_id)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                log::error!(
                    "Failed to roll back update of resource {resource_id}: {rollback_err}"
                );
            }
            Err(e)
        }
    }
}

/// The in-transaction body of [`update_resource`].
async fn apply_update(
    db: &dyn Database,
    resource_id: Uuid,
    patch: &ResourcePatch,
) -> Result<(), CoordinationError> {
    let Some(mut resource) = resources::get(db, resource_id).await? else {
        return Err(CoordinationError::ResourceNotFound(resource_id));
    };

    if let Some(name) = &patch.name {
        resource.name = name.clone();
    }
    if let Some(resource_type) = patch.resource_type {
        resource.resource_type = resource_type;
    }
    if let Some(status) = patch.status {
        resource.status = status;
    }
    if let Some(responsible) = &patch.responsible {
        resource.responsible = Some(responsible.clone());
    }
    if let Some(telephone) = &patch.telephone {
        resource.telephone = Some(telephone.clone());
    }
    if let Some(email) = &patch.email {
        resource.email = Some(email.clone());
    }

    resources::update_fields(db, &resource).await?;

    write_location(
        db,
        resource.actual_location,
        patch.actual_latitude,
        patch.actual_longitude,
    )
    .await?;
    write_address(
        db,
        resource.actual_address,
        patch.actual_address_latitude,
        patch.actual_address_longitude,
    )
    .await?;
    write_location(
        db,
        resource.normal_location,
        patch.normal_latitude,
        patch.normal_longitude,
    )
    .await?;
    write_address(
        db,
        resource.normal_address,
        patch.normal_address_latitude,
        patch.normal_address_longitude,
    )
    .await?;

    Ok(())
}

/// Merges a coordinate patch onto an owned location record, if the
/// resource has one and the patch touches it.
async fn write_location(
    db: &dyn Database,
    location_id: Option<Uuid>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(), CoordinationError> {
    if latitude.is_none() && longitude.is_none() {
        return Ok(());
    }
    let Some(location_id) = location_id else {
        return Ok(());
    };

    let Some(current) = locations::get(db, location_id).await? else {
        return Ok(());
    };

    locations::update_coordinates(
        db,
        location_id,
        latitude.or(current.latitude),
        longitude.or(current.longitude),
    )
    .await?;

    Ok(())
}

/// Merges a coordinate patch onto an owned address record, if the
/// resource has one and the patch touches it.
async fn write_address(
    db: &dyn Database,
    address_id: Option<Uuid>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(), CoordinationError> {
    if latitude.is_none() && longitude.is_none() {
        return Ok(());
    }
    let Some(address_id) = address_id else {
        return Ok(());
    };

    let Some(current) = addresses::get(db, address_id).await? else {
        return Ok(());
    };

    addresses::update_coordinates(
        db,
        address_id,
        latitude.or(current.latitude),
        longitude.or(current.longitude),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Box<dyn Database> {
        let db = dispatch_database::db::open_sqlite(None).expect("Failed to open SQLite");
        dispatch_database::schema::ensure_schema(db.as_ref())
            .await
            .expect("Failed to ensure schema");
        db
    }

    fn new_resource() -> NewResource {
        NewResource {
            name: "Engine 7".to_string(),
            resource_type: ResourceType::Firetruck,
            status: ResourceStatus::Available,
            actual_latitude: Some(41.40),
            actual_longitude: Some(2.18),
            actual_address_latitude: Some(41.40),
            actual_address_longitude: Some(2.18),
            normal_latitude: Some(41.42),
            normal_longitude: Some(2.20),
            normal_address_latitude: Some(41.42),
            normal_address_longitude: Some(2.20),
            responsible: Some("Station chief".to_string()),
            telephone: Some("+34600000004".to_string()),
            email: None,
        }
    }

    #[tokio::test]
    async fn create_builds_all_owned_records() {
        let db = test_db().await;
        let db = db.as_ref();

        let id = create_resource(db, &new_resource()).await.unwrap();
        let resource = resources::get(db, id).await.unwrap().unwrap();

        assert_eq!(resource.name, "Engine 7");
        assert_eq!(resource.resource_type, ResourceType::Firetruck);
        assert_eq!(resource.status, ResourceStatus::Available);

        let actual = locations::get(db, resource.actual_location.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(actual.latitude, Some(41.40));
        let normal = locations::get(db, resource.normal_location.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(normal.latitude, Some(41.42));
        assert!(
            addresses::get(db, resource.actual_address.unwrap())
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            addresses::get(db, resource.normal_address.unwrap())
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_coordinates() {
        let db = test_db().await;
        let db = db.as_ref();

        let mut input = new_resource();
        input.normal_longitude = Some(180.5);
        let err = create_resource(db, &input).await.unwrap_err();
        assert!(matches!(err, CoordinationError::Validation { .. }));
    }

    #[tokio::test]
    async fn patch_merges_scalars_and_writes_through_coordinates() {
        let db = test_db().await;
        let db = db.as_ref();

        let id = create_resource(db, &new_resource()).await.unwrap();

        let patch = ResourcePatch {
            status: Some(ResourceStatus::Maintenance),
            actual_latitude: Some(41.50),
            ..ResourcePatch::default()
        };
        update_resource(db, id, &patch).await.unwrap();

        let resource = resources::get(db, id).await.unwrap().unwrap();
        assert_eq!(resource.status, ResourceStatus::Maintenance);
        // Untouched scalars survive
        assert_eq!(resource.name, "Engine 7");
        assert_eq!(resource.telephone.as_deref(), Some("+34600000004"));

        let actual = locations::get(db, resource.actual_location.unwrap())
            .await
            .unwrap()
            .unwrap();
        // Patched latitude applied, unpatched longitude kept
        assert_eq!(actual.latitude, Some(41.50));
        assert_eq!(actual.longitude, Some(2.18));

        // Home-base records untouched
        let normal = locations::get(db, resource.normal_location.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(normal.latitude, Some(41.42));
    }

    #[tokio::test]
    async fn update_missing_resource_is_not_found() {
        let db = test_db().await;
        let db = db.as_ref();

        let ghost = Uuid::new_v4();
        let err = update_resource(db, ghost, &ResourcePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoordinationError::ResourceNotFound(id) if id == ghost
        ));
    }
}
