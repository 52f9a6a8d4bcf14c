#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the dispatch server.
//!
//! These types are serialized to JSON for the REST API. They are
//! separate from the stored record types to allow independent evolution
//! of the API contract. Field names are the wire contract —
//! `emergency_id`, `location_emergency_data` — and must not drift.

use dispatch_emergency_models::{
    Emergency, EmergencyStatus, EmergencyType, Location, Priority, Resource, ResourceStatus,
    ResourceType,
};
use dispatch_gateway::QodSession;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Confirmation returned by mutating emergency endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct EmergencyConfirmation {
    /// Human-readable outcome.
    pub message: String,
    /// The emergency the operation applied to.
    pub emergency_id: Uuid,
}

/// Confirmation returned by mutating resource endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceConfirmation {
    /// Human-readable outcome.
    pub message: String,
    /// The resource the operation applied to.
    pub resource_id: Uuid,
}

/// Confirmation with no entity id (deletes).
#[derive(Debug, Serialize, Deserialize)]
pub struct Confirmation {
    /// Human-readable outcome.
    pub message: String,
}

/// Body of `POST /api/emergencies/{id}/assign`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssignResourcesRequest {
    /// The full replacement set of resource ids; duplicates collapse.
    pub resource_ids: Vec<Uuid>,
}

/// Body of `POST /api/resources/{id}/qos`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct QosActivateRequest {
    /// QoS profile name.
    pub profile: String,
    /// Session duration in seconds.
    pub duration: u32,
    /// Application server IPv4 the session covers.
    pub service_ipv4: String,
}

impl Default for QosActivateRequest {
    fn default() -> Self {
        Self {
            profile: "QOS_E".to_string(),
            duration: 600,
            service_ipv4: "0.0.0.0".to_string(),
        }
    }
}

/// Query of `GET /api/resources/{id}/device/location`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceLocationQuery {
    /// Maximum acceptable age of the position fix, in seconds.
    pub max_age: u32,
}

impl Default for DeviceLocationQuery {
    fn default() -> Self {
        Self { max_age: 3600 }
    }
}

/// Response of `POST /api/resources/{id}/qos`.
#[derive(Debug, Serialize)]
pub struct QosSessionResponse {
    /// Gateway-assigned session id.
    pub session_id: String,
    /// Device phone number the session covers.
    pub phone_number: String,
    /// QoS profile name.
    pub profile: String,
    /// Session duration in seconds.
    pub duration: u32,
}

impl From<QodSession> for QosSessionResponse {
    fn from(session: QodSession) -> Self {
        Self {
            session_id: session.id,
            phone_number: session.phone_number,
            profile: session.profile,
            duration: session.duration,
        }
    }
}

/// A location as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLocation {
    /// Location id.
    pub id: Uuid,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// Reported GPS accuracy in meters.
    pub accuracy: Option<f64>,
    /// Reported speed in m/s.
    pub speed: Option<f64>,
    /// Reported heading in degrees.
    pub heading: Option<f64>,
    /// RFC 3339 creation timestamp.
    pub time_created: String,
    /// RFC 3339 last-update timestamp.
    pub time_updated: Option<String>,
}

impl From<Location> for ApiLocation {
    fn from(location: Location) -> Self {
        Self {
            id: location.id,
            latitude: location.latitude,
            longitude: location.longitude,
            accuracy: location.accuracy,
            speed: location.speed,
            heading: location.heading,
            time_created: location.time_created,
            time_updated: location.time_updated,
        }
    }
}

/// An emergency as returned by the API, optionally joined with its
/// incident-site location.
#[derive(Debug, Serialize)]
pub struct ApiEmergency {
    /// Emergency id.
    pub id: Uuid,
    /// Short incident name.
    pub name: String,
    /// Incident description.
    pub description: String,
    /// Kind of incident.
    pub emergency_type: EmergencyType,
    /// Dispatch priority.
    pub priority: Priority,
    /// Lifecycle status.
    pub status: EmergencyStatus,
    /// Incident site location id.
    pub location_emergency: Option<Uuid>,
    /// Incident site address id.
    pub address_emergency: Option<Uuid>,
    /// Primary responder pointer.
    pub resource_id: Option<Uuid>,
    /// Primary responder location snapshot.
    pub location_resource: Option<Uuid>,
    /// Primary responder address snapshot.
    pub address_resource: Option<Uuid>,
    /// Destination resource pointer.
    pub destination_id: Option<Uuid>,
    /// Destination location snapshot.
    pub location_destination: Option<Uuid>,
    /// Destination address snapshot.
    pub address_destination: Option<Uuid>,
    /// Reporting contact name.
    pub name_contact: Option<String>,
    /// Reporting contact phone.
    pub telephone_contact: Option<String>,
    /// Reporting contact document id.
    pub id_contact: Option<String>,
    /// RFC 3339 creation timestamp.
    pub time_created: String,
    /// RFC 3339 last-update timestamp.
    pub time_updated: Option<String>,
    /// The joined incident-site location record, on list endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_emergency_data: Option<ApiLocation>,
}

impl ApiEmergency {
    /// Builds the API view of an emergency, optionally attaching the
    /// joined incident-site location.
    #[must_use]
    pub fn from_parts(emergency: Emergency, location: Option<Location>) -> Self {
        Self {
            id: emergency.id,
            name: emergency.name,
            description: emergency.description,
            emergency_type: emergency.emergency_type,
            priority: emergency.priority,
            status: emergency.status,
            location_emergency: emergency.location_emergency,
            address_emergency: emergency.address_emergency,
            resource_id: emergency.resource_id,
            location_resource: emergency.location_resource,
            address_resource: emergency.address_resource,
            destination_id: emergency.destination_id,
            location_destination: emergency.location_destination,
            address_destination: emergency.address_destination,
            name_contact: emergency.name_contact,
            telephone_contact: emergency.telephone_contact,
            id_contact: emergency.id_contact,
            time_created: emergency.time_created,
            time_updated: emergency.time_updated,
            location_emergency_data: location.map(ApiLocation::from),
        }
    }
}

impl From<Emergency> for ApiEmergency {
    fn from(emergency: Emergency) -> Self {
        Self::from_parts(emergency, None)
    }
}

/// A resource as returned by the API, optionally joined with its
/// current-position location.
#[derive(Debug, Serialize)]
pub struct ApiResource {
    /// Resource id.
    pub id: Uuid,
    /// Unit call name.
    pub name: String,
    /// Kind of unit.
    pub resource_type: ResourceType,
    /// Availability status.
    pub status: ResourceStatus,
    /// Current position location id.
    pub actual_location: Option<Uuid>,
    /// Current postal address id.
    pub actual_address: Option<Uuid>,
    /// Home-base location id.
    pub normal_location: Option<Uuid>,
    /// Home-base postal address id.
    pub normal_address: Option<Uuid>,
    /// Responsible contact name.
    pub responsible: Option<String>,
    /// Responsible contact phone.
    pub telephone: Option<String>,
    /// Responsible contact email.
    pub email: Option<String>,
    /// RFC 3339 creation timestamp.
    pub time_created: String,
    /// RFC 3339 last-update timestamp.
    pub time_updated: Option<String>,
    /// The joined current-position location record, on list endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_resource_data: Option<ApiLocation>,
}

impl ApiResource {
    /// Builds the API view of a resource, optionally attaching the
    /// joined current-position location.
    #[must_use]
    pub fn from_parts(resource: Resource, location: Option<Location>) -> Self {
        Self {
            id: resource.id,
            name: resource.name,
            resource_type: resource.resource_type,
            status: resource.status,
            actual_location: resource.actual_location,
            actual_address: resource.actual_address,
            normal_location: resource.normal_location,
            normal_address: resource.normal_address,
            responsible: resource.responsible,
            telephone: resource.telephone,
            email: resource.email,
            time_created: resource.time_created,
            time_updated: resource.time_updated,
            location_resource_data: location.map(ApiLocation::from),
        }
    }
}

impl From<Resource> for ApiResource {
    fn from(resource: Resource) -> Self {
        Self::from_parts(resource, None)
    }
}
