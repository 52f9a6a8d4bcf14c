#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Domain types for the dispatch coordination backend.
//!
//! This crate defines the canonical enums and record types shared across
//! the system: emergencies (incidents), resources (responder units), the
//! location/address records they own, and the many-to-many assignment
//! link between them. The assignment link table is the single source of
//! truth for "which resources are currently working an emergency"; the
//! `resource_id`/`destination_id` pointers on [`Emergency`] are a
//! primary-responder convenience view, not authoritative.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Kind of incident an emergency represents.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum EmergencyType {
    /// Structural or wildland fire
    Fire,
    /// Medical emergency requiring an ambulance
    Medical,
    /// Traffic or industrial accident
    Accident,
    /// Flood, earthquake, storm damage
    NaturalDisaster,
    /// Incidents not fitting other types
    Other,
}

impl Default for EmergencyType {
    fn default() -> Self {
        Self::Other
    }
}

impl EmergencyType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Fire,
            Self::Medical,
            Self::Accident,
            Self::NaturalDisaster,
            Self::Other,
        ]
    }
}

/// Dispatch priority of an emergency.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Priority {
    /// Life-threatening, respond immediately
    Critical,
    /// Urgent response required
    High,
    /// Standard response
    Medium,
    /// Can wait for available capacity
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Priority {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Critical, Self::High, Self::Medium, Self::Low]
    }
}

/// Lifecycle status of an emergency.
///
/// The nominal progression is `Active → Pending → Solved → Archived`,
/// but any status may be written directly through a partial update —
/// transitions are not guarded.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum EmergencyStatus {
    /// Incident is live and being worked
    Active,
    /// Awaiting resources or confirmation
    Pending,
    /// Incident resolved; triggers QoS teardown for linked resources
    Solved,
    /// Closed and kept for the record
    Archived,
}

impl Default for EmergencyStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl EmergencyStatus {
    /// Returns `true` for statuses where the incident no longer needs
    /// resources on scene.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Solved | Self::Archived)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Active, Self::Pending, Self::Solved, Self::Archived]
    }
}

/// Availability status of a responder resource.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ResourceStatus {
    /// Status has never been reported
    Unknown,
    /// Free to be assigned
    Available,
    /// Currently assigned to at least one emergency
    Busy,
    /// Out of service
    Maintenance,
}

impl Default for ResourceStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl ResourceStatus {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Unknown,
            Self::Available,
            Self::Busy,
            Self::Maintenance,
        ]
    }
}

/// Kind of responder unit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ResourceType {
    /// Type has never been reported
    Unknown,
    /// Medical transport unit
    Ambulance,
    /// Police patrol unit
    Police,
    /// Fire engine
    Firetruck,
}

impl Default for ResourceType {
    fn default() -> Self {
        Self::Unknown
    }
}

impl ResourceType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Unknown, Self::Ambulance, Self::Police, Self::Firetruck]
    }
}

/// A geocoordinate record owned by exactly one emergency or resource.
///
/// Identity is immutable; coordinates are mutable. An emergency and its
/// originally-linked resource may hold distinct `Location` rows even when
/// they describe the same place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Primary key.
    pub id: Uuid,
    /// Latitude in decimal degrees, if known.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, if known.
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

/// A postal address record, same ownership discipline as [`Location`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Primary key.
    pub id: Uuid,
    /// Street number.
    pub street_number: Option<String>,
    /// Street name.
    pub street_name: Option<String>,
    /// Neighborhood.
    pub neighborhood: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// ISO country code.
    pub country_code: Option<String>,
    /// Latitude in decimal degrees, if geocoded.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, if geocoded.
    pub longitude: Option<f64>,
    /// Free-form first address line.
    pub address_line_1: Option<String>,
    /// RFC 3339 creation timestamp.
    pub time_created: String,
    /// RFC 3339 last-update timestamp.
    pub time_updated: Option<String>,
}

/// A responder unit (vehicle and its crew/device).
///
/// Invariant: `status` is [`ResourceStatus::Busy`] iff the resource is
/// linked to at least one non-terminal emergency. This is enforced at
/// assignment time, not as a continuous constraint — a status written
/// directly through resource update is not auto-corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Primary key.
    pub id: Uuid,
    /// Unit call name.
    pub name: String,
    /// Kind of unit.
    pub resource_type: ResourceType,
    /// Availability status.
    pub status: ResourceStatus,
    /// Current position.
    pub actual_location: Option<Uuid>,
    /// Current postal address.
    pub actual_address: Option<Uuid>,
    /// Home-base position.
    pub normal_location: Option<Uuid>,
    /// Home-base postal address.
    pub normal_address: Option<Uuid>,
    /// Responsible contact name.
    pub responsible: Option<String>,
    /// Responsible contact phone (also the unit's device number for QoS).
    pub telephone: Option<String>,
    /// Responsible contact email.
    pub email: Option<String>,
    /// RFC 3339 creation timestamp.
    pub time_created: String,
    /// RFC 3339 last-update timestamp.
    pub time_updated: Option<String>,
}

/// An incident record requiring resource response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emergency {
    /// Primary key.
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
    /// Incident site position.
    pub location_emergency: Option<Uuid>,
    /// Incident site postal address.
    pub address_emergency: Option<Uuid>,
    /// Primary responder pointer (convenience view; the link table is
    /// authoritative for assignment).
    pub resource_id: Option<Uuid>,
    /// Primary responder position snapshot.
    pub location_resource: Option<Uuid>,
    /// Primary responder address snapshot.
    pub address_resource: Option<Uuid>,
    /// Transport destination resource (e.g. hospital).
    pub destination_id: Option<Uuid>,
    /// Destination position snapshot.
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emergency_status_display_roundtrip() {
        for status in EmergencyStatus::all() {
            let parsed: EmergencyStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, *status);
        }
    }

    #[test]
    fn resource_status_display_roundtrip() {
        for status in ResourceStatus::all() {
            let parsed: ResourceStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, *status);
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(!EmergencyStatus::Active.is_terminal());
        assert!(!EmergencyStatus::Pending.is_terminal());
        assert!(EmergencyStatus::Solved.is_terminal());
        assert!(EmergencyStatus::Archived.is_terminal());
    }

    #[test]
    fn defaults_match_creation_semantics() {
        assert_eq!(EmergencyType::default(), EmergencyType::Other);
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(EmergencyStatus::default(), EmergencyStatus::Active);
        assert_eq!(ResourceStatus::default(), ResourceStatus::Unknown);
        assert_eq!(ResourceType::default(), ResourceType::Unknown);
    }

    #[test]
    fn emergency_type_serde_uses_variant_names() {
        let json = serde_json::to_string(&EmergencyType::NaturalDisaster).unwrap();
        assert_eq!(json, "\"NaturalDisaster\"");
        let parsed: EmergencyType = serde_json::from_str("\"Fire\"").unwrap();
        assert_eq!(parsed, EmergencyType::Fire);
    }
}
