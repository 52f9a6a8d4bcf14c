#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Coordination services for the dispatch backend.
//!
//! This crate holds the domain logic that CRUD alone doesn't cover:
//!
//! - [`assignment`] — the transactional full-replace assignment of
//!   resources to an emergency, and the resource deletion cascade.
//! - [`lifecycle`] — emergency creation, partial update (including the
//!   `Solved` QoS side effect), and deletion.
//! - [`roster`] — resource creation and partial update, with
//!   write-through to the owned location/address records.
//!
//! Every mutating operation runs inside one `begin_transaction()` scope:
//! it either commits a consistent state or rolls back completely. The
//! only exception is QoS teardown, which is best-effort and happens
//! strictly after commit so a slow gateway can never hold a transaction
//! open.

pub mod assignment;
pub mod lifecycle;
pub mod roster;

use dispatch_database::DbError;
use uuid::Uuid;

/// Errors surfaced by the coordination services.
#[derive(Debug, thiserror::Error)]
pub enum CoordinationError {
    /// The named emergency does not exist.
    #[error("Emergency not found: {0}")]
    EmergencyNotFound(Uuid),

    /// The named resource does not exist.
    #[error("Resource not found: {0}")]
    ResourceNotFound(Uuid),

    /// Out-of-range or malformed input.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the rejected input.
        message: String,
    },

    /// Reserved for optimistic-concurrency checks.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting state.
        message: String,
    },

    /// A storage operation failed; the in-flight transaction was rolled
    /// back and no partial state was persisted.
    #[error(transparent)]
    Storage(#[from] DbError),
}

/// Validates a latitude in decimal degrees.
///
/// # Errors
///
/// Returns [`CoordinationError::Validation`] when outside `[-90, 90]`.
pub fn validate_latitude(value: f64) -> Result<(), CoordinationError> {
    if (-90.0..=90.0).contains(&value) {
        Ok(())
    } else {
        Err(CoordinationError::Validation {
            message: format!("latitude {value} out of range [-90, 90]"),
        })
    }
}

/// Validates a longitude in decimal degrees.
///
/// # Errors
///
/// Returns [`CoordinationError::Validation`] when outside `[-180, 180]`.
pub fn validate_longitude(value: f64) -> Result<(), CoordinationError> {
    if (-180.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(CoordinationError::Validation {
            message: format!("longitude {value} out of range [-180, 180]"),
        })
    }
}

pub(crate) fn validate_opt_latitude(value: Option<f64>) -> Result<(), CoordinationError> {
    value.map_or(Ok(()), validate_latitude)
}

pub(crate) fn validate_opt_longitude(value: Option<f64>) -> Result<(), CoordinationError> {
    value.map_or(Ok(()), validate_longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latitude_bounds_are_inclusive() {
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.0001).is_err());
        assert!(validate_latitude(-90.0001).is_err());
    }

    #[test]
    fn longitude_bounds_are_inclusive() {
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.0001).is_err());
        assert!(validate_longitude(-180.0001).is_err());
    }
}
