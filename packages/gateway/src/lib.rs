#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Network-as-Code gateway client for responder devices.
//!
//! Wraps the operator's NaC REST API: device status, device location,
//! and Quality-on-Demand (QoD) session management for responders'
//! devices. The client is constructed explicitly at startup and passed
//! into the service layer — there is no process-wide singleton.
//!
//! Every call here is best-effort from the core's point of view: a
//! [`GatewayError`] must never fail an emergency or resource
//! transaction. Requests carry a bounded timeout so a stalled gateway
//! cannot hold a request handler hostage.

mod client;
mod sessions;

pub use client::{DeviceLocation, DeviceStatus, NetworkGateway, QodSession};
pub use sessions::SessionRegistry;

use async_trait::async_trait;
use uuid::Uuid;

/// Errors from gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("Gateway returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for the logs.
        body: String,
    },

    /// The response body could not be interpreted.
    #[error("Gateway response parse error: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },
}

/// The QoS seam the coordination core depends on.
///
/// The core only ever asks for teardown — activation happens through the
/// HTTP adapters. Implemented by [`QosService`]; tests substitute their
/// own recorder.
#[async_trait]
pub trait QosControl: Send + Sync {
    /// Tears down the active QoS session for a resource, if any.
    ///
    /// Returns `true` if a session existed and was deactivated, `false`
    /// if the resource had no active session.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the gateway rejects the teardown; the
    /// session stays registered so a later attempt can retry.
    async fn deactivate_for_resource(&self, resource_id: Uuid) -> Result<bool, GatewayError>;
}

/// Gateway client plus the registry of active sessions per resource.
pub struct QosService {
    gateway: NetworkGateway,
    sessions: SessionRegistry,
}

impl QosService {
    /// Bundles a gateway client with a fresh session registry.
    #[must_use]
    pub fn new(gateway: NetworkGateway) -> Self {
        Self {
            gateway,
            sessions: SessionRegistry::new(),
        }
    }

    /// Creates a QoD session for a resource's device and registers it as
    /// the resource's active session, replacing (and tearing down) any
    /// previous one.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if session creation fails.
    pub async fn activate_for_resource(
        &self,
        resource_id: Uuid,
        phone_number: &str,
        profile: &str,
        duration_secs: u32,
        service_ipv4: &str,
    ) -> Result<QodSession, GatewayError> {
        if let Some(previous) = self.sessions.remove(resource_id) {
            if let Err(e) = self.gateway.deactivate_qos(&previous.id).await {
                log::warn!(
                    "Failed to tear down stale QoS session {} for resource {resource_id}: {e}",
                    previous.id
                );
            }
        }

        let session = self
            .gateway
            .create_qod_session(phone_number, profile, duration_secs, service_ipv4)
            .await?;

        self.sessions.insert(resource_id, session.clone());

        Ok(session)
    }

    /// Returns the active session for a resource, if any.
    #[must_use]
    pub fn active_session(&self, resource_id: Uuid) -> Option<QodSession> {
        self.sessions.get(resource_id)
    }

    /// The underlying gateway client, for device status/location calls.
    #[must_use]
    pub const fn gateway(&self) -> &NetworkGateway {
        &self.gateway
    }
}

#[async_trait]
impl QosControl for QosService {
    async fn deactivate_for_resource(&self, resource_id: Uuid) -> Result<bool, GatewayError> {
        let Some(session) = self.sessions.get(resource_id) else {
            return Ok(false);
        };

        self.gateway.deactivate_qos(&session.id).await?;
        self.sessions.remove(resource_id);

        Ok(true)
    }
}
