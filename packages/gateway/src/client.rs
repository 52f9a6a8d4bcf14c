//! NaC REST API client.
//!
//! The default request timeout matches the upstream integration's 10
//! seconds. All payload field names follow the NaC wire format
//! (`qosProfile`, `phoneNumber`, `ipv4Address`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::GatewayError;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Status information for a responder's device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Phone number in `+`-prefixed international format.
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    /// Public IPv4 address, if known.
    #[serde(rename = "ipv4Address")]
    pub ipv4_address: Option<String>,
    /// IPv6 address, if known.
    #[serde(rename = "ipv6Address")]
    pub ipv6_address: Option<String>,
    /// Connectivity status as reported by the network.
    pub status: Option<String>,
}

/// A device position fix from the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceLocation {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Elevation in meters, if reported.
    pub elevation: Option<f64>,
    /// Fix accuracy in meters, if reported.
    pub accuracy: Option<f64>,
}

/// An active Quality-on-Demand session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QodSession {
    /// Gateway-assigned session identifier.
    pub id: String,
    /// Device phone number the session covers.
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    /// QoS profile name (e.g. `QOS_E`).
    pub profile: String,
    /// Session duration in seconds.
    pub duration: u32,
}

/// Handle to the operator's Network-as-Code REST API.
///
/// Explicitly constructed (usually via [`NetworkGateway::from_env`]) and
/// handed to whoever needs it.
pub struct NetworkGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NetworkGateway {
    /// Builds a gateway client with a bounded per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Builds a gateway client from `NAC_BASE_URL`, `NAC_API_KEY`, and
    /// `NAC_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn from_env() -> Result<Self, GatewayError> {
        let base_url = std::env::var("NAC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:6000/api/v1".to_string());
        let api_key = std::env::var("NAC_API_KEY").unwrap_or_default();
        let timeout_secs = std::env::var("NAC_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(base_url, api_key, Duration::from_secs(timeout_secs))
    }

    /// Fetches status information for a device by phone number.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or the gateway
    /// answers with a non-success status.
    pub async fn get_device(&self, phone_number: &str) -> Result<DeviceStatus, GatewayError> {
        let phone = normalize_phone(phone_number);

        let resp = self
            .client
            .get(format!("{}/devices/{phone}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let resp = check_status(resp).await?;

        resp.json().await.map_err(|e| GatewayError::Parse {
            message: format!("Invalid device status response: {e}"),
        })
    }

    /// Fetches the last known location for a device, no older than
    /// `max_age_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or the gateway
    /// answers with a non-success status.
    pub async fn device_location(
        &self,
        phone_number: &str,
        max_age_secs: u32,
    ) -> Result<DeviceLocation, GatewayError> {
        let phone = normalize_phone(phone_number);

        let resp = self
            .client
            .post(format!("{}/location", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "device": { "phoneNumber": phone },
                "maxAge": max_age_secs,
            }))
            .send()
            .await?;

        let resp = check_status(resp).await?;

        resp.json().await.map_err(|e| GatewayError::Parse {
            message: format!("Invalid device location response: {e}"),
        })
    }

    /// Creates a QoD session for a device.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails, the gateway
    /// answers with a non-success status, or the response carries no
    /// session id.
    pub async fn create_qod_session(
        &self,
        phone_number: &str,
        profile: &str,
        duration_secs: u32,
        service_ipv4: &str,
    ) -> Result<QodSession, GatewayError> {
        let phone = normalize_phone(phone_number);

        let resp = self
            .client
            .post(format!("{}/sessions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "qosProfile": profile,
                "device": { "phoneNumber": phone },
                "applicationServer": { "ipv4Address": service_ipv4 },
                "duration": duration_secs,
            }))
            .send()
            .await?;

        let resp = check_status(resp).await?;

        let body: serde_json::Value = resp.json().await.map_err(|e| GatewayError::Parse {
            message: format!("Invalid QoD session response: {e}"),
        })?;

        parse_session(&body, &phone, profile, duration_secs)
    }

    /// Deactivates a QoD session by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or the gateway
    /// answers with a non-success status.
    pub async fn deactivate_qos(&self, session_id: &str) -> Result<(), GatewayError> {
        let resp = self
            .client
            .delete(format!("{}/sessions/{session_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        check_status(resp).await?;

        Ok(())
    }
}

/// Normalizes a phone number to `+`-prefixed international format.
#[must_use]
pub fn normalize_phone(phone_number: &str) -> String {
    let trimmed = phone_number.trim();
    if trimmed.starts_with('+') {
        trimmed.to_string()
    } else {
        format!("+{trimmed}")
    }
}

/// Converts a non-success response into [`GatewayError::Status`].
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(GatewayError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Parses a session-creation response body.
fn parse_session(
    body: &serde_json::Value,
    phone_number: &str,
    profile: &str,
    duration_secs: u32,
) -> Result<QodSession, GatewayError> {
    let id = body["id"]
        .as_str()
        .or_else(|| body["sessionId"].as_str())
        .ok_or_else(|| GatewayError::Parse {
            message: "Missing session id in QoD response".to_string(),
        })?;

    Ok(QodSession {
        id: id.to_string(),
        phone_number: phone_number.to_string(),
        profile: profile.to_string(),
        duration: body["duration"]
            .as_u64()
            .and_then(|d| u32::try_from(d).ok())
            .unwrap_or(duration_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_bare_numbers() {
        assert_eq!(normalize_phone("34600000001"), "+34600000001");
        assert_eq!(normalize_phone(" 34600000001 "), "+34600000001");
        assert_eq!(normalize_phone("+34600000001"), "+34600000001");
    }

    #[test]
    fn parses_session_with_id() {
        let body = serde_json::json!({ "id": "abc-123", "duration": 600 });
        let session = parse_session(&body, "+34600000001", "QOS_E", 300).unwrap();
        assert_eq!(session.id, "abc-123");
        assert_eq!(session.duration, 600);
        assert_eq!(session.profile, "QOS_E");
    }

    #[test]
    fn parses_session_with_alternate_id_field() {
        let body = serde_json::json!({ "sessionId": "xyz" });
        let session = parse_session(&body, "+34600000001", "QOS_E", 300).unwrap();
        assert_eq!(session.id, "xyz");
        // Falls back to the requested duration when the gateway omits it
        assert_eq!(session.duration, 300);
    }

    #[test]
    fn rejects_session_without_id() {
        let body = serde_json::json!({ "status": "REQUESTED" });
        assert!(parse_session(&body, "+34600000001", "QOS_E", 300).is_err());
    }
}
