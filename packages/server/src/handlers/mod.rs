//! HTTP handler functions for the dispatch API.

pub mod device;
pub mod emergencies;
pub mod qos;
pub mod resources;

use actix_web::HttpResponse;
use dispatch_coordination::CoordinationError;
use dispatch_database::DbError;
use dispatch_server_models::ApiHealth;
use uuid::Uuid;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Parses a path id, answering `400 Invalid UUID format` on failure.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, HttpResponse> {
    Uuid::parse_str(raw).map_err(|_| {
        HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid UUID format"
        }))
    })
}

/// Maps a [`CoordinationError`] onto an HTTP response.
///
/// Not-found and validation errors surface with the offending id or
/// message; storage errors are logged and answered with a generic 500 —
/// the transaction was already rolled back, so nothing was persisted.
pub(crate) fn error_response(operation: &str, e: &CoordinationError) -> HttpResponse {
    match e {
        CoordinationError::EmergencyNotFound(_) | CoordinationError::ResourceNotFound(_) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": e.to_string() }))
        }
        CoordinationError::Validation { .. } => {
            HttpResponse::UnprocessableEntity().json(serde_json::json!({ "error": e.to_string() }))
        }
        CoordinationError::Conflict { .. } => {
            HttpResponse::Conflict().json(serde_json::json!({ "error": e.to_string() }))
        }
        CoordinationError::Storage(_) => {
            log::error!("{operation} failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("{operation} failed")
            }))
        }
    }
}

/// Maps a raw [`DbError`] from a read-only query onto a 500 response.
pub(crate) fn storage_error_response(operation: &str, e: &DbError) -> HttpResponse {
    log::error!("{operation} failed: {e}");
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": format!("{operation} failed")
    }))
}
