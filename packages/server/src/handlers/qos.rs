//! Handlers for QoS session management on a resource's device.
//!
//! These are adapters over the NaC gateway: they resolve the resource's
//! device phone number and delegate to the gateway client. Gateway
//! failures surface as 502 — they never touch stored state.

use actix_web::{HttpResponse, web};
use dispatch_coordination::CoordinationError;
use dispatch_database::resources;
use dispatch_gateway::{GatewayError, QosControl as _};
use dispatch_server_models::{Confirmation, QosActivateRequest, QosSessionResponse};

use super::{error_response, parse_id, storage_error_response};
use crate::AppState;

/// `POST /api/resources/{resource_id}/qos`
///
/// Creates a QoD session for the resource's device and registers it as
/// the resource's active session.
pub async fn activate(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<QosActivateRequest>,
) -> HttpResponse {
    let resource_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let resource = match resources::get(state.db.as_ref(), resource_id).await {
        Ok(Some(resource)) => resource,
        Ok(None) => {
            return error_response(
                "Activate QoS",
                &CoordinationError::ResourceNotFound(resource_id),
            );
        }
        Err(e) => return storage_error_response("Activate QoS", &e),
    };

    let Some(telephone) = resource.telephone else {
        return error_response(
            "Activate QoS",
            &CoordinationError::Validation {
                message: format!("Resource {resource_id} has no device phone number"),
            },
        );
    };

    let request = body.into_inner();
    match state
        .qos
        .activate_for_resource(
            resource_id,
            &telephone,
            &request.profile,
            request.duration,
            &request.service_ipv4,
        )
        .await
    {
        Ok(session) => HttpResponse::Created().json(QosSessionResponse::from(session)),
        Err(e) => gateway_error_response("Activate QoS", &e),
    }
}

/// `DELETE /api/resources/{resource_id}/qos`
///
/// Deactivates the resource's active QoD session.
pub async fn deactivate(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let resource_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match resources::get(state.db.as_ref(), resource_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(
                "Deactivate QoS",
                &CoordinationError::ResourceNotFound(resource_id),
            );
        }
        Err(e) => return storage_error_response("Deactivate QoS", &e),
    }

    match state.qos.deactivate_for_resource(resource_id).await {
        Ok(true) => HttpResponse::Ok().json(Confirmation {
            message: "QoS Deactivated".to_string(),
        }),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "No active QoS session found"
        })),
        Err(e) => gateway_error_response("Deactivate QoS", &e),
    }
}

/// Maps a [`GatewayError`] onto a 502 response.
pub(crate) fn gateway_error_response(operation: &str, e: &GatewayError) -> HttpResponse {
    log::error!("{operation} failed at the gateway: {e}");
    HttpResponse::BadGateway().json(serde_json::json!({
        "error": format!("{operation} failed: {e}")
    }))
}
