//! Handlers for device status and location lookups via the NaC gateway.
//!
//! These read the responder's live device state from the network
//! operator, as opposed to `/resources/{id}/location` which reads the
//! stored location record.

use actix_web::{HttpResponse, web};
use dispatch_coordination::CoordinationError;
use dispatch_database::resources;
use dispatch_server_models::DeviceLocationQuery;

use super::{error_response, parse_id, storage_error_response};
use crate::AppState;
use crate::handlers::qos::gateway_error_response;

/// `GET /api/resources/{resource_id}/device`
///
/// Returns network-reported status for the resource's device.
pub async fn status(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let resource_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let resource = match resources::get(state.db.as_ref(), resource_id).await {
        Ok(Some(resource)) => resource,
        Ok(None) => {
            return error_response(
                "Read device status",
                &CoordinationError::ResourceNotFound(resource_id),
            );
        }
        Err(e) => return storage_error_response("Read device status", &e),
    };

    let Some(telephone) = resource.telephone else {
        return error_response(
            "Read device status",
            &CoordinationError::Validation {
                message: format!("Resource {resource_id} has no device phone number"),
            },
        );
    };

    match state.qos.gateway().get_device(&telephone).await {
        Ok(device) => HttpResponse::Ok().json(device),
        Err(e) => gateway_error_response("Read device status", &e),
    }
}

/// `GET /api/resources/{resource_id}/device/location`
///
/// Returns the network-reported position fix for the resource's device,
/// no older than `max_age` seconds.
pub async fn location(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DeviceLocationQuery>,
) -> HttpResponse {
    let resource_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let resource = match resources::get(state.db.as_ref(), resource_id).await {
        Ok(Some(resource)) => resource,
        Ok(None) => {
            return error_response(
                "Read device location",
                &CoordinationError::ResourceNotFound(resource_id),
            );
        }
        Err(e) => return storage_error_response("Read device location", &e),
    };

    let Some(telephone) = resource.telephone else {
        return error_response(
            "Read device location",
            &CoordinationError::Validation {
                message: format!("Resource {resource_id} has no device phone number"),
            },
        );
    };

    match state
        .qos
        .gateway()
        .device_location(&telephone, query.max_age)
        .await
    {
        Ok(fix) => HttpResponse::Ok().json(fix),
        Err(e) => gateway_error_response("Read device location", &e),
    }
}
