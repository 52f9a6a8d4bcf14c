//! Handlers for the emergency CRUD and assignment endpoints.

use actix_web::{HttpResponse, web};
use dispatch_coordination::CoordinationError;
use dispatch_coordination::assignment;
use dispatch_coordination::lifecycle::{self, EmergencyPatch, NewEmergency};
use dispatch_database::emergencies;
use dispatch_server_models::{
    ApiEmergency, AssignResourcesRequest, Confirmation, EmergencyConfirmation,
};

use super::{error_response, parse_id, storage_error_response};
use crate::AppState;

/// `GET /api/emergencies`
///
/// Lists all emergencies, each joined with its incident-site location.
pub async fn list(state: web::Data<AppState>) -> HttpResponse {
    match emergencies::list_with_location(state.db.as_ref()).await {
        Ok(rows) => {
            let emergencies: Vec<ApiEmergency> = rows
                .into_iter()
                .map(|row| ApiEmergency::from_parts(row.emergency, row.location))
                .collect();
            HttpResponse::Ok().json(emergencies)
        }
        Err(e) => storage_error_response("List emergencies", &e),
    }
}

/// `POST /api/emergencies`
///
/// Creates an emergency with its owned location and address records.
pub async fn create(state: web::Data<AppState>, body: web::Json<NewEmergency>) -> HttpResponse {
    match lifecycle::create_emergency(state.db.as_ref(), &body.into_inner()).await {
        Ok(emergency_id) => HttpResponse::Created().json(EmergencyConfirmation {
            message: "Emergency Created".to_string(),
            emergency_id,
        }),
        Err(e) => error_response("Create emergency", &e),
    }
}

/// `GET /api/emergencies/{emergency_id}`
pub async fn get_one(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let emergency_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match emergencies::get(state.db.as_ref(), emergency_id).await {
        Ok(Some(emergency)) => HttpResponse::Ok().json(ApiEmergency::from(emergency)),
        Ok(None) => error_response(
            "Read emergency",
            &CoordinationError::EmergencyNotFound(emergency_id),
        ),
        Err(e) => storage_error_response("Read emergency", &e),
    }
}

/// `PATCH /api/emergencies/{emergency_id}`
///
/// Partial update. Setting the status to `Solved` tears down QoS for
/// every linked resource after the update commits.
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<EmergencyPatch>,
) -> HttpResponse {
    let emergency_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match lifecycle::update_emergency(
        state.db.as_ref(),
        state.qos.as_ref(),
        emergency_id,
        &body.into_inner(),
    )
    .await
    {
        Ok(emergency_id) => HttpResponse::Ok().json(EmergencyConfirmation {
            message: "Emergency Updated".to_string(),
            emergency_id,
        }),
        Err(e) => error_response("Update emergency", &e),
    }
}

/// `DELETE /api/emergencies/{emergency_id}`
///
/// Deletes the emergency together with its assignment link rows.
pub async fn delete(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let emergency_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match lifecycle::delete_emergency(state.db.as_ref(), emergency_id).await {
        Ok(()) => HttpResponse::Ok().json(Confirmation {
            message: "Emergency Deleted".to_string(),
        }),
        Err(e) => error_response("Delete emergency", &e),
    }
}

/// `POST /api/emergencies/{emergency_id}/assign`
///
/// Replaces the emergency's assigned resource set wholesale.
pub async fn assign(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AssignResourcesRequest>,
) -> HttpResponse {
    let emergency_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match assignment::assign_resources(state.db.as_ref(), emergency_id, &body.resource_ids).await {
        Ok(_) => HttpResponse::Ok().json(EmergencyConfirmation {
            message: "Resources Assigned".to_string(),
            emergency_id,
        }),
        Err(e) => error_response("Assign resources", &e),
    }
}
