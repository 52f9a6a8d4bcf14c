//! Handlers for the resource CRUD and read-side assignment endpoints.

use actix_web::{HttpResponse, web};
use dispatch_coordination::CoordinationError;
use dispatch_coordination::assignment;
use dispatch_coordination::roster::{self, NewResource, ResourcePatch};
use dispatch_database::{emergencies, locations, resources};
use dispatch_server_models::{
    ApiEmergency, ApiLocation, ApiResource, Confirmation, ResourceConfirmation,
};

use super::{error_response, parse_id, storage_error_response};
use crate::AppState;

/// `GET /api/resources`
///
/// Lists all resources, each joined with its current-position location.
pub async fn list(state: web::Data<AppState>) -> HttpResponse {
    match resources::list_with_location(state.db.as_ref()).await {
        Ok(rows) => {
            let resources: Vec<ApiResource> = rows
                .into_iter()
                .map(|row| ApiResource::from_parts(row.resource, row.location))
                .collect();
            HttpResponse::Ok().json(resources)
        }
        Err(e) => storage_error_response("List resources", &e),
    }
}

/// `POST /api/resources`
///
/// Creates a resource with its four owned coordinate records.
pub async fn create(state: web::Data<AppState>, body: web::Json<NewResource>) -> HttpResponse {
    match roster::create_resource(state.db.as_ref(), &body.into_inner()).await {
        Ok(resource_id) => HttpResponse::Created().json(ResourceConfirmation {
            message: "Resource Created".to_string(),
            resource_id,
        }),
        Err(e) => error_response("Create resource", &e),
    }
}

/// `GET /api/resources/{resource_id}`
pub async fn get_one(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let resource_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match resources::get(state.db.as_ref(), resource_id).await {
        Ok(Some(resource)) => HttpResponse::Ok().json(ApiResource::from(resource)),
        Ok(None) => error_response(
            "Read resource",
            &CoordinationError::ResourceNotFound(resource_id),
        ),
        Err(e) => storage_error_response("Read resource", &e),
    }
}

/// `PATCH /api/resources/{resource_id}`
///
/// Partial update; coordinate fields write through to the owned
/// location/address records.
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ResourcePatch>,
) -> HttpResponse {
    let resource_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match roster::update_resource(state.db.as_ref(), resource_id, &body.into_inner()).await {
        Ok(resource_id) => HttpResponse::Ok().json(ResourceConfirmation {
            message: "Resource Updated".to_string(),
            resource_id,
        }),
        Err(e) => error_response("Update resource", &e),
    }
}

/// `DELETE /api/resources/{resource_id}`
///
/// Deletes the resource after removing its assignment links and nulling
/// every emergency pointer that references it.
pub async fn delete(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let resource_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match assignment::delete_resource(state.db.as_ref(), resource_id).await {
        Ok(()) => HttpResponse::Ok().json(Confirmation {
            message: "Resource Deleted".to_string(),
        }),
        Err(e) => error_response("Delete resource", &e),
    }
}

/// `GET /api/resources/{resource_id}/assignments`
///
/// Lists the emergencies currently linked to the resource.
pub async fn assignments(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let resource_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match resources::get(state.db.as_ref(), resource_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(
                "Read assignments",
                &CoordinationError::ResourceNotFound(resource_id),
            );
        }
        Err(e) => return storage_error_response("Read assignments", &e),
    }

    match emergencies::list_for_resource(state.db.as_ref(), resource_id).await {
        Ok(rows) => {
            let emergencies: Vec<ApiEmergency> =
                rows.into_iter().map(ApiEmergency::from).collect();
            HttpResponse::Ok().json(emergencies)
        }
        Err(e) => storage_error_response("Read assignments", &e),
    }
}

/// `GET /api/resources/{resource_id}/location`
///
/// Returns the resource's current-position location record.
pub async fn location(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let resource_id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let resource = match resources::get(state.db.as_ref(), resource_id).await {
        Ok(Some(resource)) => resource,
        Ok(None) => {
            return error_response(
                "Read resource location",
                &CoordinationError::ResourceNotFound(resource_id),
            );
        }
        Err(e) => return storage_error_response("Read resource location", &e),
    };

    let location = match resource.actual_location {
        Some(location_id) => match locations::get(state.db.as_ref(), location_id).await {
            Ok(location) => location,
            Err(e) => return storage_error_response("Read resource location", &e),
        },
        None => None,
    };

    location.map_or_else(
        || {
            HttpResponse::NotFound().json(serde_json::json!({
                "error": "Location not found"
            }))
        },
        |location| HttpResponse::Ok().json(ApiLocation::from(location)),
    )
}
