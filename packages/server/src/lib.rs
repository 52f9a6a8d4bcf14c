#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the dispatch coordination backend.
//!
//! Serves the emergency and resource CRUD API, the assignment endpoint,
//! and the QoS adapters for responder devices. All domain logic lives in
//! the coordination crate; the handlers here are thin adapters that
//! parse ids, deserialize bodies, and map [`dispatch_coordination::CoordinationError`]
//! onto HTTP status codes.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use dispatch_database::{db, schema};
use dispatch_gateway::{NetworkGateway, QosService};
use std::sync::Arc;
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// Database connection.
    pub db: Arc<dyn Database>,
    /// Gateway client plus the active QoS session registry.
    pub qos: Arc<QosService>,
}

/// Starts the dispatch API server.
///
/// Connects to the database, ensures the schema, builds the NaC gateway
/// client from the environment, and starts the Actix-Web HTTP server.
/// This is a regular async function — the caller provides the async
/// runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the database connection, schema bootstrap, or gateway
/// client construction fails.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Connecting to database...");
    let db_conn = db::connect_from_env()
        .await
        .expect("Failed to connect to database");

    log::info!("Ensuring database schema...");
    schema::ensure_schema(db_conn.as_ref())
        .await
        .expect("Failed to ensure database schema");

    log::info!("Building NaC gateway client...");
    let gateway = NetworkGateway::from_env().expect("Failed to build gateway client");

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
        qos: Arc::new(QosService::new(gateway)),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5001);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route(
                        "/emergencies",
                        web::get().to(handlers::emergencies::list),
                    )
                    .route(
                        "/emergencies",
                        web::post().to(handlers::emergencies::create),
                    )
                    .route(
                        "/emergencies/{emergency_id}",
                        web::get().to(handlers::emergencies::get_one),
                    )
                    .route(
                        "/emergencies/{emergency_id}",
                        web::patch().to(handlers::emergencies::update),
                    )
                    .route(
                        "/emergencies/{emergency_id}",
                        web::delete().to(handlers::emergencies::delete),
                    )
                    .route(
                        "/emergencies/{emergency_id}/assign",
                        web::post().to(handlers::emergencies::assign),
                    )
                    .route("/resources", web::get().to(handlers::resources::list))
                    .route("/resources", web::post().to(handlers::resources::create))
                    .route(
                        "/resources/{resource_id}",
                        web::get().to(handlers::resources::get_one),
                    )
                    .route(
                        "/resources/{resource_id}",
                        web::patch().to(handlers::resources::update),
                    )
                    .route(
                        "/resources/{resource_id}",
                        web::delete().to(handlers::resources::delete),
                    )
                    .route(
                        "/resources/{resource_id}/assignments",
                        web::get().to(handlers::resources::assignments),
                    )
                    .route(
                        "/resources/{resource_id}/location",
                        web::get().to(handlers::resources::location),
                    )
                    .route(
                        "/resources/{resource_id}/qos",
                        web::post().to(handlers::qos::activate),
                    )
                    .route(
                        "/resources/{resource_id}/qos",
                        web::delete().to(handlers::qos::deactivate),
                    )
                    .route(
                        "/resources/{resource_id}/device",
                        web::get().to(handlers::device::status),
                    )
                    .route(
                        "/resources/{resource_id}/device/location",
                        web::get().to(handlers::device::location),
                    ),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
