//! Rutas de la API
//!
//! Ensambla el router completo: rutas públicas, rutas autenticadas y la
//! superficie de admin detrás del doble middleware (token válido + rol
//! ADMIN).

pub mod admin_routes;
pub mod auth_routes;
pub mod backup_routes;
pub mod fuel_routes;
pub mod trip_routes;
pub mod vehicle_routes;

use axum::{middleware as axum_middleware, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::auth::{admin_only_middleware, auth_middleware};
use crate::middleware::cors::cors_middleware;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let admin = Router::new()
        .nest(
            "/api/admin",
            admin_routes::create_admin_router().merge(backup_routes::create_backup_router()),
        )
        .route_layer(axum_middleware::from_fn(admin_only_middleware))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let protected = Router::new()
        .nest("/api/auth", auth_routes::protected_router())
        .nest("/api/trips", trip_routes::create_trip_router())
        .nest("/api/fuel", fuel_routes::create_fuel_router())
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes::public_router())
        .merge(protected)
        .merge(admin)
        .layer(cors_middleware())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
