//! Superficie CRUD del panel de administración
//!
//! Todas estas rutas pasan por el middleware de admin; un caller sin rol
//! ADMIN recibe 401 antes de llegar aquí.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::controllers::analytics_controller::AnalyticsController;
use crate::controllers::trip_controller::TripController;
use crate::controllers::user_controller::UserController;
use crate::controllers::vehicle_controller::VehicleController;
use crate::models::analytics::{AnalyticsQuery, StatsResponse, TripFilter};
use crate::models::trip::{
    AdminCreateTripRequest, AdminUpdateTripRequest, TripListQuery, TripResponse,
};
use crate::models::user::{CreateUserRequest, UpdateUserRequest, UserFilters, UserResponse};
use crate::models::vehicle::{
    CreateVehicleRequest, UpdateVehicleRequest, VehicleFilters, VehicleResponse,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users)
                .post(create_user)
                .put(update_user)
                .delete(delete_user),
        )
        .route(
            "/vehicles",
            get(list_vehicles)
                .post(create_vehicle)
                .put(update_vehicle)
                .delete(delete_vehicle),
        )
        .route(
            "/trips",
            get(list_trips)
                .post(create_trip)
                .put(update_trip)
                .delete(delete_trip),
        )
        .route("/stats", get(stats))
        .route("/analytics/export", get(analytics_export))
        .route("/sections", get(sections))
        .route("/odometer-sync", post(odometer_sync))
}

#[derive(Debug, Deserialize)]
struct IdQuery {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct UserIdQuery {
    id: String,
}

/// Respuesta CSV con BOM y descarga forzada
fn csv_response(filename: &str, content: String) -> Response {
    (
        [
            (
                header::CONTENT_TYPE,
                "text/csv; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        content,
    )
        .into_response()
}

// --- Usuarios ---

async fn list_users(
    State(state): State<AppState>,
    Query(filters): Query<UserFilters>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let controller = UserController::new(state.pool.clone());
    let response = controller.list_users(&filters).await?;
    Ok(Json(response))
}

async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = UserController::new(state.pool.clone());
    let response = controller.create_user(request).await?;
    Ok(Json(response))
}

async fn update_user(
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = UserController::new(state.pool.clone());
    let response = controller.update_user(request).await?;
    Ok(Json(response))
}

async fn delete_user(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = UserController::new(state.pool.clone());
    controller.delete_user(&query.id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

// --- Vehículos ---

async fn list_vehicles(
    State(state): State<AppState>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.list_vehicles(&filters).await?;
    Ok(Json(response))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<VehicleResponse>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.create_vehicle(request).await?;
    Ok(Json(response))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<VehicleResponse>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.update_vehicle(request).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    controller.delete_vehicle(query.id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

// --- Viajes ---

/// Listado paginado; con `export=csv` devuelve el set completo como CSV
async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<TripListQuery>,
) -> Result<Response, AppError> {
    let controller = TripController::new(state.pool.clone());

    if query.export.as_deref() == Some("csv") {
        let (filename, content) = controller.export_csv(&query).await?;
        return Ok(csv_response(&filename, content));
    }

    let page = controller.list_admin(&query).await?;
    Ok(Json(page).into_response())
}

async fn create_trip(
    State(state): State<AppState>,
    Json(request): Json<AdminCreateTripRequest>,
) -> Result<Json<TripResponse>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.admin_create_trip(request).await?;
    Ok(Json(response))
}

async fn update_trip(
    State(state): State<AppState>,
    Json(request): Json<AdminUpdateTripRequest>,
) -> Result<Json<TripResponse>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.update_trip(request).await?;
    Ok(Json(response))
}

async fn delete_trip(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = TripController::new(state.pool.clone());
    controller.delete_trip(query.id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

// --- Analytics ---

async fn stats(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let filter = TripFilter::from_query(&query)?;
    let controller = AnalyticsController::new(state.pool.clone());
    let response = controller.stats(&filter).await?;
    Ok(Json(response))
}

async fn analytics_export(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Response, AppError> {
    let filter = TripFilter::from_query(&query)?;
    let controller = AnalyticsController::new(state.pool.clone());
    let (filename, content) = controller.export_csv(&filter).await?;
    Ok(csv_response(&filename, content))
}

async fn sections(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let controller = AnalyticsController::new(state.pool.clone());
    let response = controller.sections().await?;
    Ok(Json(response))
}

// --- Mantenimiento ---

async fn odometer_sync(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let updated = controller.sync_odometers().await?;
    Ok(Json(serde_json::json!({ "success": true, "updated": updated })))
}
