use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::controllers::vehicle_controller::VehicleController;
use crate::models::vehicle::{CreateVehicleRequest, VehicleFilters, VehicleResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de vehículos para usuarios autenticados (no requieren admin):
/// el listado del dashboard y el alta rápida desde el formulario de viaje.
pub fn create_vehicle_router() -> Router<AppState> {
    Router::new().route("/", get(list_vehicles).post(create_vehicle))
}

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
