use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};

use crate::controllers::fuel_controller::FuelController;
use crate::models::fuel_log::{CreateFuelLogRequest, FuelLogResponse, UpdateFuelLogRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_fuel_router() -> Router<AppState> {
    Router::new()
        .route("/", post(add_fuel_log))
        .route("/:id", put(update_fuel_log).delete(delete_fuel_log))
}

async fn add_fuel_log(
    State(state): State<AppState>,
    Json(request): Json<CreateFuelLogRequest>,
) -> Result<Json<FuelLogResponse>, AppError> {
    let controller = FuelController::new(state.pool.clone());
    let response = controller.add_fuel_log(request).await?;
    Ok(Json(response))
}

async fn update_fuel_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateFuelLogRequest>,
) -> Result<Json<FuelLogResponse>, AppError> {
    let controller = FuelController::new(state.pool.clone());
    let response = controller.update_fuel_log(id, request).await?;
    Ok(Json(response))
}

async fn delete_fuel_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = FuelController::new(state.pool.clone());
    controller.delete_fuel_log(id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
