use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::trip_controller::TripController;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::trip::{
    EndTripRequest, RecordPastTripRequest, StartTripRequest, TripResponse, TripWithDetails,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_trip))
        .route("/end", post(end_trip))
        .route("/past", post(record_past_trip))
        .route("/:id", get(trip_details))
}

async fn start_trip(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<StartTripRequest>,
) -> Result<Json<TripResponse>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.start_trip(&user.user_id, request).await?;
    Ok(Json(response))
}

async fn end_trip(
    State(state): State<AppState>,
    Json(request): Json<EndTripRequest>,
) -> Result<Json<TripResponse>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.end_trip(request).await?;
    Ok(Json(response))
}

async fn record_past_trip(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<RecordPastTripRequest>,
) -> Result<Json<TripResponse>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.record_past_trip(&user.user_id, request).await?;
    Ok(Json(response))
}

async fn trip_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TripWithDetails>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.trip_details(id).await?;
    Ok(Json(response))
}
