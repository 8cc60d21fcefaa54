use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::auth_controller::{AuthController, LoginRequest, LoginResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::UserResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de autenticación accesibles sin token
pub fn public_router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Rutas de autenticación que requieren un token válido
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let controller = AuthController::new(state.pool.clone(), state.config.clone());
    let response = controller.login(request).await?;
    Ok(Json(response))
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = AuthController::new(state.pool.clone(), state.config.clone());
    let response = controller.me(&user.user_id).await?;
    Ok(Json(response))
}
