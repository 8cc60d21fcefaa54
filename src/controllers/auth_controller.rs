//! Controller de autenticación
//!
//! Login con username/contraseña contra el hash bcrypt almacenado. El
//! mensaje de error es el mismo exista o no el usuario.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

use crate::config::EnvironmentConfig;
use crate::middleware::auth::generate_jwt_token;
use crate::models::user::UserResponse;
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

pub struct AuthController {
    repository: UserRepository,
    config: EnvironmentConfig,
}

impl AuthController {
    pub fn new(pool: SqlitePool, config: EnvironmentConfig) -> Self {
        Self {
            repository: UserRepository::new(pool),
            config,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        request.validate()?;

        let user = self
            .repository
            .find_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

        let valid = bcrypt::verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))?;
        if !valid {
            return Err(AppError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }

        let token = generate_jwt_token(&user, &self.config)?;

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    /// Perfil del usuario autenticado
    pub async fn me(&self, user_id: &str) -> AppResult<UserResponse> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| not_found_error("User", user_id))?;
        Ok(user.into())
    }
}
