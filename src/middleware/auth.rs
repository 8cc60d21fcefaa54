//! Middleware de autenticación JWT
//!
//! Este módulo maneja la autenticación JWT, extracción de tokens
//! y verificación de usuarios autenticados.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    config::EnvironmentConfig,
    models::user::{User, UserRole},
    state::AppState,
    utils::errors::AppError,
};

/// Claims del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub role: String,
    pub section: Option<String>,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// Usuario autenticado que se inyecta en las requests
///
/// La identidad del caller siempre viaja explícita hasta los controllers;
/// ningún handler la saca de estado global.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: UserRole,
    pub section: Option<String>,
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let token_data = decode::<Claims>(
        auth_header,
        &DecodingKey::from_secret(state.config.jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    let claims = token_data.claims;

    // El token puede sobrevivir al usuario; la fila tiene que seguir existiendo
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&claims.sub)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    let authenticated_user = AuthenticatedUser {
        user_id: user.id,
        role: user.role,
        section: user.section,
    };

    request.extensions_mut().insert(authenticated_user);

    Ok(next.run(request).await)
}

/// Middleware para verificar permisos de admin.
///
/// Un no-admin recibe 401 con cuerpo JSON, nunca un redirect: los callers
/// son programáticos.
pub async fn admin_only_middleware(
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if user.role != UserRole::Admin {
        return Err(AppError::Unauthorized(
            "Administrator permissions required".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Función para generar JWT token
pub fn generate_jwt_token(user: &User, config: &EnvironmentConfig) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::seconds(config.jwt_expiration as i64);

    let claims = Claims {
        sub: user.id.clone(),
        role: user.role.as_str().to_string(),
        section: user.section.clone(),
        name: Some(user.display_name().to_string()),
        image_url: user.image_url.clone(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let encoding_key = jsonwebtoken::EncodingKey::from_secret(config.jwt_secret.as_ref());

    jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("Failed to sign JWT: {}", e)))
}
