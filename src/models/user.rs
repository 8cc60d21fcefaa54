//! Modelo de User
//!
//! Usuarios del sistema: conductores y administradores. El id es un string
//! generado como `user-<millis>` para mantener compatibilidad con los datos
//! importados del sistema anterior.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use validator::Validate;

/// Rol del usuario - almacenado como TEXT en la tabla users
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::User => "USER",
        }
    }
}

/// User principal - mapea a la tabla users
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub thai_name: Option<String>,
    pub eng_name: Option<String>,
    pub email: Option<String>,
    pub employee_id: Option<String>,
    pub section: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Nombre para mostrar: nombre en inglés, o el username como fallback
    pub fn display_name(&self) -> &str {
        self.eng_name.as_deref().unwrap_or(&self.username)
    }
}

/// Response de usuario para la API - nunca expone el hash de contraseña
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    pub thai_name: Option<String>,
    pub eng_name: Option<String>,
    pub email: Option<String>,
    pub employee_id: Option<String>,
    pub section: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            thai_name: user.thai_name,
            eng_name: user.eng_name,
            email: user.email,
            employee_id: user.employee_id,
            section: user.section,
            image_url: user.image_url,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Request para crear un usuario (admin)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,

    #[validate(length(min = 1, max = 100))]
    pub password: String,

    #[serde(default)]
    pub role: UserRole,

    pub thai_name: Option<String>,
    pub eng_name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    pub employee_id: Option<String>,
    pub section: Option<String>,
    pub image_url: Option<String>,
}

/// Request para actualizar un usuario existente (admin)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub id: String,

    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub password: Option<String>,

    pub role: Option<UserRole>,
    pub thai_name: Option<String>,
    pub eng_name: Option<String>,
    pub email: Option<String>,
    pub employee_id: Option<String>,
    pub section: Option<String>,
    pub image_url: Option<String>,
}

/// Filtros para búsqueda de usuarios
#[derive(Debug, Default, Deserialize)]
pub struct UserFilters {
    pub search: Option<String>,
    pub role: Option<String>,
}
