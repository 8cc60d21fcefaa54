//! Controller de usuarios (admin)
//!
//! Las contraseñas entran en claro por la API y se persisten siempre como
//! hash bcrypt. El hash nunca sale en ninguna response.

use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::models::user::{
    CreateUserRequest, UpdateUserRequest, User, UserFilters, UserResponse,
};
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::{
    conflict_error, is_unique_violation, not_found_error, AppError, AppResult,
};

pub struct UserController {
    repository: UserRepository,
}

impl UserController {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repository: UserRepository::new(pool),
        }
    }

    pub async fn list_users(&self, filters: &UserFilters) -> AppResult<Vec<UserResponse>> {
        let users = self.repository.list(filters).await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<UserResponse> {
        request.validate()?;

        let password_hash = hash_password(&request.password)?;
        // Ids con el formato del sistema anterior, para convivir con los
        // datos importados
        let id = format!("user-{}", Utc::now().timestamp_millis());

        let user = User {
            id,
            username: request.username.clone(),
            password_hash,
            role: request.role,
            thai_name: request.thai_name,
            eng_name: request.eng_name,
            email: request.email,
            employee_id: request.employee_id,
            section: request.section,
            image_url: request.image_url,
            created_at: Utc::now(),
        };

        match self.repository.create(&user).await {
            Ok(created) => Ok(created.into()),
            Err(AppError::Database(e)) if is_unique_violation(&e) => {
                Err(conflict_error("User", "username", &request.username))
            }
            Err(e) => Err(e),
        }
    }

    /// Edición de admin: merge campo a campo; la contraseña solo se rehashea
    /// si el request trae una nueva.
    pub async fn update_user(&self, request: UpdateUserRequest) -> AppResult<UserResponse> {
        request.validate()?;

        let existing = self
            .repository
            .find_by_id(&request.id)
            .await?
            .ok_or_else(|| not_found_error("User", &request.id))?;

        let password_hash = match request.password.as_deref() {
            Some(password) if !password.is_empty() => hash_password(password)?,
            _ => existing.password_hash,
        };

        let username = request.username.unwrap_or(existing.username);
        let merged = User {
            id: existing.id,
            username: username.clone(),
            password_hash,
            role: request.role.unwrap_or(existing.role),
            thai_name: request.thai_name.or(existing.thai_name),
            eng_name: request.eng_name.or(existing.eng_name),
            email: request.email.or(existing.email),
            employee_id: request.employee_id.or(existing.employee_id),
            section: request.section.or(existing.section),
            image_url: request.image_url.or(existing.image_url),
            created_at: existing.created_at,
        };

        match self.repository.update(&merged).await {
            Ok(updated) => Ok(updated.into()),
            Err(AppError::Database(e)) if is_unique_violation(&e) => {
                Err(conflict_error("User", "username", &username))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delete_user(&self, id: &str) -> AppResult<()> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(not_found_error("User", id))
        }
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}
