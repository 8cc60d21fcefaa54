//! Repositorio de usuarios

use sqlx::SqlitePool;

use crate::models::user::{User, UserFilters};
use crate::utils::errors::AppError;

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Listado con filtro de rol y búsqueda por substring sobre username y
    /// nombres para mostrar, ordenado por username.
    pub async fn list(&self, filters: &UserFilters) -> Result<Vec<User>, AppError> {
        let role = filters
            .role
            .as_deref()
            .filter(|r| !r.is_empty() && *r != "ALL");
        let pattern = filters
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE (?1 IS NULL OR role = ?1)
            AND (?2 IS NULL OR username LIKE ?2 OR thai_name LIKE ?2 OR eng_name LIKE ?2)
            ORDER BY username ASC
            "#,
        )
        .bind(role)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn create(&self, user: &User) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, role, thai_name, eng_name, email, employee_id, section, image_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.thai_name)
        .bind(&user.eng_name)
        .bind(&user.email)
        .bind(&user.employee_id)
        .bind(&user.section)
        .bind(&user.image_url)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Sobreescritura completa de la fila; el caller resuelve los campos
    /// que no cambian a partir del valor actual.
    pub async fn update(&self, user: &User) -> Result<User, AppError> {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = ?2, password_hash = ?3, role = ?4, thai_name = ?5,
                eng_name = ?6, email = ?7, employee_id = ?8, section = ?9, image_url = ?10
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.thai_name)
        .bind(&user.eng_name)
        .bind(&user.email)
        .bind(&user.employee_id)
        .bind(&user.section)
        .bind(&user.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
