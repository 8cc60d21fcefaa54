//! Repositorio de vehículos

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::vehicle::{Vehicle, VehicleFilters};
use crate::utils::errors::AppError;

pub struct VehicleRepository {
    pool: SqlitePool,
}

impl VehicleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    /// Listado con filtro de estado y búsqueda por substring sobre placa,
    /// marca, modelo y sección, ordenado por placa.
    pub async fn list(&self, filters: &VehicleFilters) -> Result<Vec<Vehicle>, AppError> {
        let status = filters
            .status
            .as_deref()
            .filter(|s| !s.is_empty() && *s != "ALL");
        let pattern = filters
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE (?1 IS NULL OR status = ?1)
            AND (?2 IS NULL OR license_plate LIKE ?2 OR brand LIKE ?2 OR model LIKE ?2 OR section LIKE ?2)
            ORDER BY license_plate ASC
            "#,
        )
        .bind(status)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        license_plate: &str,
        brand: &str,
        model: &str,
        vehicle_type: &str,
        status: &str,
        current_odometer: i64,
        section: Option<&str>,
        user_id: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Vehicle, AppError> {
        let now = Utc::now();
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (license_plate, brand, model, vehicle_type, status, current_odometer, section, user_id, image_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(license_plate)
        .bind(brand)
        .bind(model)
        .bind(vehicle_type)
        .bind(status)
        .bind(current_odometer)
        .bind(section)
        .bind(user_id)
        .bind(image_url)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Sobreescritura completa; el caller resuelve los campos no cambiados
    pub async fn update(&self, vehicle: &Vehicle) -> Result<Vehicle, AppError> {
        let updated = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET license_plate = ?2, brand = ?3, model = ?4, vehicle_type = ?5,
                status = ?6, current_odometer = ?7, section = ?8, user_id = ?9,
                image_url = ?10, updated_at = ?11
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.license_plate)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(&vehicle.vehicle_type)
        .bind(&vehicle.status)
        .bind(vehicle.current_odometer)
        .bind(&vehicle.section)
        .bind(&vehicle.user_id)
        .bind(&vehicle.image_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
