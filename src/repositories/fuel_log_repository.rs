//! Repositorio de fuel logs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::models::fuel_log::FuelLog;
use crate::utils::errors::AppError;

pub struct FuelLogRepository {
    pool: SqlitePool,
}

impl FuelLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<FuelLog>, AppError> {
        let log = sqlx::query_as::<_, FuelLog>("SELECT * FROM fuel_logs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(log)
    }

    pub async fn create(
        &self,
        trip_id: i64,
        odometer: i64,
        liter: Decimal,
        price: Decimal,
        station: Option<&str>,
        location: Option<&str>,
    ) -> Result<FuelLog, AppError> {
        let log = sqlx::query_as::<_, FuelLog>(
            r#"
            INSERT INTO fuel_logs (trip_id, odometer, liter, price, station, location, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(trip_id)
        .bind(odometer)
        .bind(liter.to_string())
        .bind(price.to_string())
        .bind(station)
        .bind(location)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    /// Sobreescritura completa de los cuatro campos editables
    pub async fn update(
        &self,
        id: i64,
        odometer: i64,
        liter: Decimal,
        price: Decimal,
        station: Option<&str>,
    ) -> Result<Option<FuelLog>, AppError> {
        let log = sqlx::query_as::<_, FuelLog>(
            r#"
            UPDATE fuel_logs
            SET odometer = ?2, liter = ?3, price = ?4, station = ?5
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(odometer)
        .bind(liter.to_string())
        .bind(price.to_string())
        .bind(station)
        .fetch_optional(&self.pool)
        .await?;

        Ok(log)
    }

    /// Borrado idempotente: borrar un log que ya no existe cuenta como éxito.
    /// Tolera el doble submit del diálogo de confirmación.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM fuel_logs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
