//! Repositorio de viajes

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::trip::Trip;
use crate::utils::errors::AppError;

/// Filtro del listado de viajes (admin)
///
/// El filtro de sección matchea la sección del vehículo o la del conductor.
#[derive(Debug, Clone, Default)]
pub struct TripListFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub section: Option<String>,
    pub vehicle_id: Option<i64>,
}

pub struct TripRepository {
    pool: SqlitePool,
}

impl TripRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(trip)
    }

    /// Página del listado, más recientes primero. `limit = -1` trae todo
    /// (rama de export, que ignora la paginación).
    pub async fn list(
        &self,
        filter: &TripListFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Trip>, AppError> {
        let trips = sqlx::query_as::<_, Trip>(
            r#"
            SELECT t.* FROM trips t
            JOIN vehicles v ON v.id = t.vehicle_id
            LEFT JOIN users u ON u.id = t.driver_id
            WHERE (?1 IS NULL OR t.departure_date >= ?1)
            AND (?2 IS NULL OR t.departure_date <= ?2)
            AND (?3 IS NULL OR v.section = ?3 OR u.section = ?3)
            AND (?4 IS NULL OR t.vehicle_id = ?4)
            ORDER BY t.id DESC
            LIMIT ?5 OFFSET ?6
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(&filter.section)
        .bind(filter.vehicle_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    pub async fn count(&self, filter: &TripListFilter) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM trips t
            JOIN vehicles v ON v.id = t.vehicle_id
            LEFT JOIN users u ON u.id = t.driver_id
            WHERE (?1 IS NULL OR t.departure_date >= ?1)
            AND (?2 IS NULL OR t.departure_date <= ?2)
            AND (?3 IS NULL OR v.section = ?3 OR u.section = ?3)
            AND (?4 IS NULL OR t.vehicle_id = ?4)
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(&filter.section)
        .bind(filter.vehicle_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
