//! Agregador de estadísticas de flota
//!
//! Todas las métricas comparten el mismo filtro (rango de fechas + sección
//! del vehículo) y se calculan en paralelo con `try_join!`. La serie de
//! tendencia se bucketiza en Rust a partir de las fechas de salida: diaria
//! cuando el rango pedido es menor a 60 días, mensual en el resto.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::controllers::trip_controller::load_details;
use crate::models::analytics::{NameCount, StatsResponse, StatusCount, TrendPoint, TripFilter};
use crate::models::trip::Trip;
use crate::utils::csv;
use crate::utils::errors::AppResult;

const ANALYTICS_EXPORT_HEADER: [&str; 12] = [
    "Trip ID",
    "Vehicle License",
    "Section",
    "Driver",
    "Departure Date",
    "Return Date",
    "Origin",
    "Destination",
    "Total Distance (km)",
    "Fuel Liters",
    "Fuel Cost",
    "Status",
];

pub struct AnalyticsController {
    pool: SqlitePool,
}

impl AnalyticsController {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Métricas agregadas del dashboard
    pub async fn stats(&self, filter: &TripFilter) -> AppResult<StatsResponse> {
        let (
            total_trips,
            top_vehicles,
            status_distribution,
            section_distribution,
            departure_dates,
            total_distance,
            total_liters,
        ) = tokio::try_join!(
            self.total_trips(filter),
            self.top_vehicles(filter),
            self.status_distribution(filter),
            self.section_distribution(filter),
            self.departure_dates(filter),
            self.total_distance(filter),
            self.total_liters(filter),
        )?;

        let trend_data = bucket_trend(&departure_dates, filter.is_short_range());

        // Tasa de consumo en km por litro, decimal exacta. Sin combustible
        // registrado la tasa se reporta como "0.00", nunca como división
        // por cero.
        let oil_consumption_rate = if total_liters > Decimal::ZERO {
            csv::format_fixed(Decimal::from(total_distance) / total_liters, 2)
        } else {
            "0.00".to_string()
        };

        Ok(StatsResponse {
            total_trips,
            top_vehicles,
            status_distribution,
            section_distribution,
            trend_data,
            total_distance,
            oil_consumption_rate,
        })
    }

    /// Export CSV del detalle de viajes bajo el mismo filtro, más recientes
    /// primero
    pub async fn export_csv(&self, filter: &TripFilter) -> AppResult<(String, String)> {
        let trips = sqlx::query_as::<_, Trip>(
            r#"
            SELECT t.* FROM trips t
            JOIN vehicles v ON v.id = t.vehicle_id
            WHERE (?1 IS NULL OR t.departure_date >= ?1)
            AND (?2 IS NULL OR t.departure_date <= ?2)
            AND (?3 IS NULL OR v.section = ?3)
            ORDER BY t.departure_date DESC
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(&filter.section)
        .fetch_all(&self.pool)
        .await?;

        let details = load_details(&self.pool, trips).await?;

        let rows = details
            .iter()
            .map(|detail| {
                let liters: Decimal = detail.fuel_logs.iter().map(|l| l.liter).sum();
                let cost: Decimal = detail.fuel_logs.iter().map(|l| l.price).sum();
                let driver = detail
                    .driver
                    .as_ref()
                    .map(|d| d.username.clone())
                    .or_else(|| detail.trip.driver_id.clone())
                    .unwrap_or_else(|| "-".to_string());
                let section = detail
                    .vehicle
                    .section
                    .clone()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "-".to_string());

                [
                    detail.trip.id.to_string(),
                    csv::csv_escape(&detail.vehicle.license_plate),
                    csv::csv_escape(&section),
                    csv::csv_escape(&driver),
                    date_only(&detail.trip.departure_date),
                    detail
                        .trip
                        .return_date
                        .as_deref()
                        .map(date_only)
                        .unwrap_or_else(|| "-".to_string()),
                    csv::csv_escape(&detail.trip.origin),
                    csv::csv_escape(&detail.trip.destination),
                    detail.trip.total_distance.unwrap_or(0).to_string(),
                    csv::format_fixed(liters, 2),
                    csv::format_fixed(cost, 2),
                    detail.trip.status.as_str().to_string(),
                ]
                .join(",")
            })
            .collect();

        let content = csv::build_document(&ANALYTICS_EXPORT_HEADER, rows);
        let filename = format!("analytics_export_{}.csv", Utc::now().format("%Y-%m-%d"));
        Ok((filename, content))
    }

    /// Secciones distintas no vacías de vehículos y usuarios, ordenadas.
    /// Alimenta el selector de filtros del dashboard.
    pub async fn sections(&self) -> AppResult<Vec<String>> {
        let mut sections = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT section FROM vehicles WHERE section IS NOT NULL AND section != ''
            UNION
            SELECT DISTINCT section FROM users WHERE section IS NOT NULL AND section != ''
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        sections.sort();
        Ok(sections)
    }

    async fn total_trips(&self, filter: &TripFilter) -> AppResult<i64> {
        let total = sqlx::query_scalar::<_, i64>(&with_filter("SELECT COUNT(*)", ""))
            .bind(filter.start)
            .bind(filter.end)
            .bind(&filter.section)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Top 10 vehículos por cantidad de viajes. La placa puede faltar en
    /// datos importados; en ese caso el nombre cae a "Vehicle #<id>".
    async fn top_vehicles(&self, filter: &TripFilter) -> AppResult<Vec<NameCount>> {
        let rows = sqlx::query_as::<_, (String, i64)>(&with_filter(
            "SELECT COALESCE(v.license_plate, 'Vehicle #' || t.vehicle_id), COUNT(*) AS cnt",
            "GROUP BY t.vehicle_id ORDER BY cnt DESC LIMIT 10",
        ))
        .bind(filter.start)
        .bind(filter.end)
        .bind(&filter.section)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, count)| NameCount { name, count })
            .collect())
    }

    async fn status_distribution(&self, filter: &TripFilter) -> AppResult<Vec<StatusCount>> {
        let rows = sqlx::query_as::<_, (String, i64)>(&with_filter(
            "SELECT t.status, COUNT(*) AS cnt",
            "GROUP BY t.status ORDER BY cnt DESC",
        ))
        .bind(filter.start)
        .bind(filter.end)
        .bind(&filter.section)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    /// Top 5 secciones; los vehículos sin sección se agrupan como "Unknown"
    async fn section_distribution(&self, filter: &TripFilter) -> AppResult<Vec<NameCount>> {
        let rows = sqlx::query_as::<_, (String, i64)>(&with_filter(
            "SELECT COALESCE(NULLIF(v.section, ''), 'Unknown'), COUNT(*) AS cnt",
            "GROUP BY COALESCE(NULLIF(v.section, ''), 'Unknown') ORDER BY cnt DESC LIMIT 5",
        ))
        .bind(filter.start)
        .bind(filter.end)
        .bind(&filter.section)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, count)| NameCount { name, count })
            .collect())
    }

    async fn departure_dates(&self, filter: &TripFilter) -> AppResult<Vec<DateTime<Utc>>> {
        let dates = sqlx::query_scalar::<_, DateTime<Utc>>(&with_filter(
            "SELECT t.departure_date",
            "ORDER BY t.departure_date ASC",
        ))
        .bind(filter.start)
        .bind(filter.end)
        .bind(&filter.section)
        .fetch_all(&self.pool)
        .await?;
        Ok(dates)
    }

    async fn total_distance(&self, filter: &TripFilter) -> AppResult<i64> {
        let total = sqlx::query_scalar::<_, i64>(&with_filter(
            "SELECT COALESCE(SUM(COALESCE(t.total_distance, 0)), 0)",
            "",
        ))
        .bind(filter.start)
        .bind(filter.end)
        .bind(&filter.section)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Litros totales sumados como decimal; la columna es TEXT así que la
    /// suma no puede delegarse a SQLite sin pasar por flotantes.
    async fn total_liters(&self, filter: &TripFilter) -> AppResult<Decimal> {
        let liters = sqlx::query_scalar::<_, String>(
            r#"
            SELECT f.liter FROM fuel_logs f
            JOIN trips t ON t.id = f.trip_id
            JOIN vehicles v ON v.id = t.vehicle_id
            WHERE (?1 IS NULL OR t.departure_date >= ?1)
            AND (?2 IS NULL OR t.departure_date <= ?2)
            AND (?3 IS NULL OR v.section = ?3)
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(&filter.section)
        .fetch_all(&self.pool)
        .await?;

        Ok(liters
            .iter()
            .map(|l| l.parse::<Decimal>().unwrap_or_default())
            .sum())
    }
}

fn with_filter(select: &str, tail: &str) -> String {
    format!(
        r#"
        {} FROM trips t
        JOIN vehicles v ON v.id = t.vehicle_id
        WHERE (?1 IS NULL OR t.departure_date >= ?1)
        AND (?2 IS NULL OR t.departure_date <= ?2)
        AND (?3 IS NULL OR v.section = ?3)
        {}
        "#,
        select, tail
    )
}

/// Serie de tendencia, orden cronológico por la clave del bucket
fn bucket_trend(dates: &[DateTime<Utc>], daily: bool) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<String, i64> = BTreeMap::new();
    for date in dates {
        let key = if daily {
            date.format("%Y-%m-%d").to_string()
        } else {
            date.format("%Y-%m").to_string()
        };
        *buckets.entry(key).or_default() += 1;
    }

    buckets
        .into_iter()
        .map(|(date, count)| TrendPoint { date, count })
        .collect()
}

fn date_only(rfc3339: &str) -> String {
    rfc3339.get(..10).unwrap_or(rfc3339).to_string()
}
