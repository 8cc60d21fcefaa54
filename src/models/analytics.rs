//! Modelos de Analytics
//!
//! Tipos del agregador de estadísticas de flota y su filtro común.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::errors::{AppError, AppResult};

/// Query params compartidos por /stats y /analytics/export
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub section: Option<String>,
}

/// Filtro resuelto sobre el conjunto de viajes.
///
/// `end` se interpreta como fin de día (23:59:59.999) y el valor de sección
/// "all" equivale a sin filtro.
#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub section: Option<String>,
}

impl TripFilter {
    pub fn from_query(query: &AnalyticsQuery) -> AppResult<Self> {
        Self::build(query.start.as_deref(), query.end.as_deref(), query.section.as_deref())
    }

    pub fn build(
        start: Option<&str>,
        end: Option<&str>,
        section: Option<&str>,
    ) -> AppResult<Self> {
        let start = start.map(parse_start_of_day).transpose()?;
        let end = end.map(parse_end_of_day).transpose()?;
        let section = section
            .filter(|s| !s.is_empty() && *s != "all")
            .map(str::to_string);
        Ok(Self { start, end, section })
    }

    /// Buckets diarios cuando ambos límites existen y el rango es menor a
    /// 60 días; mensuales en cualquier otro caso.
    pub fn is_short_range(&self) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end - start < Duration::days(60),
            _ => false,
        }
    }
}

fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", value)))
}

fn parse_start_of_day(value: &str) -> AppResult<DateTime<Utc>> {
    let date = parse_date(value)?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

fn parse_end_of_day(value: &str) -> AppResult<DateTime<Utc>> {
    let date = parse_date(value)?;
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    Ok(Utc.from_utc_datetime(&date.and_time(end_of_day)))
}

/// Par nombre/conteo (top vehicles, distribución por sección)
#[derive(Debug, Serialize, PartialEq)]
pub struct NameCount {
    pub name: String,
    pub count: i64,
}

/// Conteo por estado de viaje
#[derive(Debug, Serialize, PartialEq)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Punto de la serie de tendencia: clave `YYYY-MM-DD` o `YYYY-MM`
#[derive(Debug, Serialize, PartialEq)]
pub struct TrendPoint {
    pub date: String,
    pub count: i64,
}

/// Response del endpoint de estadísticas
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_trips: i64,
    pub top_vehicles: Vec<NameCount>,
    pub status_distribution: Vec<StatusCount>,
    pub section_distribution: Vec<NameCount>,
    pub trend_data: Vec<TrendPoint>,
    pub total_distance: i64,
    pub oil_consumption_rate: String,
}
