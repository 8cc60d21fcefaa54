//! Modelo de FuelLog
//!
//! Registros de compra de combustible atados a un viaje. Los litros y el
//! precio son decimales de punto fijo: se persisten como TEXT en SQLite y se
//! suman con `rust_decimal`, nunca como flotantes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use validator::Validate;

/// FuelLog principal - mapea a la tabla fuel_logs
#[derive(Debug, Clone)]
pub struct FuelLog {
    pub id: i64,
    pub trip_id: i64,
    pub odometer: i64,
    pub liter: Decimal,
    pub price: Decimal,
    pub station: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

// SQLite no tiene tipo decimal: liter y price viajan como TEXT y se
// convierten aquí, en un solo lugar.
impl FromRow<'_, SqliteRow> for FuelLog {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let liter: String = row.try_get("liter")?;
        let price: String = row.try_get("price")?;
        Ok(Self {
            id: row.try_get("id")?,
            trip_id: row.try_get("trip_id")?,
            odometer: row.try_get("odometer")?,
            liter: liter.parse::<Decimal>().unwrap_or_default(),
            price: price.parse::<Decimal>().unwrap_or_default(),
            station: row.try_get("station")?,
            location: row.try_get("location")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Totales decimales de combustible de un viaje
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuelTotals {
    pub liters: Decimal,
    pub price: Decimal,
}

impl FuelTotals {
    /// Sumar los logs de un viaje con aritmética decimal
    pub fn from_logs(logs: &[FuelLog]) -> Self {
        logs.iter().fold(Self::default(), |acc, log| Self {
            liters: acc.liters + log.liter,
            price: acc.price + log.price,
        })
    }
}

/// Response de fuel log para la API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelLogResponse {
    pub id: i64,
    pub trip_id: i64,
    pub odometer: i64,
    pub liter: Decimal,
    pub price: Decimal,
    pub station: Option<String>,
    pub location: Option<String>,
    pub created_at: String,
}

impl From<FuelLog> for FuelLogResponse {
    fn from(log: FuelLog) -> Self {
        Self {
            id: log.id,
            trip_id: log.trip_id,
            odometer: log.odometer,
            liter: log.liter,
            price: log.price,
            station: log.station,
            location: log.location,
            created_at: log.created_at.to_rfc3339(),
        }
    }
}

/// Request para registrar una carga de combustible
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFuelLogRequest {
    #[validate(range(min = 1))]
    pub trip_id: i64,

    #[validate(range(min = 0))]
    pub odometer: i64,

    pub liter: Decimal,
    pub price: Decimal,

    pub station: Option<String>,
    pub location: Option<String>,
}

/// Request para sobreescribir un fuel log existente
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFuelLogRequest {
    #[validate(range(min = 0))]
    pub odometer: i64,

    pub liter: Decimal,
    pub price: Decimal,

    pub station: Option<String>,
}
