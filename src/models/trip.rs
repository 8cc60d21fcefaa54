//! Modelo de Trip
//!
//! Un viaje pertenece a exactamente un vehículo y opcionalmente a un
//! conductor. `total_distance` es un campo denormalizado que mantiene el
//! motor de viajes: siempre vale `mileage_end - mileage_start` y el cálculo
//! vive en un solo sitio (`Trip::compute_distance`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use validator::Validate;

use super::fuel_log::FuelLogResponse;
use super::user::UserResponse;
use super::vehicle::VehicleResponse;

/// Estado del viaje - almacenado como TEXT en la tabla trips
///
/// CANCELLED es un valor legal (los formularios de admin lo aceptan) aunque
/// el motor nunca lo produce por sí mismo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TripStatus {
    Ongoing,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Ongoing => "ONGOING",
            TripStatus::Completed => "COMPLETED",
            TripStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Trip principal - mapea a la tabla trips
#[derive(Debug, Clone, FromRow)]
pub struct Trip {
    pub id: i64,
    pub vehicle_id: i64,
    pub driver_id: Option<String>,
    pub departure_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub origin: String,
    pub destination: String,
    pub description: Option<String>,
    pub mileage_start: i64,
    pub mileage_end: Option<i64>,
    pub total_distance: Option<i64>,
    pub status: TripStatus,
}

impl Trip {
    /// Única fuente del invariante `total_distance = mileage_end - mileage_start`
    pub fn compute_distance(mileage_start: i64, mileage_end: Option<i64>) -> Option<i64> {
        mileage_end.map(|end| end - mileage_start)
    }
}

/// Response de viaje para la API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripResponse {
    pub id: i64,
    pub vehicle_id: i64,
    pub driver_id: Option<String>,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub origin: String,
    pub destination: String,
    pub description: Option<String>,
    pub mileage_start: i64,
    pub mileage_end: Option<i64>,
    pub total_distance: Option<i64>,
    pub status: TripStatus,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id,
            vehicle_id: trip.vehicle_id,
            driver_id: trip.driver_id,
            departure_date: trip.departure_date.to_rfc3339(),
            return_date: trip.return_date.map(|d| d.to_rfc3339()),
            origin: trip.origin,
            destination: trip.destination,
            description: trip.description,
            mileage_start: trip.mileage_start,
            mileage_end: trip.mileage_end,
            total_distance: trip.total_distance,
            status: trip.status,
        }
    }
}

/// Viaje con sus relaciones resueltas (vehículo, conductor, fuel logs)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripWithDetails {
    #[serde(flatten)]
    pub trip: TripResponse,
    pub vehicle: VehicleResponse,
    pub driver: Option<UserResponse>,
    pub fuel_logs: Vec<FuelLogResponse>,
}

/// Request para iniciar un viaje
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartTripRequest {
    #[validate(range(min = 1))]
    pub vehicle_id: i64,

    #[validate(length(min = 1, message = "Origin is required"))]
    pub origin: String,

    #[validate(length(min = 1, message = "Destination is required"))]
    pub destination: String,

    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub mileage_start: i64,
}

/// Request para finalizar un viaje
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EndTripRequest {
    #[validate(range(min = 1))]
    pub trip_id: i64,

    #[validate(range(min = 0))]
    pub mileage_end: i64,
}

/// Fuel log embebido en el registro de un viaje pasado
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PastTripFuelLog {
    #[validate(range(min = 0))]
    pub odometer: i64,

    pub liter: rust_decimal::Decimal,
    pub price: rust_decimal::Decimal,

    pub station: Option<String>,
    pub location: Option<String>,
}

/// Request para registrar un viaje que ya ocurrió
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordPastTripRequest {
    #[validate(range(min = 1))]
    pub vehicle_id: i64,

    #[validate(length(min = 1, message = "Origin is required"))]
    pub origin: String,

    #[validate(length(min = 1, message = "Destination is required"))]
    pub destination: String,

    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub mileage_start: i64,

    #[validate(range(min = 0))]
    pub mileage_end: i64,

    pub departure_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,

    #[serde(default)]
    #[validate]
    pub fuel_logs: Vec<PastTripFuelLog>,
}

/// Request de inserción directa de un viaje (admin)
///
/// No toca el estado del vehículo: es carga de datos, no un evento del motor.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreateTripRequest {
    #[validate(range(min = 1))]
    pub vehicle_id: i64,

    pub driver_id: Option<String>,
    pub departure_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,

    #[validate(length(min = 1))]
    pub origin: String,

    #[validate(length(min = 1))]
    pub destination: String,

    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub mileage_start: i64,

    pub mileage_end: Option<i64>,
    pub status: Option<TripStatus>,
}

/// Request de edición de un viaje (admin)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateTripRequest {
    #[validate(range(min = 1))]
    pub id: i64,

    #[validate(length(min = 1))]
    pub origin: String,

    #[validate(length(min = 1))]
    pub destination: String,

    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub mileage_start: i64,

    pub mileage_end: Option<i64>,
}

/// Query params del listado/export de viajes (admin)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub section: Option<String>,
    pub vehicle_id: Option<i64>,
    pub export: Option<String>,
}

/// Metadatos de paginación
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// Página de viajes con relaciones
#[derive(Debug, Serialize)]
pub struct TripPage {
    pub data: Vec<TripWithDetails>,
    pub meta: PageMeta,
}
