//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, el enum de estado con su tabla de
//! alias y las variantes para CRUD operations.
//!
//! El sistema anterior guardaba el estado como texto libre con valores
//! heredados en tailandés ("ใช้งาน", "เลิกใช้งาน") y "Stand By". Aquí el
//! estado es un enum cerrado y la normalización de alias ocurre una sola vez
//! en el borde, nunca con comparaciones de strings repartidas por el motor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Estado del vehículo - enum cerrado con tabla de alias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Available,
    InUse,
    Maintenance,
    Decommissioned,
}

impl VehicleStatus {
    /// Normalizar un estado crudo de la base de datos o de un request.
    ///
    /// Alias heredados: "ใช้งาน" y "Stand By" cuentan como disponible,
    /// "เลิกใช้งาน" significa dado de baja.
    pub fn normalize(raw: &str) -> Option<VehicleStatus> {
        match raw.trim() {
            "AVAILABLE" | "ใช้งาน" | "Stand By" => Some(VehicleStatus::Available),
            "IN_USE" => Some(VehicleStatus::InUse),
            "MAINTENANCE" => Some(VehicleStatus::Maintenance),
            "เลิกใช้งาน" | "DECOMMISSIONED" => Some(VehicleStatus::Decommissioned),
            _ => None,
        }
    }

    /// Forma canónica que se persiste cuando el motor escribe el estado
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "AVAILABLE",
            VehicleStatus::InUse => "IN_USE",
            VehicleStatus::Maintenance => "MAINTENANCE",
            VehicleStatus::Decommissioned => "DECOMMISSIONED",
        }
    }

    /// Un vehículo solo puede iniciar un viaje si su estado normaliza a
    /// disponible. Cualquier string desconocido cuenta como no disponible.
    pub fn can_start_trip(raw: &str) -> bool {
        Self::normalize(raw) == Some(VehicleStatus::Available)
    }
}

/// Vehicle principal - mapea a la tabla vehicles
///
/// `status` se conserva como string crudo: los datos importados contienen
/// alias heredados que no se reescriben hasta que el motor toca la fila.
#[derive(Debug, Clone, FromRow)]
pub struct Vehicle {
    pub id: i64,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub vehicle_type: String,
    pub status: String,
    pub current_odometer: i64,
    pub section: Option<String>,
    pub user_id: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Response de vehículo para la API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleResponse {
    pub id: i64,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub status: String,
    pub current_odometer: i64,
    pub section: Option<String>,
    pub user_id: Option<String>,
    pub image_url: Option<String>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            license_plate: vehicle.license_plate,
            brand: vehicle.brand,
            model: vehicle.model,
            vehicle_type: vehicle.vehicle_type,
            status: vehicle.status,
            current_odometer: vehicle.current_odometer,
            section: vehicle.section,
            user_id: vehicle.user_id,
            image_url: vehicle.image_url,
        }
    }
}

/// Request para registrar un vehículo nuevo
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 20))]
    pub license_plate: String,

    pub brand: Option<String>,
    pub model: Option<String>,

    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,

    pub status: Option<String>,

    #[validate(range(min = 0))]
    #[serde(default)]
    pub current_odometer: i64,

    pub section: Option<String>,
    pub image_url: Option<String>,
}

/// Request para actualizar un vehículo existente (admin)
///
/// El override de estado/odómetro por admin salta el motor de viajes a
/// propósito: es la vía de escape documentada para corrección de datos.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    pub id: i64,

    #[validate(length(min = 1, max = 20))]
    pub license_plate: Option<String>,

    pub brand: Option<String>,
    pub model: Option<String>,

    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,

    pub status: Option<String>,

    #[validate(range(min = 0))]
    pub current_odometer: Option<i64>,

    pub section: Option<String>,
    pub user_id: Option<String>,
    pub image_url: Option<String>,
}

/// Filtros para búsqueda de vehículos
#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilters {
    pub search: Option<String>,
    pub status: Option<String>,
}
