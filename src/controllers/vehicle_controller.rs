//! Controller de vehículos
//!
//! CRUD de la flota. Las escrituras que pasan por aquí persisten el estado
//! en su forma canónica; los alias heredados solo sobreviven en filas que el
//! sistema todavía no tocó.

use sqlx::SqlitePool;
use validator::Validate;

use crate::models::vehicle::{
    CreateVehicleRequest, UpdateVehicleRequest, Vehicle, VehicleFilters, VehicleResponse,
    VehicleStatus,
};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{
    conflict_error, is_foreign_key_violation, is_unique_violation, not_found_error, AppError,
    AppResult,
};

pub struct VehicleController {
    repository: VehicleRepository,
}

impl VehicleController {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repository: VehicleRepository::new(pool),
        }
    }

    pub async fn list_vehicles(&self, filters: &VehicleFilters) -> AppResult<Vec<VehicleResponse>> {
        let vehicles = self.repository.list(filters).await?;
        Ok(vehicles.into_iter().map(Into::into).collect())
    }

    pub async fn create_vehicle(
        &self,
        request: CreateVehicleRequest,
    ) -> AppResult<VehicleResponse> {
        request.validate()?;

        let status = resolve_status(request.status.as_deref())?
            .unwrap_or(VehicleStatus::Available);

        let result = self
            .repository
            .create(
                &request.license_plate,
                request.brand.as_deref().unwrap_or(""),
                request.model.as_deref().unwrap_or(""),
                request.vehicle_type.as_deref().unwrap_or(""),
                status.as_str(),
                request.current_odometer,
                request.section.as_deref(),
                None,
                request.image_url.as_deref(),
            )
            .await;

        match result {
            Ok(vehicle) => Ok(vehicle.into()),
            Err(AppError::Database(e)) if is_unique_violation(&e) => Err(conflict_error(
                "Vehicle",
                "license plate",
                &request.license_plate,
            )),
            Err(e) => Err(e),
        }
    }

    /// Edición de admin: merge campo a campo sobre la fila existente.
    ///
    /// El override de estado/odómetro salta el motor de viajes a propósito;
    /// es la vía de corrección de datos.
    pub async fn update_vehicle(
        &self,
        request: UpdateVehicleRequest,
    ) -> AppResult<VehicleResponse> {
        request.validate()?;

        let existing = self
            .repository
            .find_by_id(request.id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", request.id))?;

        let status = match resolve_status(request.status.as_deref())? {
            Some(status) => status.as_str().to_string(),
            None => existing.status.clone(),
        };

        let merged = Vehicle {
            id: existing.id,
            license_plate: request.license_plate.unwrap_or(existing.license_plate),
            brand: request.brand.unwrap_or(existing.brand),
            model: request.model.unwrap_or(existing.model),
            vehicle_type: request.vehicle_type.unwrap_or(existing.vehicle_type),
            status,
            current_odometer: request.current_odometer.unwrap_or(existing.current_odometer),
            section: request.section.or(existing.section),
            user_id: request.user_id.or(existing.user_id),
            image_url: request.image_url.or(existing.image_url),
            created_at: existing.created_at,
            updated_at: existing.updated_at,
        };

        let result = self.repository.update(&merged).await;
        match result {
            Ok(vehicle) => Ok(vehicle.into()),
            Err(AppError::Database(e)) if is_unique_violation(&e) => Err(conflict_error(
                "Vehicle",
                "license plate",
                &merged.license_plate,
            )),
            Err(e) => Err(e),
        }
    }

    /// Baja de un vehículo. Con viajes registrados la FK lo impide y el
    /// error sale como 409, no como error de base de datos.
    pub async fn delete_vehicle(&self, id: i64) -> AppResult<()> {
        match self.repository.delete(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(not_found_error("Vehicle", id)),
            Err(AppError::Database(e)) if is_foreign_key_violation(&e) => {
                Err(AppError::Conflict(format!(
                    "Vehicle {} has trips and cannot be deleted",
                    id
                )))
            }
            Err(e) => Err(e),
        }
    }
}

/// Un estado entrante debe normalizar al enum cerrado; cualquier otro string
/// se rechaza en el borde.
fn resolve_status(raw: Option<&str>) -> AppResult<Option<VehicleStatus>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => VehicleStatus::normalize(value)
            .map(Some)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Unknown vehicle status '{}' (expected AVAILABLE, IN_USE, MAINTENANCE or DECOMMISSIONED)",
                    value
                ))
            }),
    }
}
