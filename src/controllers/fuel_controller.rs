//! Ledger de combustible
//!
//! Altas, ediciones y bajas de cargas de combustible, siempre colgadas de un
//! viaje existente. Las cantidades son decimales de punto fijo de punta a
//! punta; aquí no entra aritmética flotante.

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use validator::Validate;

use crate::models::fuel_log::{CreateFuelLogRequest, FuelLogResponse, UpdateFuelLogRequest};
use crate::repositories::fuel_log_repository::FuelLogRepository;
use crate::repositories::trip_repository::TripRepository;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct FuelController {
    repository: FuelLogRepository,
    trips: TripRepository,
}

impl FuelController {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repository: FuelLogRepository::new(pool.clone()),
            trips: TripRepository::new(pool),
        }
    }

    /// Registrar una carga sobre un viaje existente
    pub async fn add_fuel_log(&self, request: CreateFuelLogRequest) -> AppResult<FuelLogResponse> {
        request.validate()?;

        if request.liter <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Liter amount must be greater than zero".to_string(),
            ));
        }
        if request.price < Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Price cannot be negative".to_string(),
            ));
        }

        self.trips
            .find_by_id(request.trip_id)
            .await?
            .ok_or_else(|| not_found_error("Trip", request.trip_id))?;

        let log = self
            .repository
            .create(
                request.trip_id,
                request.odometer,
                request.liter,
                request.price,
                request.station.as_deref(),
                request.location.as_deref(),
            )
            .await?;

        Ok(log.into())
    }

    /// Sobreescribir una carga existente.
    ///
    /// A diferencia del alta, la edición acepta cero litros: es la vía para
    /// corregir una carga registrada por error sin borrarla.
    pub async fn update_fuel_log(
        &self,
        id: i64,
        request: UpdateFuelLogRequest,
    ) -> AppResult<FuelLogResponse> {
        request.validate()?;

        if request.liter < Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Liter amount cannot be negative".to_string(),
            ));
        }
        if request.price < Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Price cannot be negative".to_string(),
            ));
        }

        let log = self
            .repository
            .update(
                id,
                request.odometer,
                request.liter,
                request.price,
                request.station.as_deref(),
            )
            .await?
            .ok_or_else(|| not_found_error("Fuel log", id))?;

        Ok(log.into())
    }

    /// Baja idempotente: borrar dos veces el mismo id responde éxito ambas
    pub async fn delete_fuel_log(&self, id: i64) -> AppResult<()> {
        self.repository.delete(id).await
    }
}
