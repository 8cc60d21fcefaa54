//! Motor de ciclo de vida de viajes
//!
//! Máquina de estados por vehículo: AVAILABLE -> IN_USE -> AVAILABLE.
//! Toda transición que toca filas de Trip y Vehicle corre dentro de una sola
//! transacción: la verificación "el vehículo está disponible" y el cambio de
//! estado ocurren bajo la misma transacción, así dos StartTrip concurrentes
//! sobre el mismo vehículo nunca pueden tener éxito los dos.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use validator::Validate;

use crate::models::fuel_log::{FuelLog, FuelLogResponse, FuelTotals};
use crate::models::trip::{
    AdminCreateTripRequest, AdminUpdateTripRequest, EndTripRequest, PageMeta,
    RecordPastTripRequest, StartTripRequest, Trip, TripListQuery, TripPage, TripResponse,
    TripStatus, TripWithDetails,
};
use crate::models::user::User;
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::models::analytics::TripFilter;
use crate::repositories::trip_repository::{TripListFilter, TripRepository};
use crate::utils::csv;
use crate::utils::errors::{not_found_error, AppError, AppResult};

const TRIP_EXPORT_HEADER: [&str; 16] = [
    "ID",
    "License Plate",
    "Brand",
    "Model",
    "Driver",
    "Origin",
    "Destination",
    "Departure",
    "Return",
    "Start Mileage",
    "End Mileage",
    "Status",
    "Total Fuel Price",
    "Total Fuel Liters",
    "Fuel Stations",
    "Fuel Locations",
];

pub struct TripController {
    pool: SqlitePool,
    repository: TripRepository,
}

impl TripController {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repository: TripRepository::new(pool.clone()),
            pool,
        }
    }

    /// Iniciar un viaje: crea el Trip ONGOING y marca el vehículo IN_USE.
    ///
    /// El conductor llega como identidad explícita del caller autenticado,
    /// nunca se lee de estado ambiente.
    pub async fn start_trip(
        &self,
        driver_id: &str,
        request: StartTripRequest,
    ) -> AppResult<TripResponse> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = ?")
            .bind(request.vehicle_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", request.vehicle_id))?;

        // El estado crudo puede ser un alias heredado; el mensaje de error
        // conserva el valor tal cual está en la fila.
        if !VehicleStatus::can_start_trip(&vehicle.status) {
            return Err(AppError::PreconditionFailed(format!(
                "Vehicle is not available (Status: {})",
                vehicle.status
            )));
        }

        let now = Utc::now();
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            INSERT INTO trips (vehicle_id, driver_id, departure_date, origin, destination, description, mileage_start, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'ONGOING')
            RETURNING *
            "#,
        )
        .bind(request.vehicle_id)
        .bind(driver_id)
        .bind(now)
        .bind(&request.origin)
        .bind(&request.destination)
        .bind(&request.description)
        .bind(request.mileage_start)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE vehicles SET status = ?, updated_at = ? WHERE id = ?")
            .bind(VehicleStatus::InUse.as_str())
            .bind(now)
            .bind(vehicle.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(trip.into())
    }

    /// Finalizar un viaje: COMPLETED + odómetro del vehículo en mileage_end.
    ///
    /// mileage_end menor al inicial no se rechaza; la distancia queda
    /// negativa y la edición de admin es la vía de corrección.
    pub async fn end_trip(&self, request: EndTripRequest) -> AppResult<TripResponse> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = ?")
            .bind(request.trip_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Trip", request.trip_id))?;

        if trip.status != TripStatus::Ongoing {
            return Err(AppError::PreconditionFailed(format!(
                "Trip {} is not ongoing (status: {})",
                trip.id,
                trip.status.as_str()
            )));
        }

        let total_distance = Trip::compute_distance(trip.mileage_start, Some(request.mileage_end));
        let now = Utc::now();

        let updated = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET mileage_end = ?2, total_distance = ?3, return_date = ?4, status = 'COMPLETED'
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(trip.id)
        .bind(request.mileage_end)
        .bind(total_distance)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE vehicles SET status = ?, current_odometer = ?, updated_at = ? WHERE id = ?",
        )
        .bind(VehicleStatus::Available.as_str())
        .bind(request.mileage_end)
        .bind(now)
        .bind(trip.vehicle_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated.into())
    }

    /// Registrar un viaje que ya ocurrió: entra directo como COMPLETED.
    ///
    /// No toca el estado del vehículo (puede estar en medio de otro viaje) y
    /// solo sube el odómetro si el viaje registrado termina por encima del
    /// valor actual: un backfill fuera de orden nunca lo regresa.
    pub async fn record_past_trip(
        &self,
        driver_id: &str,
        request: RecordPastTripRequest,
    ) -> AppResult<TripResponse> {
        request.validate()?;

        if request.mileage_end < request.mileage_start {
            return Err(AppError::BadRequest(
                "End mileage must be greater than or equal to start mileage".to_string(),
            ));
        }
        if request.return_date < request.departure_date {
            return Err(AppError::BadRequest(
                "Return date must be on or after the departure date".to_string(),
            ));
        }
        for log in &request.fuel_logs {
            if log.liter < Decimal::ZERO || log.price < Decimal::ZERO {
                return Err(AppError::BadRequest(
                    "Fuel log liters and price cannot be negative".to_string(),
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = ?")
            .bind(request.vehicle_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", request.vehicle_id))?;

        let total_distance =
            Trip::compute_distance(request.mileage_start, Some(request.mileage_end));

        let trip = sqlx::query_as::<_, Trip>(
            r#"
            INSERT INTO trips (vehicle_id, driver_id, departure_date, return_date, origin, destination, description, mileage_start, mileage_end, total_distance, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'COMPLETED')
            RETURNING *
            "#,
        )
        .bind(request.vehicle_id)
        .bind(driver_id)
        .bind(request.departure_date)
        .bind(request.return_date)
        .bind(&request.origin)
        .bind(&request.destination)
        .bind(&request.description)
        .bind(request.mileage_start)
        .bind(request.mileage_end)
        .bind(total_distance)
        .fetch_one(&mut *tx)
        .await?;

        if request.mileage_end > vehicle.current_odometer {
            sqlx::query("UPDATE vehicles SET current_odometer = ?, updated_at = ? WHERE id = ?")
                .bind(request.mileage_end)
                .bind(Utc::now())
                .bind(vehicle.id)
                .execute(&mut *tx)
                .await?;
        }

        for log in &request.fuel_logs {
            sqlx::query(
                r#"
                INSERT INTO fuel_logs (trip_id, odometer, liter, price, station, location, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(trip.id)
            .bind(log.odometer)
            .bind(log.liter.to_string())
            .bind(log.price.to_string())
            .bind(&log.station)
            .bind(&log.location)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(trip.into())
    }

    /// Inserción directa (admin): guarda el viaje tal cual, sin bloquear el
    /// vehículo. Es carga de datos, no un evento del motor.
    pub async fn admin_create_trip(
        &self,
        request: AdminCreateTripRequest,
    ) -> AppResult<TripResponse> {
        request.validate()?;

        sqlx::query_scalar::<_, i64>("SELECT id FROM vehicles WHERE id = ?")
            .bind(request.vehicle_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", request.vehicle_id))?;

        let status = request.status.unwrap_or(TripStatus::Ongoing);
        let total_distance =
            Trip::compute_distance(request.mileage_start, request.mileage_end);

        let trip = sqlx::query_as::<_, Trip>(
            r#"
            INSERT INTO trips (vehicle_id, driver_id, departure_date, return_date, origin, destination, description, mileage_start, mileage_end, total_distance, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.vehicle_id)
        .bind(&request.driver_id)
        .bind(request.departure_date)
        .bind(request.return_date)
        .bind(&request.origin)
        .bind(&request.destination)
        .bind(&request.description)
        .bind(request.mileage_start)
        .bind(request.mileage_end)
        .bind(total_distance)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(trip.into())
    }

    /// Edición de admin: recalcula total_distance, no toca el vehículo
    pub async fn update_trip(&self, request: AdminUpdateTripRequest) -> AppResult<TripResponse> {
        request.validate()?;

        let total_distance =
            Trip::compute_distance(request.mileage_start, request.mileage_end);

        let trip = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET origin = ?2, destination = ?3, description = ?4,
                mileage_start = ?5, mileage_end = ?6, total_distance = ?7
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(&request.origin)
        .bind(&request.destination)
        .bind(&request.description)
        .bind(request.mileage_start)
        .bind(request.mileage_end)
        .bind(total_distance)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Trip", request.id))?;

        Ok(trip.into())
    }

    /// Borrado de admin. Si el viaje estaba ONGOING el vehículo vuelve a
    /// AVAILABLE en la misma transacción: un crash a mitad de camino no
    /// puede dejar un vehículo IN_USE sin viaje en curso.
    pub async fn delete_trip(&self, trip_id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = ?")
            .bind(trip_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Trip", trip_id))?;

        sqlx::query("DELETE FROM trips WHERE id = ?")
            .bind(trip_id)
            .execute(&mut *tx)
            .await?;

        if trip.status == TripStatus::Ongoing {
            sqlx::query("UPDATE vehicles SET status = ?, updated_at = ? WHERE id = ?")
                .bind(VehicleStatus::Available.as_str())
                .bind(Utc::now())
                .bind(trip.vehicle_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Detalle de un viaje con vehículo, conductor y fuel logs
    pub async fn trip_details(&self, trip_id: i64) -> AppResult<TripWithDetails> {
        let trip = self
            .repository
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| not_found_error("Trip", trip_id))?;

        let mut details = load_details(&self.pool, vec![trip]).await?;
        details
            .pop()
            .ok_or_else(|| AppError::Internal(format!("Failed to resolve trip {}", trip_id)))
    }

    /// Listado paginado del admin con relaciones resueltas
    pub async fn list_admin(&self, query: &TripListQuery) -> AppResult<TripPage> {
        let filter = admin_filter(query)?;
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(25).max(1);
        let offset = (page - 1) * limit;

        let trips = self.repository.list(&filter, limit, offset).await?;
        let total = self.repository.count(&filter).await?;
        let data = load_details(&self.pool, trips).await?;

        Ok(TripPage {
            data,
            meta: PageMeta {
                total,
                page,
                limit,
                total_pages: (total + limit - 1) / limit,
            },
        })
    }

    /// Export CSV del listado: ignora la paginación y trae el set completo
    pub async fn export_csv(&self, query: &TripListQuery) -> AppResult<(String, String)> {
        let filter = admin_filter(query)?;
        // LIMIT -1 en SQLite significa sin límite
        let trips = self.repository.list(&filter, -1, 0).await?;
        let details = load_details(&self.pool, trips).await?;

        let rows = details.iter().map(trip_export_row).collect();
        let content = csv::build_document(&TRIP_EXPORT_HEADER, rows);
        let filename = format!("trips-export-{}.csv", Utc::now().format("%Y-%m-%d"));
        Ok((filename, content))
    }

    /// Pasada de reconciliación de odómetros: para cada vehículo toma el
    /// mileage_end de su viaje COMPLETED devuelto más recientemente y lo
    /// aplica si difiere. Idempotente, segura de re-ejecutar.
    pub async fn sync_odometers(&self) -> AppResult<u64> {
        let rows = sqlx::query_as::<_, (i64, i64, Option<i64>)>(
            r#"
            SELECT v.id, v.current_odometer,
                (SELECT t.mileage_end FROM trips t
                 WHERE t.vehicle_id = v.id AND t.status = 'COMPLETED' AND t.mileage_end IS NOT NULL
                 ORDER BY t.return_date DESC
                 LIMIT 1) AS latest_end
            FROM vehicles v
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut updated = 0u64;
        for (vehicle_id, current, latest_end) in rows {
            if let Some(latest) = latest_end {
                if latest != current {
                    sqlx::query(
                        "UPDATE vehicles SET current_odometer = ?, updated_at = ? WHERE id = ?",
                    )
                    .bind(latest)
                    .bind(Utc::now())
                    .bind(vehicle_id)
                    .execute(&self.pool)
                    .await?;
                    updated += 1;
                }
            }
        }

        tracing::info!("Odometer sync updated {} vehicles", updated);
        Ok(updated)
    }
}

fn admin_filter(query: &TripListQuery) -> AppResult<TripListFilter> {
    let base = TripFilter::build(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        query.section.as_deref(),
    )?;
    Ok(TripListFilter {
        start: base.start,
        end: base.end,
        section: base.section,
        vehicle_id: query.vehicle_id,
    })
}

/// Resolver en lote vehículo, conductor y fuel logs de un conjunto de viajes.
/// Tres queries con IN, nunca una por viaje.
pub async fn load_details(
    pool: &SqlitePool,
    trips: Vec<Trip>,
) -> AppResult<Vec<TripWithDetails>> {
    if trips.is_empty() {
        return Ok(Vec::new());
    }

    let trip_ids: Vec<i64> = trips.iter().map(|t| t.id).collect();
    let mut vehicle_ids: Vec<i64> = trips.iter().map(|t| t.vehicle_id).collect();
    vehicle_ids.sort_unstable();
    vehicle_ids.dedup();
    let mut driver_ids: Vec<String> = trips.iter().filter_map(|t| t.driver_id.clone()).collect();
    driver_ids.sort_unstable();
    driver_ids.dedup();

    let vehicles = fetch_in::<i64, Vehicle>(pool, "SELECT * FROM vehicles WHERE id IN", &vehicle_ids).await?;
    let vehicles: HashMap<i64, Vehicle> = vehicles.into_iter().map(|v| (v.id, v)).collect();

    let drivers = fetch_in::<String, User>(pool, "SELECT * FROM users WHERE id IN", &driver_ids).await?;
    let drivers: HashMap<String, User> = drivers.into_iter().map(|u| (u.id.clone(), u)).collect();

    let logs = fetch_in::<i64, FuelLog>(
        pool,
        "SELECT * FROM fuel_logs WHERE trip_id IN",
        &trip_ids,
    )
    .await?;
    let mut logs_by_trip: HashMap<i64, Vec<FuelLog>> = HashMap::new();
    for log in logs {
        logs_by_trip.entry(log.trip_id).or_default().push(log);
    }
    for trip_logs in logs_by_trip.values_mut() {
        trip_logs.sort_by_key(|l| l.created_at);
    }

    trips
        .into_iter()
        .map(|trip| {
            let vehicle = vehicles
                .get(&trip.vehicle_id)
                .cloned()
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "Vehicle {} referenced by trip {} is missing",
                        trip.vehicle_id, trip.id
                    ))
                })?;
            let driver = trip
                .driver_id
                .as_ref()
                .and_then(|id| drivers.get(id).cloned());
            let fuel_logs = logs_by_trip
                .remove(&trip.id)
                .unwrap_or_default()
                .into_iter()
                .map(FuelLogResponse::from)
                .collect();

            Ok(TripWithDetails {
                trip: trip.into(),
                vehicle: vehicle.into(),
                driver: driver.map(Into::into),
                fuel_logs,
            })
        })
        .collect()
}

async fn fetch_in<B, T>(pool: &SqlitePool, select: &str, ids: &[B]) -> Result<Vec<T>, AppError>
where
    B: Clone + Send + Sync + sqlx::Type<sqlx::Sqlite> + for<'q> sqlx::Encode<'q, sqlx::Sqlite>,
    T: Send + Unpin + for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(",");
    let sql = format!("{} ({})", select, placeholders);
    let mut query = sqlx::query_as::<_, T>(&sql);
    for id in ids {
        query = query.bind(id.clone());
    }

    Ok(query.fetch_all(pool).await?)
}

fn trip_export_row(detail: &TripWithDetails) -> String {
    let driver_name = detail
        .driver
        .as_ref()
        .map(|d| d.thai_name.clone().unwrap_or_else(|| d.username.clone()))
        .unwrap_or_else(|| "Unknown".to_string());

    let totals = FuelTotals {
        liters: detail.fuel_logs.iter().map(|l| l.liter).sum(),
        price: detail.fuel_logs.iter().map(|l| l.price).sum(),
    };
    let stations: Vec<&str> = detail
        .fuel_logs
        .iter()
        .filter_map(|l| l.station.as_deref())
        .filter(|s| !s.is_empty())
        .collect();
    let locations: Vec<&str> = detail
        .fuel_logs
        .iter()
        .filter_map(|l| l.location.as_deref())
        .filter(|l| !l.is_empty())
        .collect();

    [
        detail.trip.id.to_string(),
        csv::csv_escape(&detail.vehicle.license_plate),
        csv::csv_escape(&detail.vehicle.brand),
        csv::csv_escape(&detail.vehicle.model),
        csv::csv_escape(&driver_name),
        csv::csv_escape(&detail.trip.origin),
        csv::csv_escape(&detail.trip.destination),
        detail.trip.departure_date.clone(),
        detail.trip.return_date.clone().unwrap_or_default(),
        detail.trip.mileage_start.to_string(),
        detail
            .trip
            .mileage_end
            .map(|m| m.to_string())
            .unwrap_or_default(),
        detail.trip.status.as_str().to_string(),
        csv::format_fixed(totals.price, 2),
        csv::format_fixed(totals.liters, 3),
        csv::csv_escape(&stations.join(" | ")),
        csv::csv_escape(&locations.join(" | ")),
    ]
    .join(",")
}
