//! Tests del motor de ciclo de vida de viajes

mod common;

use chrono::{Duration, Utc};
use common::*;
use vms_backend::controllers::trip_controller::TripController;
use vms_backend::models::trip::{
    AdminUpdateTripRequest, EndTripRequest, PastTripFuelLog, RecordPastTripRequest,
    StartTripRequest, TripStatus,
};
use vms_backend::utils::errors::AppError;

fn start_request(vehicle_id: i64, mileage_start: i64) -> StartTripRequest {
    StartTripRequest {
        vehicle_id,
        origin: "Office".to_string(),
        destination: "Plant".to_string(),
        description: None,
        mileage_start,
    }
}

#[tokio::test]
async fn start_trip_marks_vehicle_in_use() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    let vehicle_id = seed_vehicle(&pool, "AA-1", "AVAILABLE", 1000, None).await;

    let controller = TripController::new(pool.clone());
    let trip = controller
        .start_trip("driver-1", start_request(vehicle_id, 1000))
        .await
        .expect("start trip");

    assert_eq!(trip.status, TripStatus::Ongoing);
    assert_eq!(trip.driver_id.as_deref(), Some("driver-1"));
    assert_eq!(trip.mileage_start, 1000);

    let (status, _) = vehicle_state(&pool, vehicle_id).await;
    assert_eq!(status, "IN_USE");
}

#[tokio::test]
async fn start_trip_accepts_legacy_status_alias() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    let vehicle_id = seed_vehicle(&pool, "AA-1", "Stand By", 0, None).await;

    let controller = TripController::new(pool.clone());
    controller
        .start_trip("driver-1", start_request(vehicle_id, 0))
        .await
        .expect("legacy alias counts as available");

    // El motor reescribe el alias a la forma canónica al tocar la fila
    let (status, _) = vehicle_state(&pool, vehicle_id).await;
    assert_eq!(status, "IN_USE");
}

#[tokio::test]
async fn start_trip_rejects_busy_or_retired_vehicles() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;

    for status in ["IN_USE", "MAINTENANCE", "DECOMMISSIONED", "เลิกใช้งาน", "scrapped"] {
        let plate = format!("BB-{}", status);
        let vehicle_id = seed_vehicle(&pool, &plate, status, 0, None).await;

        let controller = TripController::new(pool.clone());
        let err = controller
            .start_trip("driver-1", start_request(vehicle_id, 0))
            .await
            .expect_err("must be rejected");

        match err {
            AppError::PreconditionFailed(msg) => {
                assert!(msg.contains(status), "message should carry raw status: {}", msg)
            }
            other => panic!("expected PreconditionFailed, got {:?}", other),
        }
    }

    // Ningún intento rechazado dejó fila de viaje
    assert_eq!(trip_count(&pool).await, 0);
}

#[tokio::test]
async fn concurrent_starts_exactly_one_succeeds() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    seed_user(&pool, "driver-2", None).await;
    let vehicle_id = seed_vehicle(&pool, "CC-1", "AVAILABLE", 0, None).await;

    let first = TripController::new(pool.clone());
    let second = TripController::new(pool.clone());

    let (a, b) = tokio::join!(
        first.start_trip("driver-1", start_request(vehicle_id, 0)),
        second.start_trip("driver-2", start_request(vehicle_id, 0)),
    );

    assert_eq!(
        a.is_ok() as u8 + b.is_ok() as u8,
        1,
        "exactly one concurrent start may win"
    );
    assert_eq!(trip_count(&pool).await, 1);
}

#[tokio::test]
async fn end_trip_completes_and_updates_odometer() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    let vehicle_id = seed_vehicle(&pool, "DD-1", "AVAILABLE", 1000, None).await;

    let controller = TripController::new(pool.clone());
    let trip = controller
        .start_trip("driver-1", start_request(vehicle_id, 1000))
        .await
        .expect("start");

    let ended = controller
        .end_trip(EndTripRequest {
            trip_id: trip.id,
            mileage_end: 1150,
        })
        .await
        .expect("end");

    assert_eq!(ended.status, TripStatus::Completed);
    assert_eq!(ended.total_distance, Some(150));
    assert!(ended.return_date.is_some());

    let (status, odometer) = vehicle_state(&pool, vehicle_id).await;
    assert_eq!(status, "AVAILABLE");
    assert_eq!(odometer, 1150);
}

#[tokio::test]
async fn end_trip_requires_ongoing() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    let vehicle_id = seed_vehicle(&pool, "EE-1", "AVAILABLE", 0, None).await;

    let controller = TripController::new(pool.clone());
    let trip = controller
        .start_trip("driver-1", start_request(vehicle_id, 0))
        .await
        .expect("start");
    controller
        .end_trip(EndTripRequest { trip_id: trip.id, mileage_end: 50 })
        .await
        .expect("first end");

    let err = controller
        .end_trip(EndTripRequest { trip_id: trip.id, mileage_end: 60 })
        .await
        .expect_err("already completed");
    assert!(matches!(err, AppError::PreconditionFailed(_)));

    let err = controller
        .end_trip(EndTripRequest { trip_id: 9999, mileage_end: 60 })
        .await
        .expect_err("missing trip");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn past_trip_never_regresses_the_odometer() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    let vehicle_id = seed_vehicle(&pool, "FF-1", "AVAILABLE", 5000, None).await;
    let controller = TripController::new(pool.clone());

    let departure = Utc::now() - Duration::days(10);
    let request = RecordPastTripRequest {
        vehicle_id,
        origin: "Office".to_string(),
        destination: "Depot".to_string(),
        description: None,
        mileage_start: 3800,
        mileage_end: 4000,
        departure_date: departure,
        return_date: departure + Duration::hours(4),
        fuel_logs: vec![PastTripFuelLog {
            odometer: 3900,
            liter: "10.5".parse().unwrap(),
            price: "350".parse().unwrap(),
            station: Some("PTT".to_string()),
            location: None,
        }],
    };

    let trip = controller
        .record_past_trip("driver-1", request)
        .await
        .expect("backfill");
    assert_eq!(trip.status, TripStatus::Completed);
    assert_eq!(trip.total_distance, Some(200));

    // 4000 < 5000: el backfill no regresa el odómetro
    let (status, odometer) = vehicle_state(&pool, vehicle_id).await;
    assert_eq!(status, "AVAILABLE");
    assert_eq!(odometer, 5000);

    let fuel_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM fuel_logs WHERE trip_id = ?",
    )
    .bind(trip.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(fuel_count, 1);

    // Un viaje que termina por encima del odómetro actual sí lo sube
    let departure = Utc::now() - Duration::days(2);
    controller
        .record_past_trip(
            "driver-1",
            RecordPastTripRequest {
                vehicle_id,
                origin: "Office".to_string(),
                destination: "Depot".to_string(),
                description: None,
                mileage_start: 5000,
                mileage_end: 5300,
                departure_date: departure,
                return_date: departure + Duration::hours(2),
                fuel_logs: vec![],
            },
        )
        .await
        .expect("second backfill");

    let (_, odometer) = vehicle_state(&pool, vehicle_id).await;
    assert_eq!(odometer, 5300);
}

#[tokio::test]
async fn past_trip_validates_mileage_and_dates() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    let vehicle_id = seed_vehicle(&pool, "GG-1", "AVAILABLE", 0, None).await;
    let controller = TripController::new(pool.clone());

    let departure = Utc::now() - Duration::days(1);
    let base = RecordPastTripRequest {
        vehicle_id,
        origin: "A".to_string(),
        destination: "B".to_string(),
        description: None,
        mileage_start: 1000,
        mileage_end: 900,
        departure_date: departure,
        return_date: departure + Duration::hours(1),
        fuel_logs: vec![],
    };
    let err = controller
        .record_past_trip("driver-1", base)
        .await
        .expect_err("end below start");
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = controller
        .record_past_trip(
            "driver-1",
            RecordPastTripRequest {
                vehicle_id,
                origin: "A".to_string(),
                destination: "B".to_string(),
                description: None,
                mileage_start: 1000,
                mileage_end: 1100,
                departure_date: departure,
                return_date: departure - Duration::hours(1),
                fuel_logs: vec![],
            },
        )
        .await
        .expect_err("return before departure");
    assert!(matches!(err, AppError::BadRequest(_)));

    assert_eq!(trip_count(&pool).await, 0);
}

#[tokio::test]
async fn past_trip_rejects_negative_fuel_amounts() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    let vehicle_id = seed_vehicle(&pool, "GG-2", "AVAILABLE", 0, None).await;
    let controller = TripController::new(pool.clone());

    let departure = Utc::now() - Duration::days(1);
    let request = |liter: &str, price: &str| RecordPastTripRequest {
        vehicle_id,
        origin: "A".to_string(),
        destination: "B".to_string(),
        description: None,
        mileage_start: 0,
        mileage_end: 100,
        departure_date: departure,
        return_date: departure + Duration::hours(1),
        fuel_logs: vec![PastTripFuelLog {
            odometer: 50,
            liter: liter.parse().unwrap(),
            price: price.parse().unwrap(),
            station: None,
            location: None,
        }],
    };

    let err = controller
        .record_past_trip("driver-1", request("-2", "100"))
        .await
        .expect_err("negative liters");
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = controller
        .record_past_trip("driver-1", request("2", "-100"))
        .await
        .expect_err("negative price");
    assert!(matches!(err, AppError::BadRequest(_)));

    // El rechazo es previo a la transacción: no quedó ni viaje ni carga
    assert_eq!(trip_count(&pool).await, 0);

    // Cero es válido en el backfill
    controller
        .record_past_trip("driver-1", request("0", "0"))
        .await
        .expect("zero amounts accepted");
}

#[tokio::test]
async fn deleting_an_ongoing_trip_reverts_the_vehicle() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    let vehicle_id = seed_vehicle(&pool, "HH-1", "AVAILABLE", 0, None).await;
    let controller = TripController::new(pool.clone());

    let trip = controller
        .start_trip("driver-1", start_request(vehicle_id, 0))
        .await
        .expect("start");

    controller.delete_trip(trip.id).await.expect("delete");

    let (status, _) = vehicle_state(&pool, vehicle_id).await;
    assert_eq!(status, "AVAILABLE");
    assert_eq!(trip_count(&pool).await, 0);
}

#[tokio::test]
async fn admin_update_recomputes_total_distance() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    let vehicle_id = seed_vehicle(&pool, "II-1", "AVAILABLE", 0, None).await;
    let trip_id = seed_trip(
        &pool,
        vehicle_id,
        Some("driver-1"),
        Utc::now() - Duration::days(1),
        "COMPLETED",
        100,
        Some(200),
    )
    .await;

    let controller = TripController::new(pool.clone());
    let updated = controller
        .update_trip(AdminUpdateTripRequest {
            id: trip_id,
            origin: "Office".to_string(),
            destination: "Harbor".to_string(),
            description: None,
            mileage_start: 100,
            mileage_end: Some(450),
        })
        .await
        .expect("update");

    assert_eq!(updated.total_distance, Some(350));
    assert_eq!(updated.destination, "Harbor");

    // El vehículo no se toca en la edición de admin
    let (status, odometer) = vehicle_state(&pool, vehicle_id).await;
    assert_eq!(status, "AVAILABLE");
    assert_eq!(odometer, 0);
}

#[tokio::test]
async fn odometer_sync_is_idempotent() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    let vehicle_id = seed_vehicle(&pool, "JJ-1", "AVAILABLE", 0, None).await;
    seed_trip(
        &pool,
        vehicle_id,
        Some("driver-1"),
        Utc::now() - Duration::days(3),
        "COMPLETED",
        0,
        Some(700),
    )
    .await;
    seed_trip(
        &pool,
        vehicle_id,
        Some("driver-1"),
        Utc::now() - Duration::days(1),
        "COMPLETED",
        700,
        Some(950),
    )
    .await;

    let controller = TripController::new(pool.clone());
    let updated = controller.sync_odometers().await.expect("sync");
    assert_eq!(updated, 1);

    let (_, odometer) = vehicle_state(&pool, vehicle_id).await;
    assert_eq!(odometer, 950, "latest returned COMPLETED trip wins");

    let updated = controller.sync_odometers().await.expect("second sync");
    assert_eq!(updated, 0);
}

#[tokio::test]
async fn trip_details_resolve_relations_and_order_fuel_logs() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", Some("Engineering")).await;
    let vehicle_id = seed_vehicle(&pool, "KK-1", "AVAILABLE", 0, None).await;
    let trip_id = seed_trip(
        &pool,
        vehicle_id,
        Some("driver-1"),
        Utc::now() - Duration::days(1),
        "COMPLETED",
        0,
        Some(120),
    )
    .await;
    let now = Utc::now();
    let first = seed_fuel(&pool, trip_id, "10.5", "350", now - Duration::hours(2)).await;
    let second = seed_fuel(&pool, trip_id, "8.0", "280", now - Duration::hours(1)).await;

    let controller = TripController::new(pool.clone());
    let details = controller.trip_details(trip_id).await.expect("details");

    assert_eq!(details.vehicle.license_plate, "KK-1");
    assert_eq!(details.driver.as_ref().map(|d| d.id.as_str()), Some("driver-1"));
    let ids: Vec<i64> = details.fuel_logs.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![first, second]);

    let err = controller.trip_details(9999).await.expect_err("missing trip");
    assert!(matches!(err, AppError::NotFound(_)));
}
