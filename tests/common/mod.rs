//! Helpers compartidos de los tests de integración
//!
//! Cada test corre contra una base SQLite en memoria con el esquema real
//! aplicado; los seeds insertan filas directamente para no depender de los
//! endpoints que se están probando.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub async fn test_pool() -> SqlitePool {
    vms_backend::config::database::create_test_pool()
        .await
        .expect("in-memory pool")
}

pub async fn seed_user(pool: &SqlitePool, id: &str, section: Option<&str>) {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash, role, section, created_at)
        VALUES (?1, ?1, 'not-a-real-hash', 'USER', ?2, ?3)
        "#,
    )
    .bind(id)
    .bind(section)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("seed user");
}

pub async fn seed_vehicle(
    pool: &SqlitePool,
    plate: &str,
    status: &str,
    odometer: i64,
    section: Option<&str>,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO vehicles (license_plate, status, current_odometer, section, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(plate)
    .bind(status)
    .bind(odometer)
    .bind(section)
    .bind(Utc::now())
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .expect("seed vehicle")
}

pub async fn seed_trip(
    pool: &SqlitePool,
    vehicle_id: i64,
    driver_id: Option<&str>,
    departure: DateTime<Utc>,
    status: &str,
    mileage_start: i64,
    mileage_end: Option<i64>,
) -> i64 {
    let total_distance = mileage_end.map(|end| end - mileage_start);
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO trips (vehicle_id, driver_id, departure_date, return_date, origin, destination, mileage_start, mileage_end, total_distance, status)
        VALUES (?, ?, ?, ?, 'Office', 'Plant', ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(vehicle_id)
    .bind(driver_id)
    .bind(departure)
    .bind(mileage_end.map(|_| departure))
    .bind(mileage_start)
    .bind(mileage_end)
    .bind(total_distance)
    .bind(status)
    .fetch_one(pool)
    .await
    .expect("seed trip")
}

pub async fn seed_fuel(
    pool: &SqlitePool,
    trip_id: i64,
    liter: &str,
    price: &str,
    created_at: DateTime<Utc>,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO fuel_logs (trip_id, odometer, liter, price, created_at)
        VALUES (?, 0, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(trip_id)
    .bind(liter)
    .bind(price)
    .bind(created_at)
    .fetch_one(pool)
    .await
    .expect("seed fuel log")
}

pub async fn vehicle_state(pool: &SqlitePool, id: i64) -> (String, i64) {
    sqlx::query_as::<_, (String, i64)>(
        "SELECT status, current_odometer FROM vehicles WHERE id = ?",
    )
    .bind(id)
    .fetch_one(pool)
    .await
    .expect("vehicle row")
}

pub async fn trip_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trips")
        .fetch_one(pool)
        .await
        .expect("trip count")
}
