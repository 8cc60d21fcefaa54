//! Configuración de base de datos
//!
//! Este módulo maneja la conexión y el esquema de SQLite con SQLx. El store
//! es un único archivo: eso es lo que hace posible el backup/restore de
//! admin como copia del archivo completo.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Configuración de la base de datos
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Crear un nuevo pool de conexiones
    pub async fn create_pool(&self) -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&self.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.connect_timeout)
            .connect_with(options)
            .await
    }
}

/// Crear un pool en memoria para tests.
///
/// Una sola conexión: cada conexión `:memory:` de SQLite es una base
/// distinta, así que el pool no debe abrir más de una.
pub async fn create_test_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'USER',
        thai_name TEXT,
        eng_name TEXT,
        email TEXT,
        employee_id TEXT,
        section TEXT,
        image_url TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vehicles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        license_plate TEXT NOT NULL UNIQUE,
        brand TEXT NOT NULL DEFAULT '',
        model TEXT NOT NULL DEFAULT '',
        vehicle_type TEXT NOT NULL DEFAULT 'รถยนต์',
        status TEXT NOT NULL DEFAULT 'AVAILABLE',
        current_odometer INTEGER NOT NULL DEFAULT 0,
        section TEXT,
        user_id TEXT REFERENCES users(id),
        image_url TEXT,
        created_at TEXT,
        updated_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS trips (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        vehicle_id INTEGER NOT NULL REFERENCES vehicles(id),
        driver_id TEXT REFERENCES users(id),
        departure_date TEXT NOT NULL,
        return_date TEXT,
        origin TEXT NOT NULL,
        destination TEXT NOT NULL,
        description TEXT,
        mileage_start INTEGER NOT NULL,
        mileage_end INTEGER,
        total_distance INTEGER,
        status TEXT NOT NULL DEFAULT 'ONGOING'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fuel_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        trip_id INTEGER NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
        odometer INTEGER NOT NULL,
        liter TEXT NOT NULL,
        price TEXT NOT NULL,
        station TEXT,
        location TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_trips_vehicle ON trips(vehicle_id)",
    "CREATE INDEX IF NOT EXISTS idx_trips_departure ON trips(departure_date)",
    "CREATE INDEX IF NOT EXISTS idx_fuel_logs_trip ON fuel_logs(trip_id)",
];

/// Aplicar el esquema embebido. Idempotente, se ejecuta en cada arranque.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
