//! Tests de la superficie de administración y autenticación

mod common;

use chrono::{TimeZone, Utc};
use common::*;
use vms_backend::config::EnvironmentConfig;
use vms_backend::controllers::auth_controller::{AuthController, LoginRequest};
use vms_backend::controllers::trip_controller::TripController;
use vms_backend::controllers::user_controller::UserController;
use vms_backend::controllers::vehicle_controller::VehicleController;
use vms_backend::models::trip::TripListQuery;
use vms_backend::models::user::{CreateUserRequest, UpdateUserRequest, UserFilters, UserRole};
use vms_backend::models::vehicle::{CreateVehicleRequest, UpdateVehicleRequest};
use vms_backend::utils::errors::AppError;

fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        environment: "test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expiration: 3600,
        database_path: ":memory:".to_string(),
    }
}

fn create_user_request(username: &str) -> CreateUserRequest {
    CreateUserRequest {
        username: username.to_string(),
        password: "s3cret-pass".to_string(),
        role: UserRole::User,
        thai_name: None,
        eng_name: Some("Somchai".to_string()),
        email: None,
        employee_id: None,
        section: Some("Engineering".to_string()),
        image_url: None,
    }
}

fn create_vehicle_request(plate: &str) -> CreateVehicleRequest {
    CreateVehicleRequest {
        license_plate: plate.to_string(),
        brand: Some("Toyota".to_string()),
        model: Some("Hilux".to_string()),
        vehicle_type: Some("Pickup".to_string()),
        status: None,
        current_odometer: 1000,
        section: None,
        image_url: None,
    }
}

#[tokio::test]
async fn created_users_can_log_in_and_never_leak_the_hash() {
    let pool = test_pool().await;
    let users = UserController::new(pool.clone());
    let auth = AuthController::new(pool.clone(), test_config());

    let created = users
        .create_user(create_user_request("somchai"))
        .await
        .expect("create");
    assert!(created.id.starts_with("user-"));

    // La contraseña se guardó como hash bcrypt, no en claro
    let stored: String =
        sqlx::query_scalar("SELECT password_hash FROM users WHERE username = 'somchai'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(stored.starts_with("$2"));
    assert_ne!(stored, "s3cret-pass");

    let response = auth
        .login(LoginRequest {
            username: "somchai".to_string(),
            password: "s3cret-pass".to_string(),
        })
        .await
        .expect("login");
    assert!(!response.token.is_empty());
    assert_eq!(response.user.username, "somchai");

    let err = auth
        .login(LoginRequest {
            username: "somchai".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .expect_err("bad password");
    assert!(matches!(err, AppError::Unauthorized(_)));

    let err = auth
        .login(LoginRequest {
            username: "nobody".to_string(),
            password: "s3cret-pass".to_string(),
        })
        .await
        .expect_err("unknown user");
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn duplicate_usernames_are_a_conflict() {
    let pool = test_pool().await;
    let users = UserController::new(pool.clone());

    users
        .create_user(create_user_request("somchai"))
        .await
        .expect("first create");
    let err = users
        .create_user(create_user_request("somchai"))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn user_update_merges_and_rehashes_only_when_asked() {
    let pool = test_pool().await;
    let users = UserController::new(pool.clone());
    let auth = AuthController::new(pool.clone(), test_config());

    let created = users
        .create_user(create_user_request("somchai"))
        .await
        .expect("create");

    let updated = users
        .update_user(UpdateUserRequest {
            id: created.id.clone(),
            username: None,
            password: None,
            role: Some(UserRole::Admin),
            thai_name: Some("สมชาย".to_string()),
            eng_name: None,
            email: None,
            employee_id: None,
            section: None,
            image_url: None,
        })
        .await
        .expect("update");

    assert_eq!(updated.role, UserRole::Admin);
    assert_eq!(updated.thai_name.as_deref(), Some("สมชาย"));
    // Los campos no enviados conservan su valor
    assert_eq!(updated.eng_name.as_deref(), Some("Somchai"));

    // Sin contraseña nueva el login original sigue funcionando
    auth.login(LoginRequest {
        username: "somchai".to_string(),
        password: "s3cret-pass".to_string(),
    })
    .await
    .expect("old password still valid");

    users
        .update_user(UpdateUserRequest {
            id: created.id.clone(),
            username: None,
            password: Some("new-pass".to_string()),
            role: None,
            thai_name: None,
            eng_name: None,
            email: None,
            employee_id: None,
            section: None,
            image_url: None,
        })
        .await
        .expect("password change");

    auth.login(LoginRequest {
        username: "somchai".to_string(),
        password: "new-pass".to_string(),
    })
    .await
    .expect("new password valid");
}

#[tokio::test]
async fn user_list_filters_by_role_and_search() {
    let pool = test_pool().await;
    let users = UserController::new(pool.clone());

    users.create_user(create_user_request("somchai")).await.expect("u1");
    let mut admin = create_user_request("warin");
    admin.role = UserRole::Admin;
    users.create_user(admin).await.expect("u2");

    let admins = users
        .list_users(&UserFilters { search: None, role: Some("ADMIN".to_string()) })
        .await
        .expect("role filter");
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].username, "warin");

    let found = users
        .list_users(&UserFilters { search: Some("som".to_string()), role: None })
        .await
        .expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "somchai");

    let all = users
        .list_users(&UserFilters { search: None, role: Some("ALL".to_string()) })
        .await
        .expect("ALL disables the filter");
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn duplicate_plates_and_unknown_statuses_are_rejected() {
    let pool = test_pool().await;
    let vehicles = VehicleController::new(pool.clone());

    let created = vehicles
        .create_vehicle(create_vehicle_request("AA-1"))
        .await
        .expect("create");
    assert_eq!(created.status, "AVAILABLE");

    let err = vehicles
        .create_vehicle(create_vehicle_request("AA-1"))
        .await
        .expect_err("duplicate plate");
    assert!(matches!(err, AppError::Conflict(_)));

    let mut bad = create_vehicle_request("BB-2");
    bad.status = Some("scrapped".to_string());
    let err = vehicles.create_vehicle(bad).await.expect_err("unknown status");
    assert!(matches!(err, AppError::BadRequest(_)));

    // Los alias heredados se aceptan y se persisten en forma canónica
    let mut legacy = create_vehicle_request("CC-3");
    legacy.status = Some("Stand By".to_string());
    let vehicle = vehicles.create_vehicle(legacy).await.expect("legacy alias");
    assert_eq!(vehicle.status, "AVAILABLE");
}

#[tokio::test]
async fn vehicle_with_trips_cannot_be_deleted() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    let vehicle_id = seed_vehicle(&pool, "AA-1", "AVAILABLE", 0, None).await;
    seed_trip(
        &pool,
        vehicle_id,
        Some("driver-1"),
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        "COMPLETED",
        0,
        Some(100),
    )
    .await;

    let vehicles = VehicleController::new(pool.clone());
    let err = vehicles.delete_vehicle(vehicle_id).await.expect_err("has trips");
    assert!(matches!(err, AppError::Conflict(_)));

    let empty = seed_vehicle(&pool, "BB-2", "AVAILABLE", 0, None).await;
    vehicles.delete_vehicle(empty).await.expect("no trips, deleted");
}

#[tokio::test]
async fn admin_override_sets_status_and_odometer_directly() {
    let pool = test_pool().await;
    let vehicle_id = seed_vehicle(&pool, "AA-1", "IN_USE", 1000, None).await;

    let vehicles = VehicleController::new(pool.clone());
    let updated = vehicles
        .update_vehicle(UpdateVehicleRequest {
            id: vehicle_id,
            license_plate: None,
            brand: None,
            model: None,
            vehicle_type: None,
            status: Some("MAINTENANCE".to_string()),
            current_odometer: Some(2500),
            section: None,
            user_id: None,
            image_url: None,
        })
        .await
        .expect("override");

    assert_eq!(updated.status, "MAINTENANCE");
    assert_eq!(updated.current_odometer, 2500);
    assert_eq!(updated.license_plate, "AA-1");
}

#[tokio::test]
async fn admin_trip_list_paginates_and_exports() {
    let pool = test_pool().await;
    seed_user(&pool, "driver-1", None).await;
    let vehicle_id = seed_vehicle(&pool, "AA-1", "AVAILABLE", 0, None).await;
    for d in 1..=3 {
        seed_trip(
            &pool,
            vehicle_id,
            Some("driver-1"),
            Utc.with_ymd_and_hms(2024, 3, d, 9, 0, 0).unwrap(),
            "COMPLETED",
            0,
            Some(100),
        )
        .await;
    }
    // Viaje sin conductor para el fallback del export
    seed_trip(
        &pool,
        vehicle_id,
        None,
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap(),
        "COMPLETED",
        0,
        Some(50),
    )
    .await;

    let controller = TripController::new(pool.clone());

    let page = controller
        .list_admin(&TripListQuery {
            page: Some(1),
            limit: Some(3),
            ..Default::default()
        })
        .await
        .expect("page 1");
    assert_eq!(page.data.len(), 3);
    assert_eq!(page.meta.total, 4);
    assert_eq!(page.meta.total_pages, 2);
    // Más recientes primero
    assert!(page.data[0].trip.id > page.data[1].trip.id);

    let (filename, content) = controller
        .export_csv(&TripListQuery::default())
        .await
        .expect("export");
    assert!(filename.starts_with("trips-export-"));
    assert!(content.starts_with('\u{feff}'));
    assert_eq!(content.lines().count(), 5, "header + 4 rows, pagination ignored");
    assert!(content.contains("\"Unknown\""), "driver fallback");
    assert!(content.contains("0.000"), "liters at 3 dp");

    let filtered = controller
        .list_admin(&TripListQuery {
            start_date: Some("2024-03-02".to_string()),
            end_date: Some("2024-03-03".to_string()),
            ..Default::default()
        })
        .await
        .expect("date filter");
    assert_eq!(filtered.meta.total, 2);
}
