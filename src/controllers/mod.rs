//! Controllers del sistema
//!
//! Lógica de negocio entre las rutas y los repositorios.

pub mod analytics_controller;
pub mod auth_controller;
pub mod fuel_controller;
pub mod trip_controller;
pub mod user_controller;
pub mod vehicle_controller;

pub use analytics_controller::AnalyticsController;
pub use auth_controller::AuthController;
pub use fuel_controller::FuelController;
pub use trip_controller::TripController;
pub use user_controller::UserController;
pub use vehicle_controller::VehicleController;
