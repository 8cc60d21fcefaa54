//! Vehicle Management System
//!
//! API de gestión de flota: vehículos, viajes, cargas de combustible,
//! estadísticas y panel de administración con backup del almacén.

pub mod config;
pub mod controllers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod utils;
