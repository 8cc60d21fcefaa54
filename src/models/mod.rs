//! Modelos de dominio y DTOs de la API

pub mod analytics;
pub mod fuel_log;
pub mod trip;
pub mod user;
pub mod vehicle;
