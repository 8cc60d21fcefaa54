//! Utilidades compartidas

pub mod csv;
pub mod errors;
