//! Backup y restore del almacén SQLite
//!
//! El backup es el archivo de base de datos tal cual; el restore lo
//! sobreescribe en el lugar. El restore no se serializa contra escritores
//! concurrentes: es una operación de mantenimiento que se corre con el
//! sistema quieto.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use std::path::Path;

use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub fn create_backup_router() -> Router<AppState> {
    Router::new().route("/backup", get(download_backup).post(restore_backup))
}

/// Descargar el archivo SQLite completo
async fn download_backup(State(state): State<AppState>) -> Result<Response, AppError> {
    let path = &state.config.database_path;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read database file: {}", e)))?;

    let filename = format!("backup-{}.sqlite", Utc::now().format("%Y-%m-%d"));
    tracing::info!("Backup download: {} bytes from {}", bytes.len(), path);

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/x-sqlite3".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Restaurar el almacén desde un archivo subido (multipart, campo "file")
async fn restore_backup(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Backup file must have a name".to_string()))?;
        validate_backup_extension(&filename)?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Backup file is empty".to_string()));
        }

        tokio::fs::write(&state.config.database_path, &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write database file: {}", e)))?;

        tracing::info!(
            "Database restored from '{}' ({} bytes)",
            filename,
            bytes.len()
        );
        return Ok(Json(serde_json::json!({
            "success": true,
            "message": "Database restored"
        })));
    }

    Err(AppError::BadRequest(
        "Multipart field 'file' is required".to_string(),
    ))
}

fn validate_backup_extension(filename: &str) -> AppResult<()> {
    let valid = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ext == "db" || ext == "sqlite"
        })
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "Backup file must have a .db or .sqlite extension".to_string(),
        ))
    }
}
