use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use vms_backend::config::{self, DatabaseConfig, EnvironmentConfig};
use vms_backend::routes;
use vms_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    info!("🚗 Vehicle Management System - API");
    info!("==================================");

    let config = EnvironmentConfig::default();

    // Inicializar base de datos
    let pool = match DatabaseConfig::new(config.database_url()).create_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };
    config::database::run_migrations(&pool).await?;
    info!("✅ Base de datos lista en {}", config.database_path);

    let addr: SocketAddr = config.server_url().parse()?;
    let app_state = AppState::new(pool, config);
    let app = routes::create_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   POST /api/auth/login - Login");
    info!("   GET  /api/auth/me - Perfil del usuario autenticado");
    info!("   POST /api/trips/start - Iniciar viaje");
    info!("   POST /api/trips/end - Finalizar viaje");
    info!("   POST /api/trips/past - Registrar viaje pasado");
    info!("   GET  /api/trips/:id - Detalle de viaje");
    info!("   POST /api/fuel - Registrar carga de combustible");
    info!("   PUT  /api/fuel/:id - Editar carga");
    info!("   DELETE /api/fuel/:id - Borrar carga");
    info!("   GET/POST /api/vehicles - Flota (autenticado)");
    info!("🛠  Endpoints de administración:");
    info!("   CRUD /api/admin/users | /api/admin/vehicles | /api/admin/trips");
    info!("   GET  /api/admin/stats - Estadísticas de flota");
    info!("   GET  /api/admin/analytics/export - Export CSV de analytics");
    info!("   GET  /api/admin/sections - Secciones");
    info!("   POST /api/admin/odometer-sync - Reconciliar odómetros");
    info!("   GET/POST /api/admin/backup - Backup y restore del almacén");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
