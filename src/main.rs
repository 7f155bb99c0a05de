mod api;
mod application;
mod datefmt;
mod db;
mod errors;
mod infrastructure;
mod state;
mod workers;

use anyhow::Result;
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::str::FromStr;

use api::{api_routes, TraceIdLayer};
use state::AppContext;
use workers::run_due_date_monitor;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fleet fuel service");

    let data_dir = std::env::var("FLEET_FUEL_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    std::fs::create_dir_all(&data_dir)?;
    info!("Data directory: {}", data_dir);

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| format!("sqlite://{}/fleet-fuel.db", data_dir));
    info!("Connecting to database: {}", database_url);

    let options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;

    info!("Running database migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let context = AppContext::new(pool.clone(), PathBuf::from(&data_dir));
    info!("Application context initialized");

    let app = Router::new()
        .nest("/api", api_routes())
        .layer(TraceIdLayer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(context.clone());

    let addr = std::env::var("FLEET_FUEL_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    // Start API server
    let api_server = tokio::spawn({
        async move {
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .expect("Failed to bind listen address");
            info!("API server listening on {}", addr);
            if let Err(e) = axum::serve(listener, app).await {
                error!("API server failed: {}", e);
            }
        }
    });

    // Start due-date monitor
    let due_date_monitor = tokio::spawn({
        let vehicle_repo = context.vehicle_repo.clone();
        async move {
            if let Err(e) = run_due_date_monitor(vehicle_repo).await {
                tracing::error!("Due date monitor error: {}", e);
            }
        }
    });

    info!("All services started successfully");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        _ = api_server => {
            info!("API server stopped");
        }
        _ = due_date_monitor => {
            info!("Due date monitor stopped");
        }
    }

    info!("Shutting down...");

    Ok(())
}
