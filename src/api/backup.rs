use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::api::error_response;
use crate::infrastructure::database::backup_to;
use crate::infrastructure::logging::{TraceContext, Timer};
use crate::state::AppContext;

#[derive(Deserialize)]
pub struct BackupRequest {
    /// Target file path; defaults to <data_dir>/backups/fleet-fuel_<ts>.db
    pub destination: Option<String>,
}

pub async fn create_backup(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<BackupRequest>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();

    ctx.logger.api_entry(
        &trace_id,
        "POST",
        "/api/backup",
        &format!("destination={:?}", req.destination),
    );

    let destination = match req.destination {
        Some(path) if path.trim().is_empty() => {
            ctx.logger
                .api_exit(&trace_id, "POST", "/api/backup", timer.elapsed_ms(), 400);
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "destination cannot be empty"})),
            )
                .into_response();
        }
        Some(path) => PathBuf::from(path.trim()),
        None => ctx.data_dir.join("backups").join(format!(
            "fleet-fuel_{}.db",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        )),
    };

    ctx.logger
        .external_call(&trace_id, "BackupHandler", "Sqlite", "vacuum_into");
    let backup_timer = Timer::start();

    match backup_to(&ctx.pool, &destination).await {
        Ok(()) => {
            ctx.logger.external_done(
                &trace_id,
                "BackupHandler",
                "Sqlite",
                "vacuum_into",
                backup_timer.elapsed_ms(),
            );
            info!("[{}] Database backed up to {:?}", trace_id, destination);
            ctx.logger
                .api_exit(&trace_id, "POST", "/api/backup", timer.elapsed_ms(), 200);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "message": "backup created",
                    "destination": destination.display().to_string()
                })),
            )
                .into_response()
        }
        Err(e) => {
            warn!("[{}] Backup failed: {}", trace_id, e);
            let (status, body) = error_response(&e);
            ctx.logger.api_exit(
                &trace_id,
                "POST",
                "/api/backup",
                timer.elapsed_ms(),
                status.as_u16(),
            );
            (status, body).into_response()
        }
    }
}
