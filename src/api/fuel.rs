use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

use crate::api::error_response;
use crate::application::ports::repositories::FuelEntryRepository;
use crate::db::models::CreateFuelEntry;
use crate::infrastructure::logging::{TraceContext, Timer};
use crate::state::AppContext;

/// Fleet-wide listing cap
const RECENT_LIMIT: i64 = 500;

pub fn fuel_routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(list_fuel_entries).post(create_fuel_entry))
        .route("/{id}", delete(delete_fuel_entry))
}

async fn list_fuel_entries(State(ctx): State<AppContext>, headers: HeaderMap) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();

    ctx.logger.api_entry(&trace_id, "GET", "/api/fuel-entries", "");

    match ctx.fuel_repo.list_recent(RECENT_LIMIT).await {
        Ok(entries) => {
            ctx.logger
                .api_exit(&trace_id, "GET", "/api/fuel-entries", timer.elapsed_ms(), 200);
            (StatusCode::OK, Json(entries)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to list fuel entries: {}", trace_id, e);
            ctx.logger
                .api_exit(&trace_id, "GET", "/api/fuel-entries", timer.elapsed_ms(), 500);
            let (status, body) = error_response(&e);
            (status, body).into_response()
        }
    }
}

#[derive(Deserialize)]
struct CreateFuelEntryRequest {
    vehicle_id: i64,
    km: i64,
    liters: f64,
    note: Option<String>,
    filled_at: String,
}

async fn create_fuel_entry(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<CreateFuelEntryRequest>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();

    ctx.logger.api_entry(
        &trace_id,
        "POST",
        "/api/fuel-entries",
        &format!("vehicle_id={} liters={}", req.vehicle_id, req.liters),
    );

    let create = CreateFuelEntry {
        vehicle_id: req.vehicle_id,
        km: req.km,
        liters: req.liters,
        note: req.note,
        filled_at: req.filled_at,
    };

    match ctx.fuel_service.record_fill(&trace_id, create).await {
        Ok(entry) => {
            ctx.logger
                .api_exit(&trace_id, "POST", "/api/fuel-entries", timer.elapsed_ms(), 201);
            (StatusCode::CREATED, Json(entry)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to record fuel entry: {}", trace_id, e);
            let (status, body) = error_response(&e);
            ctx.logger.api_exit(
                &trace_id,
                "POST",
                "/api/fuel-entries",
                timer.elapsed_ms(),
                status.as_u16(),
            );
            (status, body).into_response()
        }
    }
}

async fn delete_fuel_entry(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();
    let path = format!("/api/fuel-entries/{}", id);

    ctx.logger
        .api_entry(&trace_id, "DELETE", &path, &format!("entry_id={}", id));

    match ctx.fuel_service.delete_fill(&trace_id, id).await {
        Ok(()) => {
            ctx.logger
                .api_exit(&trace_id, "DELETE", &path, timer.elapsed_ms(), 200);
            (
                StatusCode::OK,
                Json(serde_json::json!({"message": "fuel entry deleted, liters returned to tank"})),
            )
                .into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to delete fuel entry: {}", trace_id, e);
            let (status, body) = error_response(&e);
            ctx.logger.api_exit(
                &trace_id,
                "DELETE",
                &path,
                timer.elapsed_ms(),
                status.as_u16(),
            );
            (status, body).into_response()
        }
    }
}
