use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::put,
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

use crate::api::error_response;
use crate::application::ports::repositories::{MaintenanceRepository, VehicleRepository};
use crate::db::models::{CreateMaintenanceRecord, UpdateMaintenanceRecord};
use crate::infrastructure::logging::{TraceContext, Timer};
use crate::state::AppContext;

const RECORD_LIMIT: i64 = 500;

/// Routes for record-level operations; listing and creation are nested
/// under /vehicles/{id}/maintenance.
pub fn maintenance_routes() -> Router<AppContext> {
    Router::new().route("/{id}", put(update_record).delete(delete_record))
}

#[derive(Deserialize)]
pub struct MaintenanceRequest {
    performed_on: String,
    performed_at: Option<String>,
    fault: Option<String>,
    work_done: Option<String>,
    #[serde(default)]
    parts_cost: f64,
    #[serde(default)]
    labor_cost: f64,
    note: Option<String>,
}

pub async fn list_for_vehicle(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(vehicle_id): Path<i64>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();
    let path = format!("/api/vehicles/{}/maintenance", vehicle_id);

    ctx.logger.api_entry(&trace_id, "GET", &path, "");

    match ctx.vehicle_repo.get(vehicle_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            ctx.logger
                .api_exit(&trace_id, "GET", &path, timer.elapsed_ms(), 404);
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "vehicle not found"})),
            )
                .into_response();
        }
        Err(e) => {
            warn!("[{}] Failed to get vehicle: {}", trace_id, e);
            ctx.logger
                .api_exit(&trace_id, "GET", &path, timer.elapsed_ms(), 500);
            let (status, body) = error_response(&e);
            return (status, body).into_response();
        }
    }

    match ctx
        .maintenance_repo
        .list_by_vehicle(vehicle_id, RECORD_LIMIT)
        .await
    {
        Ok(records) => {
            ctx.logger
                .api_exit(&trace_id, "GET", &path, timer.elapsed_ms(), 200);
            (StatusCode::OK, Json(records)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to list maintenance records: {}", trace_id, e);
            ctx.logger
                .api_exit(&trace_id, "GET", &path, timer.elapsed_ms(), 500);
            let (status, body) = error_response(&e);
            (status, body).into_response()
        }
    }
}

pub async fn create_for_vehicle(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(vehicle_id): Path<i64>,
    Json(req): Json<MaintenanceRequest>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();
    let path = format!("/api/vehicles/{}/maintenance", vehicle_id);

    ctx.logger
        .api_entry(&trace_id, "POST", &path, &format!("vehicle_id={}", vehicle_id));

    let create = CreateMaintenanceRecord {
        vehicle_id,
        performed_on: req.performed_on,
        performed_at: req.performed_at,
        fault: req.fault,
        work_done: req.work_done,
        parts_cost: req.parts_cost,
        labor_cost: req.labor_cost,
        total_cost: 0.0, // recomputed by the service
        note: req.note,
    };

    match ctx.maintenance_service.add_record(&trace_id, create).await {
        Ok(record) => {
            ctx.logger
                .api_exit(&trace_id, "POST", &path, timer.elapsed_ms(), 201);
            (StatusCode::CREATED, Json(record)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to add maintenance record: {}", trace_id, e);
            let (status, body) = error_response(&e);
            ctx.logger
                .api_exit(&trace_id, "POST", &path, timer.elapsed_ms(), status.as_u16());
            (status, body).into_response()
        }
    }
}

async fn update_record(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<MaintenanceRequest>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();
    let path = format!("/api/maintenance/{}", id);

    ctx.logger
        .api_entry(&trace_id, "PUT", &path, &format!("record_id={}", id));

    let update = UpdateMaintenanceRecord {
        performed_on: req.performed_on,
        performed_at: req.performed_at,
        fault: req.fault,
        work_done: req.work_done,
        parts_cost: req.parts_cost,
        labor_cost: req.labor_cost,
        total_cost: 0.0, // recomputed by the service
        note: req.note,
    };

    match ctx
        .maintenance_service
        .update_record(&trace_id, id, update)
        .await
    {
        Ok(record) => {
            ctx.logger
                .api_exit(&trace_id, "PUT", &path, timer.elapsed_ms(), 200);
            (StatusCode::OK, Json(record)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to update maintenance record: {}", trace_id, e);
            let (status, body) = error_response(&e);
            ctx.logger
                .api_exit(&trace_id, "PUT", &path, timer.elapsed_ms(), status.as_u16());
            (status, body).into_response()
        }
    }
}

async fn delete_record(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();
    let path = format!("/api/maintenance/{}", id);

    ctx.logger
        .api_entry(&trace_id, "DELETE", &path, &format!("record_id={}", id));

    match ctx.maintenance_service.delete_record(&trace_id, id).await {
        Ok(()) => {
            ctx.logger
                .api_exit(&trace_id, "DELETE", &path, timer.elapsed_ms(), 200);
            (
                StatusCode::OK,
                Json(serde_json::json!({"message": "maintenance record deleted"})),
            )
                .into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to delete maintenance record: {}", trace_id, e);
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
