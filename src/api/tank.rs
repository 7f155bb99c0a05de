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
use crate::application::ports::repositories::TankRepository;
use crate::db::models::CreateTankRefill;
use crate::infrastructure::logging::{TraceContext, Timer};
use crate::state::AppContext;

const REFILL_LIMIT: i64 = 500;

pub fn tank_routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(tank_status))
        .route("/refills", get(list_refills).post(create_refill))
        .route("/refills/{id}", delete(delete_refill))
}

async fn tank_status(State(ctx): State<AppContext>, headers: HeaderMap) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();

    ctx.logger.api_entry(&trace_id, "GET", "/api/tank", "");

    match ctx.tank_service.status(&trace_id).await {
        Ok(status) => {
            ctx.logger
                .api_exit(&trace_id, "GET", "/api/tank", timer.elapsed_ms(), 200);
            (StatusCode::OK, Json(status)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to read tank status: {}", trace_id, e);
            ctx.logger
                .api_exit(&trace_id, "GET", "/api/tank", timer.elapsed_ms(), 500);
            let (status, body) = error_response(&e);
            (status, body).into_response()
        }
    }
}

async fn list_refills(State(ctx): State<AppContext>, headers: HeaderMap) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();

    ctx.logger.api_entry(&trace_id, "GET", "/api/tank/refills", "");

    match ctx.tank_repo.list_refills(REFILL_LIMIT).await {
        Ok(refills) => {
            ctx.logger
                .api_exit(&trace_id, "GET", "/api/tank/refills", timer.elapsed_ms(), 200);
            (StatusCode::OK, Json(refills)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to list tank refills: {}", trace_id, e);
            ctx.logger
                .api_exit(&trace_id, "GET", "/api/tank/refills", timer.elapsed_ms(), 500);
            let (status, body) = error_response(&e);
            (status, body).into_response()
        }
    }
}

#[derive(Deserialize)]
struct CreateRefillRequest {
    liters: f64,
    unit_price: Option<f64>,
    note: Option<String>,
    refilled_at: String,
}

async fn create_refill(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<CreateRefillRequest>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();

    ctx.logger.api_entry(
        &trace_id,
        "POST",
        "/api/tank/refills",
        &format!("liters={}", req.liters),
    );

    let create = CreateTankRefill {
        liters: req.liters,
        unit_price: req.unit_price,
        total_cost: None,
        note: req.note,
        refilled_at: req.refilled_at,
    };

    match ctx.tank_service.record_refill(&trace_id, create).await {
        Ok(refill) => {
            ctx.logger
                .api_exit(&trace_id, "POST", "/api/tank/refills", timer.elapsed_ms(), 201);
            (StatusCode::CREATED, Json(refill)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to record tank refill: {}", trace_id, e);
            let (status, body) = error_response(&e);
            ctx.logger.api_exit(
                &trace_id,
                "POST",
                "/api/tank/refills",
                timer.elapsed_ms(),
                status.as_u16(),
            );
            (status, body).into_response()
        }
    }
}

async fn delete_refill(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();
    let path = format!("/api/tank/refills/{}", id);

    ctx.logger
        .api_entry(&trace_id, "DELETE", &path, &format!("refill_id={}", id));

    match ctx.tank_service.delete_refill(&trace_id, id).await {
        Ok(()) => {
            ctx.logger
                .api_exit(&trace_id, "DELETE", &path, timer.elapsed_ms(), 200);
            (
                StatusCode::OK,
                Json(serde_json::json!({"message": "refill deleted, liters removed from stock"})),
            )
                .into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to delete tank refill: {}", trace_id, e);
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
