use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

use crate::api::error_response;
use crate::infrastructure::logging::{TraceContext, Timer};
use crate::state::AppContext;

pub fn reports_routes() -> Router<AppContext> {
    Router::new()
        .route("/fuel", get(fuel_report))
        .route("/consumption", get(consumption_report))
        .route("/export", get(export_report))
}

#[derive(Deserialize)]
struct FuelReportQuery {
    vehicle_id: Option<i64>,
    month: Option<String>,
}

async fn fuel_report(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Query(query): Query<FuelReportQuery>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();

    ctx.logger.api_entry(
        &trace_id,
        "GET",
        "/api/reports/fuel",
        &format!("vehicle_id={:?} month={:?}", query.vehicle_id, query.month),
    );

    match ctx
        .report_service
        .fuel_report(&trace_id, query.vehicle_id, query.month.as_deref())
        .await
    {
        Ok(entries) => {
            ctx.logger
                .api_exit(&trace_id, "GET", "/api/reports/fuel", timer.elapsed_ms(), 200);
            (StatusCode::OK, Json(entries)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to build fuel report: {}", trace_id, e);
            let (status, body) = error_response(&e);
            ctx.logger.api_exit(
                &trace_id,
                "GET",
                "/api/reports/fuel",
                timer.elapsed_ms(),
                status.as_u16(),
            );
            (status, body).into_response()
        }
    }
}

#[derive(Deserialize)]
struct ConsumptionQuery {
    vehicle_id: i64,
}

async fn consumption_report(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Query(query): Query<ConsumptionQuery>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();

    ctx.logger.api_entry(
        &trace_id,
        "GET",
        "/api/reports/consumption",
        &format!("vehicle_id={}", query.vehicle_id),
    );

    match ctx
        .report_service
        .consumption(&trace_id, query.vehicle_id)
        .await
    {
        Ok(report) => {
            ctx.logger.api_exit(
                &trace_id,
                "GET",
                "/api/reports/consumption",
                timer.elapsed_ms(),
                200,
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to build consumption report: {}", trace_id, e);
            let (status, body) = error_response(&e);
            ctx.logger.api_exit(
                &trace_id,
                "GET",
                "/api/reports/consumption",
                timer.elapsed_ms(),
                status.as_u16(),
            );
            (status, body).into_response()
        }
    }
}

async fn export_report(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Query(query): Query<FuelReportQuery>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();

    ctx.logger.api_entry(
        &trace_id,
        "GET",
        "/api/reports/export",
        &format!("vehicle_id={:?} month={:?}", query.vehicle_id, query.month),
    );

    match ctx
        .report_service
        .export_csv(&trace_id, query.vehicle_id, query.month.as_deref())
        .await
    {
        Ok(bytes) => {
            let filename = format!(
                "fuel_report_{}.csv",
                chrono::Local::now().format("%Y%m%d_%H%M%S")
            );
            ctx.logger.api_exit(
                &trace_id,
                "GET",
                "/api/reports/export",
                timer.elapsed_ms(),
                200,
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to export fuel report: {}", trace_id, e);
            let (status, body) = error_response(&e);
            ctx.logger.api_exit(
                &trace_id,
                "GET",
                "/api/reports/export",
                timer.elapsed_ms(),
                status.as_u16(),
            );
            (status, body).into_response()
        }
    }
}
