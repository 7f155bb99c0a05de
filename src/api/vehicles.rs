use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::{error_response, maintenance};
use crate::application::ports::repositories::{FuelEntryRepository, VehicleRepository};
use crate::datefmt;
use crate::db::models::{CreateVehicle, FuelEntry, UpdateVehicleDetails, Vehicle, VehicleAlert};
use crate::infrastructure::logging::{TraceContext, Timer};
use crate::state::AppContext;

/// Recent fuel entries shown on the vehicle detail view
const DETAIL_FUEL_LIMIT: i64 = 50;

pub fn vehicles_routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route(
            "/{id}",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/{id}/fuel-entries", get(vehicle_fuel_entries))
        .route(
            "/{id}/maintenance",
            get(maintenance::list_for_vehicle).post(maintenance::create_for_vehicle),
        )
}

/// Vehicle response with its due-date alerts
#[derive(Serialize)]
struct VehicleWithAlerts {
    #[serde(flatten)]
    vehicle: Vehicle,
    alerts: Vec<VehicleAlert>,
}

/// Detail response: alerts plus the latest fuel entries
#[derive(Serialize)]
struct VehicleDetail {
    #[serde(flatten)]
    vehicle: Vehicle,
    alerts: Vec<VehicleAlert>,
    recent_fuel_entries: Vec<FuelEntry>,
}

async fn list_vehicles(State(ctx): State<AppContext>, headers: HeaderMap) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();

    ctx.logger.api_entry(&trace_id, "GET", "/api/vehicles", "");

    match ctx.vehicle_repo.list().await {
        Ok(vehicles) => {
            let today = datefmt::today();
            let with_alerts: Vec<VehicleWithAlerts> = vehicles
                .into_iter()
                .map(|vehicle| VehicleWithAlerts {
                    alerts: vehicle.alerts(today),
                    vehicle,
                })
                .collect();
            ctx.logger
                .api_exit(&trace_id, "GET", "/api/vehicles", timer.elapsed_ms(), 200);
            (StatusCode::OK, Json(with_alerts)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to list vehicles: {}", trace_id, e);
            ctx.logger
                .api_exit(&trace_id, "GET", "/api/vehicles", timer.elapsed_ms(), 500);
            let (status, body) = error_response(&e);
            (status, body).into_response()
        }
    }
}

async fn get_vehicle(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();
    let path = format!("/api/vehicles/{}", id);

    ctx.logger.api_entry(&trace_id, "GET", &path, "");

    let vehicle = match ctx.vehicle_repo.get(id).await {
        Ok(Some(v)) => v,
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
    };

    let recent_fuel_entries = match ctx.fuel_repo.list_by_vehicle(id, DETAIL_FUEL_LIMIT).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("[{}] Failed to list fuel entries: {}", trace_id, e);
            ctx.logger
                .api_exit(&trace_id, "GET", &path, timer.elapsed_ms(), 500);
            let (status, body) = error_response(&e);
            return (status, body).into_response();
        }
    };

    let detail = VehicleDetail {
        alerts: vehicle.alerts(datefmt::today()),
        vehicle,
        recent_fuel_entries,
    };

    ctx.logger
        .api_exit(&trace_id, "GET", &path, timer.elapsed_ms(), 200);
    (StatusCode::OK, Json(detail)).into_response()
}

#[derive(Deserialize)]
struct CreateVehicleRequest {
    plate: String,
    model: String,
    current_km: i64,
    model_year: Option<i64>,
    inspection_due: Option<String>,
    service_due: Option<String>,
    driver: Option<String>,
}

async fn create_vehicle(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<CreateVehicleRequest>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();

    ctx.logger.api_entry(
        &trace_id,
        "POST",
        "/api/vehicles",
        &format!("plate={}", req.plate),
    );

    let create = CreateVehicle {
        plate: req.plate,
        model: req.model,
        current_km: req.current_km,
        model_year: req.model_year,
        inspection_due: req.inspection_due,
        service_due: req.service_due,
        driver: req.driver,
    };

    match ctx.vehicle_service.create_vehicle(&trace_id, create).await {
        Ok(vehicle) => {
            ctx.logger
                .api_exit(&trace_id, "POST", "/api/vehicles", timer.elapsed_ms(), 201);
            (StatusCode::CREATED, Json(vehicle)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to create vehicle: {}", trace_id, e);
            let (status, body) = error_response(&e);
            ctx.logger.api_exit(
                &trace_id,
                "POST",
                "/api/vehicles",
                timer.elapsed_ms(),
                status.as_u16(),
            );
            (status, body).into_response()
        }
    }
}

#[derive(Deserialize)]
struct UpdateVehicleRequest {
    model_year: Option<i64>,
    inspection_due: Option<String>,
    service_due: Option<String>,
    driver: Option<String>,
}

async fn update_vehicle(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<UpdateVehicleRequest>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();
    let path = format!("/api/vehicles/{}", id);

    ctx.logger
        .api_entry(&trace_id, "PUT", &path, &format!("vehicle_id={}", id));

    let details = UpdateVehicleDetails {
        model_year: req.model_year,
        inspection_due: req.inspection_due,
        service_due: req.service_due,
        driver: req.driver,
    };

    match ctx
        .vehicle_service
        .update_details(&trace_id, id, details)
        .await
    {
        Ok(vehicle) => {
            ctx.logger
                .api_exit(&trace_id, "PUT", &path, timer.elapsed_ms(), 200);
            (StatusCode::OK, Json(vehicle)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to update vehicle: {}", trace_id, e);
            let (status, body) = error_response(&e);
            ctx.logger
                .api_exit(&trace_id, "PUT", &path, timer.elapsed_ms(), status.as_u16());
            (status, body).into_response()
        }
    }
}

async fn delete_vehicle(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();
    let path = format!("/api/vehicles/{}", id);

    ctx.logger
        .api_entry(&trace_id, "DELETE", &path, &format!("vehicle_id={}", id));

    match ctx.vehicle_service.delete_vehicle(&trace_id, id).await {
        Ok(()) => {
            ctx.logger
                .api_exit(&trace_id, "DELETE", &path, timer.elapsed_ms(), 200);
            (
                StatusCode::OK,
                Json(serde_json::json!({"message": "vehicle and its records deleted"})),
            )
                .into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to delete vehicle: {}", trace_id, e);
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

async fn vehicle_fuel_entries(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let trace_id = TraceContext::extract_or_generate(&headers);
    let timer = Timer::start();
    let path = format!("/api/vehicles/{}/fuel-entries", id);

    ctx.logger.api_entry(&trace_id, "GET", &path, "");

    match ctx.vehicle_repo.get(id).await {
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

    match ctx.fuel_repo.list_by_vehicle(id, DETAIL_FUEL_LIMIT).await {
        Ok(entries) => {
            ctx.logger
                .api_exit(&trace_id, "GET", &path, timer.elapsed_ms(), 200);
            (StatusCode::OK, Json(entries)).into_response()
        }
        Err(e) => {
            warn!("[{}] Failed to list fuel entries: {}", trace_id, e);
            ctx.logger
                .api_exit(&trace_id, "GET", &path, timer.elapsed_ms(), 500);
            let (status, body) = error_response(&e);
            (status, body).into_response()
        }
    }
}
