mod backup;
mod fuel;
mod maintenance;
mod reports;
mod tank;
mod vehicles;
pub mod middleware;

pub use middleware::TraceIdLayer;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use crate::errors::AppError;
use crate::state::AppContext;

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .nest("/vehicles", vehicles::vehicles_routes())
        .nest("/fuel-entries", fuel::fuel_routes())
        .nest("/tank", tank::tank_routes())
        .nest("/maintenance", maintenance::maintenance_routes())
        .nest("/reports", reports::reports_routes())
        .route("/backup", post(backup::create_backup))
}

/// Maps service failures to a status code and a JSON error body.
pub(crate) fn error_response(err: &anyhow::Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err.downcast_ref::<AppError>() {
        Some(AppError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(AppError::NotFound(_)) => StatusCode::NOT_FOUND,
        Some(AppError::Conflict(_)) => StatusCode::CONFLICT,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_maps_domain_errors() {
        let (status, _) = error_response(&AppError::validation("bad"));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = error_response(&AppError::not_found("vehicle"));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = error_response(&AppError::conflict("duplicate"));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = error_response(&anyhow::anyhow!("disk on fire"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
