pub mod fuel_service;
pub mod maintenance_service;
pub mod report_service;
pub mod tank_service;
pub mod vehicle_service;

pub use fuel_service::FuelService;
pub use maintenance_service::MaintenanceService;
pub use report_service::{ConsumptionPoint, ConsumptionReport, ReportService};
pub use tank_service::TankService;
pub use vehicle_service::VehicleService;

/// Optional text inputs arrive as empty strings from form-style clients;
/// store them as NULL instead.
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
