use anyhow::Result;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::application::ports::repositories::VehicleRepository;
use crate::datefmt;
use crate::infrastructure::database::SqliteVehicleRepository;

/// Run the due-date monitor.
/// Scans all vehicles every 6 hours (and once at startup) and logs a
/// warning for each overdue or approaching inspection/service date.
pub async fn run_due_date_monitor(vehicle_repo: Arc<SqliteVehicleRepository>) -> Result<()> {
    let mut scan_interval = interval(Duration::from_secs(6 * 3600));

    info!("Due date monitor started");

    loop {
        scan_interval.tick().await;

        let vehicles = match vehicle_repo.list().await {
            Ok(vehicles) => vehicles,
            Err(e) => {
                warn!("Due date scan failed to list vehicles: {}", e);
                continue;
            }
        };

        let today = datefmt::today();
        let mut alert_count = 0;

        for vehicle in &vehicles {
            for alert in vehicle.alerts(today) {
                alert_count += 1;
                warn!(
                    plate = %vehicle.plate,
                    kind = %alert.kind,
                    due = %alert.due,
                    "Vehicle {}: {}",
                    vehicle.plate, alert.message
                );
            }
        }

        if alert_count > 0 {
            info!(
                "Due date scan: {} alert(s) across {} vehicle(s)",
                alert_count,
                vehicles.len()
            );
        }
    }
}
