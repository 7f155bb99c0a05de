use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::application::ports::repositories::{MaintenanceRepository, VehicleRepository};
use crate::application::services::blank_to_none;
use crate::datefmt;
use crate::db::models::{CreateMaintenanceRecord, MaintenanceRecord, UpdateMaintenanceRecord};
use crate::errors::AppError;
use crate::infrastructure::logging::{BoundaryLogger, Timer};

/// Maintenance and repair bookkeeping. The total is always recomputed
/// from the parts and labor components.
pub struct MaintenanceService<MR, VR>
where
    MR: MaintenanceRepository,
    VR: VehicleRepository,
{
    maintenance_repo: Arc<MR>,
    vehicle_repo: Arc<VR>,
    logger: Arc<BoundaryLogger>,
}

impl<MR, VR> MaintenanceService<MR, VR>
where
    MR: MaintenanceRepository,
    VR: VehicleRepository,
{
    pub fn new(
        maintenance_repo: Arc<MR>,
        vehicle_repo: Arc<VR>,
        logger: Arc<BoundaryLogger>,
    ) -> Self {
        Self {
            maintenance_repo,
            vehicle_repo,
            logger,
        }
    }

    pub async fn add_record(
        &self,
        trace_id: &str,
        input: CreateMaintenanceRecord,
    ) -> Result<MaintenanceRecord> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "MaintenanceService", "add_record", &input.vehicle_id);

        self.vehicle_repo
            .get(input.vehicle_id)
            .await?
            .ok_or_else(|| AppError::not_found("vehicle"))?;

        let performed_at = blank_to_none(input.performed_at);
        validate_schedule(&input.performed_on, &performed_at)?;
        validate_costs(input.parts_cost, input.labor_cost)?;

        let create = CreateMaintenanceRecord {
            performed_at,
            fault: blank_to_none(input.fault),
            work_done: blank_to_none(input.work_done),
            total_cost: input.parts_cost + input.labor_cost,
            note: blank_to_none(input.note),
            ..input
        };

        self.logger
            .repo_call(trace_id, "MaintenanceService", "MaintenanceRepo", "create");
        let repo_timer = Timer::start();
        let record = self.maintenance_repo.create(create).await?;
        self.logger.repo_done(
            trace_id,
            "MaintenanceService",
            "MaintenanceRepo",
            "create",
            repo_timer.elapsed_ms(),
        );

        info!(
            "[{}] Maintenance record {} added for vehicle {}",
            trace_id, record.id, record.vehicle_id
        );

        self.logger.service_exit(
            trace_id,
            "MaintenanceService",
            "add_record",
            timer.elapsed_ms(),
        );
        Ok(record)
    }

    pub async fn update_record(
        &self,
        trace_id: &str,
        id: i64,
        input: UpdateMaintenanceRecord,
    ) -> Result<MaintenanceRecord> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "MaintenanceService", "update_record", &id);

        self.maintenance_repo
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("maintenance record"))?;

        let performed_at = blank_to_none(input.performed_at);
        validate_schedule(&input.performed_on, &performed_at)?;
        validate_costs(input.parts_cost, input.labor_cost)?;

        let update = UpdateMaintenanceRecord {
            performed_at,
            fault: blank_to_none(input.fault),
            work_done: blank_to_none(input.work_done),
            total_cost: input.parts_cost + input.labor_cost,
            note: blank_to_none(input.note),
            ..input
        };

        self.logger
            .repo_call(trace_id, "MaintenanceService", "MaintenanceRepo", "update");
        let repo_timer = Timer::start();
        let record = self.maintenance_repo.update(id, update).await?;
        self.logger.repo_done(
            trace_id,
            "MaintenanceService",
            "MaintenanceRepo",
            "update",
            repo_timer.elapsed_ms(),
        );

        self.logger.service_exit(
            trace_id,
            "MaintenanceService",
            "update_record",
            timer.elapsed_ms(),
        );
        Ok(record)
    }

    pub async fn delete_record(&self, trace_id: &str, id: i64) -> Result<()> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "MaintenanceService", "delete_record", &id);

        self.maintenance_repo
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("maintenance record"))?;

        self.logger
            .repo_call(trace_id, "MaintenanceService", "MaintenanceRepo", "delete");
        self.maintenance_repo.delete(id).await?;

        info!("[{}] Maintenance record {} deleted", trace_id, id);

        self.logger.service_exit(
            trace_id,
            "MaintenanceService",
            "delete_record",
            timer.elapsed_ms(),
        );
        Ok(())
    }
}

fn validate_schedule(performed_on: &str, performed_at: &Option<String>) -> Result<()> {
    if datefmt::parse_date(performed_on).is_none() {
        return Err(AppError::validation(format!(
            "performed_on must be YYYY-MM-DD, got '{}'",
            performed_on
        )));
    }
    if let Some(time) = performed_at {
        if datefmt::parse_time(time).is_none() {
            return Err(AppError::validation(format!(
                "performed_at must be HH:MM, got '{}'",
                time
            )));
        }
    }
    Ok(())
}

fn validate_costs(parts_cost: f64, labor_cost: f64) -> Result<()> {
    for (label, cost) in [("parts_cost", parts_cost), ("labor_cost", labor_cost)] {
        if !(cost >= 0.0 && cost.is_finite()) {
            return Err(AppError::validation(format!("{} cannot be negative", label)));
        }
    }
    Ok(())
}
