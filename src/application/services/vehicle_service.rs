use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::application::ports::repositories::{
    FuelEntryRepository, MaintenanceRepository, VehicleRepository,
};
use crate::application::services::blank_to_none;
use crate::datefmt;
use crate::db::models::{CreateVehicle, UpdateVehicleDetails, Vehicle};
use crate::errors::AppError;
use crate::infrastructure::logging::{BoundaryLogger, Timer};

/// Vehicle lifecycle: registration, detail updates, and removal together
/// with the vehicle's fuel and maintenance history.
pub struct VehicleService<VR, FR, MR>
where
    VR: VehicleRepository,
    FR: FuelEntryRepository,
    MR: MaintenanceRepository,
{
    vehicle_repo: Arc<VR>,
    fuel_repo: Arc<FR>,
    maintenance_repo: Arc<MR>,
    logger: Arc<BoundaryLogger>,
}

impl<VR, FR, MR> VehicleService<VR, FR, MR>
where
    VR: VehicleRepository,
    FR: FuelEntryRepository,
    MR: MaintenanceRepository,
{
    pub fn new(
        vehicle_repo: Arc<VR>,
        fuel_repo: Arc<FR>,
        maintenance_repo: Arc<MR>,
        logger: Arc<BoundaryLogger>,
    ) -> Self {
        Self {
            vehicle_repo,
            fuel_repo,
            maintenance_repo,
            logger,
        }
    }

    /// Register a vehicle. Plate is trimmed and upper-cased; duplicate
    /// plates are rejected.
    pub async fn create_vehicle(&self, trace_id: &str, input: CreateVehicle) -> Result<Vehicle> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "VehicleService", "create_vehicle", &input.plate);

        let plate = input.plate.trim().to_uppercase();
        let model = input.model.trim().to_string();

        if plate.is_empty() {
            return Err(AppError::validation("plate is required"));
        }
        if model.is_empty() {
            return Err(AppError::validation("model is required"));
        }
        if input.current_km < 0 {
            return Err(AppError::validation("current_km cannot be negative"));
        }

        let inspection_due = blank_to_none(input.inspection_due);
        let service_due = blank_to_none(input.service_due);
        validate_due_dates(&inspection_due, &service_due)?;

        self.logger
            .repo_call(trace_id, "VehicleService", "VehicleRepo", "get_by_plate");
        let repo_timer = Timer::start();
        let existing = self.vehicle_repo.get_by_plate(&plate).await?;
        self.logger.repo_done(
            trace_id,
            "VehicleService",
            "VehicleRepo",
            "get_by_plate",
            repo_timer.elapsed_ms(),
        );

        if existing.is_some() {
            return Err(AppError::conflict(format!(
                "plate {} is already registered",
                plate
            )));
        }

        let create = CreateVehicle {
            plate,
            model,
            current_km: input.current_km,
            model_year: input.model_year,
            inspection_due,
            service_due,
            driver: blank_to_none(input.driver),
        };

        self.logger
            .repo_call(trace_id, "VehicleService", "VehicleRepo", "create");
        let repo_timer = Timer::start();
        let vehicle = self.vehicle_repo.create(create).await?;
        self.logger.repo_done(
            trace_id,
            "VehicleService",
            "VehicleRepo",
            "create",
            repo_timer.elapsed_ms(),
        );

        info!("[{}] Vehicle {} registered", trace_id, vehicle.plate);

        self.logger.service_exit(
            trace_id,
            "VehicleService",
            "create_vehicle",
            timer.elapsed_ms(),
        );
        Ok(vehicle)
    }

    /// Update the detail fields only; plate, model and odometer are
    /// managed elsewhere.
    pub async fn update_details(
        &self,
        trace_id: &str,
        id: i64,
        details: UpdateVehicleDetails,
    ) -> Result<Vehicle> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "VehicleService", "update_details", &id);

        self.vehicle_repo
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("vehicle"))?;

        let details = UpdateVehicleDetails {
            model_year: details.model_year,
            inspection_due: blank_to_none(details.inspection_due),
            service_due: blank_to_none(details.service_due),
            driver: blank_to_none(details.driver),
        };
        validate_due_dates(&details.inspection_due, &details.service_due)?;

        self.logger
            .repo_call(trace_id, "VehicleService", "VehicleRepo", "update_details");
        let repo_timer = Timer::start();
        self.vehicle_repo.update_details(id, details).await?;
        self.logger.repo_done(
            trace_id,
            "VehicleService",
            "VehicleRepo",
            "update_details",
            repo_timer.elapsed_ms(),
        );

        let vehicle = self
            .vehicle_repo
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("vehicle"))?;

        self.logger.service_exit(
            trace_id,
            "VehicleService",
            "update_details",
            timer.elapsed_ms(),
        );
        Ok(vehicle)
    }

    /// Remove a vehicle together with its fuel entries and maintenance
    /// records. Tank stock is left untouched.
    pub async fn delete_vehicle(&self, trace_id: &str, id: i64) -> Result<()> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "VehicleService", "delete_vehicle", &id);

        let vehicle = self
            .vehicle_repo
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("vehicle"))?;

        self.logger
            .repo_call(trace_id, "VehicleService", "FuelRepo", "delete_by_vehicle");
        let fuel_removed = self.fuel_repo.delete_by_vehicle(id).await?;

        self.logger.repo_call(
            trace_id,
            "VehicleService",
            "MaintenanceRepo",
            "delete_by_vehicle",
        );
        let maintenance_removed = self.maintenance_repo.delete_by_vehicle(id).await?;

        self.logger
            .repo_call(trace_id, "VehicleService", "VehicleRepo", "delete");
        self.vehicle_repo.delete(id).await?;

        info!(
            "[{}] Vehicle {} deleted ({} fuel entries, {} maintenance records)",
            trace_id, vehicle.plate, fuel_removed, maintenance_removed
        );

        self.logger.service_exit(
            trace_id,
            "VehicleService",
            "delete_vehicle",
            timer.elapsed_ms(),
        );
        Ok(())
    }
}

fn validate_due_dates(
    inspection_due: &Option<String>,
    service_due: &Option<String>,
) -> Result<()> {
    for (label, stored) in [("inspection_due", inspection_due), ("service_due", service_due)] {
        if let Some(date) = stored {
            if datefmt::parse_date(date).is_none() {
                return Err(AppError::validation(format!(
                    "{} must be YYYY-MM-DD, got '{}'",
                    label, date
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::CreateFuelEntry;
    use crate::application::ports::repositories::TankRepository;
    use crate::infrastructure::database::{
        SqliteFuelEntryRepository, SqliteMaintenanceRepository, SqliteTankRepository,
        SqliteVehicleRepository,
    };
    use sqlx::SqlitePool;

    async fn service() -> (
        VehicleService<SqliteVehicleRepository, SqliteFuelEntryRepository, SqliteMaintenanceRepository>,
        SqlitePool,
    ) {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        let svc = VehicleService::new(
            Arc::new(SqliteVehicleRepository::new(pool.clone())),
            Arc::new(SqliteFuelEntryRepository::new(pool.clone())),
            Arc::new(SqliteMaintenanceRepository::new(pool.clone())),
            Arc::new(BoundaryLogger::new()),
        );
        (svc, pool)
    }

    fn input(plate: &str) -> CreateVehicle {
        CreateVehicle {
            plate: plate.to_string(),
            model: "Transit".to_string(),
            current_km: 50_000,
            model_year: None,
            inspection_due: None,
            service_due: None,
            driver: None,
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_plate() {
        let (svc, _pool) = service().await;
        let v = svc.create_vehicle("t", input("  34 abc 123 ")).await.unwrap();
        assert_eq!(v.plate, "34 ABC 123");
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_plate() {
        let (svc, _pool) = service().await;
        svc.create_vehicle("t", input("34 ABC 123")).await.unwrap();

        let err = svc
            .create_vehicle("t", input("34 abc 123"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_km_and_blank_plate() {
        let (svc, _pool) = service().await;

        let mut bad_km = input("34 ABC 123");
        bad_km.current_km = -1;
        assert!(matches!(
            svc.create_vehicle("t", bad_km)
                .await
                .unwrap_err()
                .downcast_ref::<AppError>(),
            Some(AppError::Validation(_))
        ));

        assert!(matches!(
            svc.create_vehicle("t", input("   "))
                .await
                .unwrap_err()
                .downcast_ref::<AppError>(),
            Some(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_due_date() {
        let (svc, _pool) = service().await;
        let mut bad = input("34 ABC 123");
        bad.inspection_due = Some("15-01-2027".to_string());
        assert!(matches!(
            svc.create_vehicle("t", bad)
                .await
                .unwrap_err()
                .downcast_ref::<AppError>(),
            Some(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_details_requires_vehicle() {
        let (svc, _pool) = service().await;
        let err = svc
            .update_details(
                "t",
                99,
                UpdateVehicleDetails {
                    model_year: None,
                    inspection_due: None,
                    service_due: None,
                    driver: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_history_but_not_tank_stock() {
        let (svc, pool) = service().await;
        let fuel = SqliteFuelEntryRepository::new(pool.clone());
        let tank = SqliteTankRepository::new(pool.clone());

        let v = svc.create_vehicle("t", input("34 ABC 123")).await.unwrap();
        fuel.create(CreateFuelEntry {
            vehicle_id: v.id,
            km: 50_100,
            liters: 40.0,
            note: None,
            filled_at: "2026-08-01 09:00".to_string(),
        })
        .await
        .unwrap();
        tank.adjust_stock(-40.0).await.unwrap();

        svc.delete_vehicle("t", v.id).await.unwrap();

        let (entries,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM fuel_entries")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(entries, 0);

        // Bulk removal is bookkeeping, not un-dispensing
        let status = tank.status().await.unwrap();
        assert!((status.current_liters - (-40.0)).abs() < 1e-9);
    }
}
