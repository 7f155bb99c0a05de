use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::application::ports::repositories::{
    FuelEntryRepository, TankRepository, VehicleRepository,
};
use crate::application::services::blank_to_none;
use crate::datefmt;
use crate::db::models::{CreateFuelEntry, FuelEntry};
use crate::errors::AppError;
use crate::infrastructure::logging::{BoundaryLogger, Timer};

/// Fuel dispensing: every fill is charged against the shared tank and
/// advances the vehicle's odometer.
pub struct FuelService<FR, VR, TR>
where
    FR: FuelEntryRepository,
    VR: VehicleRepository,
    TR: TankRepository,
{
    fuel_repo: Arc<FR>,
    vehicle_repo: Arc<VR>,
    tank_repo: Arc<TR>,
    logger: Arc<BoundaryLogger>,
}

impl<FR, VR, TR> FuelService<FR, VR, TR>
where
    FR: FuelEntryRepository,
    VR: VehicleRepository,
    TR: TankRepository,
{
    pub fn new(
        fuel_repo: Arc<FR>,
        vehicle_repo: Arc<VR>,
        tank_repo: Arc<TR>,
        logger: Arc<BoundaryLogger>,
    ) -> Self {
        Self {
            fuel_repo,
            vehicle_repo,
            tank_repo,
            logger,
        }
    }

    /// Record a fill: insert the entry, set the vehicle's odometer to the
    /// entry's km reading, and draw the liters from the tank.
    pub async fn record_fill(&self, trace_id: &str, input: CreateFuelEntry) -> Result<FuelEntry> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "FuelService", "record_fill", &input.vehicle_id);

        if input.km < 0 {
            return Err(AppError::validation("km cannot be negative"));
        }
        if !(input.liters > 0.0 && input.liters.is_finite()) {
            return Err(AppError::validation("liters must be positive"));
        }
        if datefmt::parse_timestamp(&input.filled_at).is_none() {
            return Err(AppError::validation(format!(
                "filled_at must be YYYY-MM-DD HH:MM, got '{}'",
                input.filled_at
            )));
        }

        self.logger
            .repo_call(trace_id, "FuelService", "VehicleRepo", "get");
        let vehicle = self
            .vehicle_repo
            .get(input.vehicle_id)
            .await?
            .ok_or_else(|| AppError::not_found("vehicle"))?;

        let create = CreateFuelEntry {
            note: blank_to_none(input.note),
            ..input
        };

        self.logger
            .repo_call(trace_id, "FuelService", "FuelRepo", "create");
        let repo_timer = Timer::start();
        let entry = self.fuel_repo.create(create).await?;
        self.logger.repo_done(
            trace_id,
            "FuelService",
            "FuelRepo",
            "create",
            repo_timer.elapsed_ms(),
        );

        self.logger
            .repo_call(trace_id, "FuelService", "VehicleRepo", "update_current_km");
        self.vehicle_repo
            .update_current_km(entry.vehicle_id, entry.km)
            .await?;

        self.logger
            .repo_call(trace_id, "FuelService", "TankRepo", "adjust_stock");
        self.tank_repo.adjust_stock(-entry.liters).await?;

        info!(
            "[{}] Recorded {:.2}L fill for {} at {} km",
            trace_id, entry.liters, vehicle.plate, entry.km
        );

        self.logger
            .service_exit(trace_id, "FuelService", "record_fill", timer.elapsed_ms());
        Ok(entry)
    }

    /// Delete a fill and return its liters to the tank.
    pub async fn delete_fill(&self, trace_id: &str, id: i64) -> Result<()> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "FuelService", "delete_fill", &id);

        let entry = self
            .fuel_repo
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("fuel entry"))?;

        self.logger
            .repo_call(trace_id, "FuelService", "FuelRepo", "delete");
        self.fuel_repo.delete(id).await?;

        self.logger
            .repo_call(trace_id, "FuelService", "TankRepo", "adjust_stock");
        self.tank_repo.adjust_stock(entry.liters).await?;

        info!(
            "[{}] Deleted fuel entry {} ({:.2}L returned to tank)",
            trace_id, id, entry.liters
        );

        self.logger
            .service_exit(trace_id, "FuelService", "delete_fill", timer.elapsed_ms());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::repositories::{TankRepository, VehicleRepository};
    use crate::db::models::CreateVehicle;
    use crate::infrastructure::database::{
        SqliteFuelEntryRepository, SqliteTankRepository, SqliteVehicleRepository,
    };

    struct Fixture {
        service: FuelService<SqliteFuelEntryRepository, SqliteVehicleRepository, SqliteTankRepository>,
        vehicles: SqliteVehicleRepository,
        tank: SqliteTankRepository,
    }

    async fn fixture() -> Fixture {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let vehicles = SqliteVehicleRepository::new(pool.clone());
        let tank = SqliteTankRepository::new(pool.clone());
        let service = FuelService::new(
            Arc::new(SqliteFuelEntryRepository::new(pool.clone())),
            Arc::new(vehicles.clone()),
            Arc::new(tank.clone()),
            Arc::new(BoundaryLogger::new()),
        );
        Fixture {
            service,
            vehicles,
            tank,
        }
    }

    async fn seed_vehicle(fx: &Fixture) -> i64 {
        fx.vehicles
            .create(CreateVehicle {
                plate: "34 ABC 123".to_string(),
                model: "Transit".to_string(),
                current_km: 100_000,
                model_year: None,
                inspection_due: None,
                service_due: None,
                driver: None,
            })
            .await
            .unwrap()
            .id
    }

    fn fill(vehicle_id: i64, km: i64, liters: f64) -> CreateFuelEntry {
        CreateFuelEntry {
            vehicle_id,
            km,
            liters,
            note: None,
            filled_at: "2026-08-01 09:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_fill_updates_odometer_and_tank() {
        let fx = fixture().await;
        let vid = seed_vehicle(&fx).await;
        fx.tank.adjust_stock(500.0).await.unwrap();

        let entry = fx
            .service
            .record_fill("t", fill(vid, 100_450, 42.5))
            .await
            .unwrap();
        assert_eq!(entry.km, 100_450);

        let vehicle = fx.vehicles.get(vid).await.unwrap().unwrap();
        assert_eq!(vehicle.current_km, 100_450);

        let status = fx.tank.status().await.unwrap();
        assert!((status.current_liters - 457.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_record_fill_validation() {
        let fx = fixture().await;
        let vid = seed_vehicle(&fx).await;

        for bad in [
            fill(vid, -1, 40.0),
            fill(vid, 100_100, 0.0),
            fill(vid, 100_100, -3.0),
            CreateFuelEntry {
                filled_at: "01-08-2026 09:00".to_string(),
                ..fill(vid, 100_100, 40.0)
            },
        ] {
            let err = fx.service.record_fill("t", bad).await.unwrap_err();
            assert!(matches!(
                err.downcast_ref::<AppError>(),
                Some(AppError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_record_fill_unknown_vehicle() {
        let fx = fixture().await;
        let err = fx.service.record_fill("t", fill(77, 10, 5.0)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_fill_returns_liters() {
        let fx = fixture().await;
        let vid = seed_vehicle(&fx).await;
        fx.tank.adjust_stock(100.0).await.unwrap();

        let entry = fx
            .service
            .record_fill("t", fill(vid, 100_100, 40.0))
            .await
            .unwrap();
        fx.service.delete_fill("t", entry.id).await.unwrap();

        let status = fx.tank.status().await.unwrap();
        assert!((status.current_liters - 100.0).abs() < 1e-9);

        let err = fx.service.delete_fill("t", entry.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::NotFound(_))
        ));
    }
}
