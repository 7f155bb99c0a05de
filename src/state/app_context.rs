use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::{
    FuelService, MaintenanceService, ReportService, TankService, VehicleService,
};
use crate::infrastructure::database::{
    SqliteFuelEntryRepository, SqliteMaintenanceRepository, SqliteTankRepository,
    SqliteVehicleRepository,
};
use crate::infrastructure::logging::BoundaryLogger;

/// DI container handed to every handler. Repositories serve the read
/// paths directly; services own the validated, multi-step mutations.
#[derive(Clone)]
pub struct AppContext {
    // Services (Application Layer)
    pub vehicle_service: Arc<
        VehicleService<
            SqliteVehicleRepository,
            SqliteFuelEntryRepository,
            SqliteMaintenanceRepository,
        >,
    >,
    pub fuel_service: Arc<
        FuelService<SqliteFuelEntryRepository, SqliteVehicleRepository, SqliteTankRepository>,
    >,
    pub tank_service: Arc<TankService<SqliteTankRepository>>,
    pub maintenance_service:
        Arc<MaintenanceService<SqliteMaintenanceRepository, SqliteVehicleRepository>>,
    pub report_service: Arc<ReportService<SqliteFuelEntryRepository, SqliteVehicleRepository>>,

    // Repositories (Infrastructure Layer)
    pub vehicle_repo: Arc<SqliteVehicleRepository>,
    pub fuel_repo: Arc<SqliteFuelEntryRepository>,
    pub tank_repo: Arc<SqliteTankRepository>,
    pub maintenance_repo: Arc<SqliteMaintenanceRepository>,

    // Infrastructure
    pub logger: Arc<BoundaryLogger>,
    pub pool: SqlitePool,

    // Config
    pub data_dir: PathBuf,
}

impl AppContext {
    /// Wire repositories and services around one pool.
    pub fn new(pool: SqlitePool, data_dir: PathBuf) -> Self {
        let vehicle_repo = Arc::new(SqliteVehicleRepository::new(pool.clone()));
        let fuel_repo = Arc::new(SqliteFuelEntryRepository::new(pool.clone()));
        let tank_repo = Arc::new(SqliteTankRepository::new(pool.clone()));
        let maintenance_repo = Arc::new(SqliteMaintenanceRepository::new(pool.clone()));

        let logger = Arc::new(BoundaryLogger::new());

        let vehicle_service = Arc::new(VehicleService::new(
            vehicle_repo.clone(),
            fuel_repo.clone(),
            maintenance_repo.clone(),
            logger.clone(),
        ));
        let fuel_service = Arc::new(FuelService::new(
            fuel_repo.clone(),
            vehicle_repo.clone(),
            tank_repo.clone(),
            logger.clone(),
        ));
        let tank_service = Arc::new(TankService::new(tank_repo.clone(), logger.clone()));
        let maintenance_service = Arc::new(MaintenanceService::new(
            maintenance_repo.clone(),
            vehicle_repo.clone(),
            logger.clone(),
        ));
        let report_service = Arc::new(ReportService::new(
            fuel_repo.clone(),
            vehicle_repo.clone(),
            logger.clone(),
        ));

        Self {
            vehicle_service,
            fuel_service,
            tank_service,
            maintenance_service,
            report_service,
            vehicle_repo,
            fuel_repo,
            tank_repo,
            maintenance_repo,
            logger,
            pool,
            data_dir,
        }
    }
}
