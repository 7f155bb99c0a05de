use async_trait::async_trait;
use anyhow::Result;
use crate::db::models::{
    CreateFuelEntry, CreateMaintenanceRecord, CreateTankRefill, CreateVehicle, FuelEntry,
    FuelEntryWithPlate, MaintenanceRecord, PeriodGrouping, PeriodUsage, TankRefill, TankStatus,
    UpdateMaintenanceRecord, UpdateVehicleDetails, UsageSpan, Vehicle,
};

/// Repository trait for Vehicle operations
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Create a new vehicle
    async fn create(&self, vehicle: CreateVehicle) -> Result<Vehicle>;

    /// Get a vehicle by ID
    async fn get(&self, id: i64) -> Result<Option<Vehicle>>;

    /// Get a vehicle by plate
    async fn get_by_plate(&self, plate: &str) -> Result<Option<Vehicle>>;

    /// List all vehicles ordered by plate
    async fn list(&self) -> Result<Vec<Vehicle>>;

    /// Update the detail fields (model year, due dates, driver)
    async fn update_details(&self, id: i64, details: UpdateVehicleDetails) -> Result<()>;

    /// Update the odometer reading
    async fn update_current_km(&self, id: i64, km: i64) -> Result<()>;

    /// Delete a vehicle
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Repository trait for FuelEntry operations
#[async_trait]
pub trait FuelEntryRepository: Send + Sync {
    /// Create a new fuel entry
    async fn create(&self, entry: CreateFuelEntry) -> Result<FuelEntry>;

    /// Get a fuel entry by ID
    async fn get(&self, id: i64) -> Result<Option<FuelEntry>>;

    /// List recent entries across the fleet, newest first, joined with plate
    async fn list_recent(&self, limit: i64) -> Result<Vec<FuelEntryWithPlate>>;

    /// List entries for one vehicle, newest first
    async fn list_by_vehicle(&self, vehicle_id: i64, limit: i64) -> Result<Vec<FuelEntry>>;

    /// List entries filtered by vehicle and/or month ("YYYY-MM"), newest first
    async fn list_filtered(
        &self,
        vehicle_id: Option<i64>,
        month: Option<&str>,
        limit: i64,
    ) -> Result<Vec<FuelEntryWithPlate>>;

    /// List one vehicle's entries in chronological order
    async fn list_chronological(&self, vehicle_id: i64) -> Result<Vec<FuelEntry>>;

    /// km span and fuel total over all of a vehicle's entries
    async fn overall_usage(&self, vehicle_id: i64) -> Result<Option<UsageSpan>>;

    /// Per-period spans with more than one entry and a positive km span
    async fn usage_by_period(
        &self,
        vehicle_id: i64,
        grouping: PeriodGrouping,
    ) -> Result<Vec<PeriodUsage>>;

    /// Delete a fuel entry
    async fn delete(&self, id: i64) -> Result<()>;

    /// Delete all entries for a vehicle, returning how many were removed
    async fn delete_by_vehicle(&self, vehicle_id: i64) -> Result<u64>;
}

/// Repository trait for the tank singleton and its refill history
#[async_trait]
pub trait TankRepository: Send + Sync {
    /// Current stock and last update time
    async fn status(&self) -> Result<TankStatus>;

    /// Add (positive) or remove (negative) liters from the stock
    async fn adjust_stock(&self, delta: f64) -> Result<()>;

    /// Create a refill record
    async fn create_refill(&self, refill: CreateTankRefill) -> Result<TankRefill>;

    /// Get a refill record by ID
    async fn get_refill(&self, id: i64) -> Result<Option<TankRefill>>;

    /// List refill records, newest first
    async fn list_refills(&self, limit: i64) -> Result<Vec<TankRefill>>;

    /// Delete a refill record
    async fn delete_refill(&self, id: i64) -> Result<()>;
}

/// Repository trait for maintenance/repair records
#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    /// Create a new maintenance record
    async fn create(&self, record: CreateMaintenanceRecord) -> Result<MaintenanceRecord>;

    /// Get a record by ID
    async fn get(&self, id: i64) -> Result<Option<MaintenanceRecord>>;

    /// List records for one vehicle, newest first
    async fn list_by_vehicle(&self, vehicle_id: i64, limit: i64) -> Result<Vec<MaintenanceRecord>>;

    /// Update a record
    async fn update(&self, id: i64, record: UpdateMaintenanceRecord) -> Result<MaintenanceRecord>;

    /// Delete a record
    async fn delete(&self, id: i64) -> Result<()>;

    /// Delete all records for a vehicle, returning how many were removed
    async fn delete_by_vehicle(&self, vehicle_id: i64) -> Result<u64>;
}
