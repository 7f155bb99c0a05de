use async_trait::async_trait;
use anyhow::Result;
use sqlx::SqlitePool;

use crate::application::ports::repositories::*;
use crate::db::models::*;

/// SQLite implementation of VehicleRepository
#[derive(Clone)]
pub struct SqliteVehicleRepository {
    pool: SqlitePool,
}

impl SqliteVehicleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for SqliteVehicleRepository {
    async fn create(&self, vehicle: CreateVehicle) -> Result<Vehicle> {
        let result = sqlx::query(
            r#"
            INSERT INTO vehicles (
                plate, model, current_km, model_year,
                inspection_due, service_due, driver
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&vehicle.plate)
        .bind(&vehicle.model)
        .bind(vehicle.current_km)
        .bind(vehicle.model_year)
        .bind(&vehicle.inspection_due)
        .bind(&vehicle.service_due)
        .bind(&vehicle.driver)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(vehicle)
    }

    async fn get(&self, id: i64) -> Result<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    async fn get_by_plate(&self, plate: &str) -> Result<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE plate = ?")
            .bind(plate)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    async fn list(&self) -> Result<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY plate")
            .fetch_all(&self.pool)
            .await?;
        Ok(vehicles)
    }

    async fn update_details(&self, id: i64, details: UpdateVehicleDetails) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE vehicles
            SET model_year = ?, inspection_due = ?, service_due = ?, driver = ?
            WHERE id = ?
            "#,
        )
        .bind(details.model_year)
        .bind(&details.inspection_due)
        .bind(&details.service_due)
        .bind(&details.driver)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_current_km(&self, id: i64, km: i64) -> Result<()> {
        sqlx::query("UPDATE vehicles SET current_km = ? WHERE id = ?")
            .bind(km)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// SQLite implementation of FuelEntryRepository
#[derive(Clone)]
pub struct SqliteFuelEntryRepository {
    pool: SqlitePool,
}

impl SqliteFuelEntryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FuelEntryRepository for SqliteFuelEntryRepository {
    async fn create(&self, entry: CreateFuelEntry) -> Result<FuelEntry> {
        let result = sqlx::query(
            "INSERT INTO fuel_entries (vehicle_id, km, liters, note, filled_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.vehicle_id)
        .bind(entry.km)
        .bind(entry.liters)
        .bind(&entry.note)
        .bind(&entry.filled_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let entry = sqlx::query_as::<_, FuelEntry>("SELECT * FROM fuel_entries WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(entry)
    }

    async fn get(&self, id: i64) -> Result<Option<FuelEntry>> {
        let entry = sqlx::query_as::<_, FuelEntry>("SELECT * FROM fuel_entries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<FuelEntryWithPlate>> {
        let entries = sqlx::query_as::<_, FuelEntryWithPlate>(
            r#"
            SELECT f.id, f.vehicle_id, v.plate, f.km, f.liters, f.note, f.filled_at
            FROM fuel_entries f
            JOIN vehicles v ON f.vehicle_id = v.id
            ORDER BY f.filled_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn list_by_vehicle(&self, vehicle_id: i64, limit: i64) -> Result<Vec<FuelEntry>> {
        let entries = sqlx::query_as::<_, FuelEntry>(
            "SELECT * FROM fuel_entries WHERE vehicle_id = ? ORDER BY filled_at DESC LIMIT ?",
        )
        .bind(vehicle_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn list_filtered(
        &self,
        vehicle_id: Option<i64>,
        month: Option<&str>,
        limit: i64,
    ) -> Result<Vec<FuelEntryWithPlate>> {
        let mut sql = String::from(
            r#"
            SELECT f.id, f.vehicle_id, v.plate, f.km, f.liters, f.note, f.filled_at
            FROM fuel_entries f
            JOIN vehicles v ON f.vehicle_id = v.id
            WHERE 1=1
            "#,
        );
        if vehicle_id.is_some() {
            sql.push_str(" AND f.vehicle_id = ?");
        }
        if month.is_some() {
            sql.push_str(" AND strftime('%Y-%m', f.filled_at) = ?");
        }
        sql.push_str(" ORDER BY f.filled_at DESC LIMIT ?");

        let mut query = sqlx::query_as::<_, FuelEntryWithPlate>(&sql);
        if let Some(vid) = vehicle_id {
            query = query.bind(vid);
        }
        if let Some(m) = month {
            query = query.bind(m.to_string());
        }
        let entries = query.bind(limit).fetch_all(&self.pool).await?;
        Ok(entries)
    }

    async fn list_chronological(&self, vehicle_id: i64) -> Result<Vec<FuelEntry>> {
        let entries = sqlx::query_as::<_, FuelEntry>(
            "SELECT * FROM fuel_entries WHERE vehicle_id = ? ORDER BY filled_at ASC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn overall_usage(&self, vehicle_id: i64) -> Result<Option<UsageSpan>> {
        let row: (Option<i64>, Option<i64>, Option<f64>) = sqlx::query_as(
            "SELECT MIN(km), MAX(km), SUM(liters) FROM fuel_entries WHERE vehicle_id = ?",
        )
        .bind(vehicle_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(match row {
            (Some(min_km), Some(max_km), Some(total_liters)) => Some(UsageSpan {
                min_km,
                max_km,
                total_liters,
            }),
            _ => None,
        })
    }

    async fn usage_by_period(
        &self,
        vehicle_id: i64,
        grouping: PeriodGrouping,
    ) -> Result<Vec<PeriodUsage>> {
        let usage = sqlx::query_as::<_, PeriodUsage>(
            r#"
            SELECT strftime(?, filled_at) AS period,
                   MIN(km) AS min_km,
                   MAX(km) AS max_km,
                   SUM(liters) AS total_liters
            FROM fuel_entries
            WHERE vehicle_id = ?
            GROUP BY period
            HAVING max_km > min_km AND COUNT(*) > 1
            ORDER BY period
            "#,
        )
        .bind(grouping.strftime_pattern())
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(usage)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM fuel_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_by_vehicle(&self, vehicle_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM fuel_entries WHERE vehicle_id = ?")
            .bind(vehicle_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// SQLite implementation of TankRepository
#[derive(Clone)]
pub struct SqliteTankRepository {
    pool: SqlitePool,
}

impl SqliteTankRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TankRepository for SqliteTankRepository {
    async fn status(&self) -> Result<TankStatus> {
        // Row is seeded by the initial migration
        let status = sqlx::query_as::<_, TankStatus>("SELECT * FROM tank WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(status)
    }

    async fn adjust_stock(&self, delta: f64) -> Result<()> {
        sqlx::query(
            "UPDATE tank SET current_liters = current_liters + ?, updated_at = datetime('now') WHERE id = 1",
        )
        .bind(delta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_refill(&self, refill: CreateTankRefill) -> Result<TankRefill> {
        let result = sqlx::query(
            "INSERT INTO tank_refills (liters, unit_price, total_cost, note, refilled_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(refill.liters)
        .bind(refill.unit_price)
        .bind(refill.total_cost)
        .bind(&refill.note)
        .bind(&refill.refilled_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let refill = sqlx::query_as::<_, TankRefill>("SELECT * FROM tank_refills WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(refill)
    }

    async fn get_refill(&self, id: i64) -> Result<Option<TankRefill>> {
        let refill = sqlx::query_as::<_, TankRefill>("SELECT * FROM tank_refills WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(refill)
    }

    async fn list_refills(&self, limit: i64) -> Result<Vec<TankRefill>> {
        let refills = sqlx::query_as::<_, TankRefill>(
            "SELECT * FROM tank_refills ORDER BY refilled_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(refills)
    }

    async fn delete_refill(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM tank_refills WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// SQLite implementation of MaintenanceRepository
#[derive(Clone)]
pub struct SqliteMaintenanceRepository {
    pool: SqlitePool,
}

impl SqliteMaintenanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaintenanceRepository for SqliteMaintenanceRepository {
    async fn create(&self, record: CreateMaintenanceRecord) -> Result<MaintenanceRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO maintenance_records (
                vehicle_id, performed_on, performed_at, fault, work_done,
                parts_cost, labor_cost, total_cost, note
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.vehicle_id)
        .bind(&record.performed_on)
        .bind(&record.performed_at)
        .bind(&record.fault)
        .bind(&record.work_done)
        .bind(record.parts_cost)
        .bind(record.labor_cost)
        .bind(record.total_cost)
        .bind(&record.note)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let record =
            sqlx::query_as::<_, MaintenanceRecord>("SELECT * FROM maintenance_records WHERE id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<Option<MaintenanceRecord>> {
        let record =
            sqlx::query_as::<_, MaintenanceRecord>("SELECT * FROM maintenance_records WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(record)
    }

    async fn list_by_vehicle(&self, vehicle_id: i64, limit: i64) -> Result<Vec<MaintenanceRecord>> {
        let records = sqlx::query_as::<_, MaintenanceRecord>(
            "SELECT * FROM maintenance_records WHERE vehicle_id = ? ORDER BY performed_on DESC LIMIT ?",
        )
        .bind(vehicle_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn update(&self, id: i64, record: UpdateMaintenanceRecord) -> Result<MaintenanceRecord> {
        sqlx::query(
            r#"
            UPDATE maintenance_records
            SET performed_on = ?, performed_at = ?, fault = ?, work_done = ?,
                parts_cost = ?, labor_cost = ?, total_cost = ?, note = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.performed_on)
        .bind(&record.performed_at)
        .bind(&record.fault)
        .bind(&record.work_done)
        .bind(record.parts_cost)
        .bind(record.labor_cost)
        .bind(record.total_cost)
        .bind(&record.note)
        .bind(id)
        .execute(&self.pool)
        .await?;

        let record =
            sqlx::query_as::<_, MaintenanceRecord>("SELECT * FROM maintenance_records WHERE id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(record)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM maintenance_records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_by_vehicle(&self, vehicle_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM maintenance_records WHERE vehicle_id = ?")
            .bind(vehicle_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn sample_vehicle(plate: &str) -> CreateVehicle {
        CreateVehicle {
            plate: plate.to_string(),
            model: "Transit".to_string(),
            current_km: 100_000,
            model_year: Some(2020),
            inspection_due: None,
            service_due: None,
            driver: Some("A. Driver".to_string()),
        }
    }

    fn entry(vehicle_id: i64, km: i64, liters: f64, filled_at: &str) -> CreateFuelEntry {
        CreateFuelEntry {
            vehicle_id,
            km,
            liters,
            note: None,
            filled_at: filled_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_vehicle_create_and_lookup() {
        let pool = test_pool().await;
        let repo = SqliteVehicleRepository::new(pool);

        let v = repo.create(sample_vehicle("34 ABC 123")).await.unwrap();
        assert_eq!(v.plate, "34 ABC 123");
        assert_eq!(v.current_km, 100_000);

        let by_plate = repo.get_by_plate("34 ABC 123").await.unwrap();
        assert_eq!(by_plate.unwrap().id, v.id);

        assert!(repo.get_by_plate("06 XYZ 99").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_vehicle_list_ordered_by_plate() {
        let pool = test_pool().await;
        let repo = SqliteVehicleRepository::new(pool);

        repo.create(sample_vehicle("34 ZZZ 1")).await.unwrap();
        repo.create(sample_vehicle("06 AAA 2")).await.unwrap();

        let plates: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.plate)
            .collect();
        assert_eq!(plates, vec!["06 AAA 2", "34 ZZZ 1"]);
    }

    #[tokio::test]
    async fn test_vehicle_update_details_and_km() {
        let pool = test_pool().await;
        let repo = SqliteVehicleRepository::new(pool);
        let v = repo.create(sample_vehicle("34 ABC 123")).await.unwrap();

        repo.update_details(
            v.id,
            UpdateVehicleDetails {
                model_year: Some(2021),
                inspection_due: Some("2026-09-01".to_string()),
                service_due: None,
                driver: None,
            },
        )
        .await
        .unwrap();
        repo.update_current_km(v.id, 105_000).await.unwrap();

        let updated = repo.get(v.id).await.unwrap().unwrap();
        assert_eq!(updated.model_year, Some(2021));
        assert_eq!(updated.inspection_due.as_deref(), Some("2026-09-01"));
        assert_eq!(updated.driver, None);
        assert_eq!(updated.current_km, 105_000);
        // Identification untouched
        assert_eq!(updated.plate, "34 ABC 123");
    }

    #[tokio::test]
    async fn test_fuel_entry_filtering_by_month_and_vehicle() {
        let pool = test_pool().await;
        let vehicles = SqliteVehicleRepository::new(pool.clone());
        let fuel = SqliteFuelEntryRepository::new(pool);

        let a = vehicles.create(sample_vehicle("34 AAA 1")).await.unwrap();
        let b = vehicles.create(sample_vehicle("34 BBB 2")).await.unwrap();

        fuel.create(entry(a.id, 100_100, 40.0, "2026-07-10 09:00"))
            .await
            .unwrap();
        fuel.create(entry(a.id, 100_600, 42.0, "2026-08-01 09:00"))
            .await
            .unwrap();
        fuel.create(entry(b.id, 100_200, 30.0, "2026-08-02 09:00"))
            .await
            .unwrap();

        let july = fuel.list_filtered(None, Some("2026-07"), 500).await.unwrap();
        assert_eq!(july.len(), 1);
        assert_eq!(july[0].plate, "34 AAA 1");

        let august_a = fuel
            .list_filtered(Some(a.id), Some("2026-08"), 500)
            .await
            .unwrap();
        assert_eq!(august_a.len(), 1);
        assert_eq!(august_a[0].km, 100_600);

        let all = fuel.list_filtered(None, None, 500).await.unwrap();
        assert_eq!(all.len(), 3);
        // Newest first
        assert_eq!(all[0].plate, "34 BBB 2");
    }

    #[tokio::test]
    async fn test_overall_usage_empty_and_populated() {
        let pool = test_pool().await;
        let vehicles = SqliteVehicleRepository::new(pool.clone());
        let fuel = SqliteFuelEntryRepository::new(pool);

        let v = vehicles.create(sample_vehicle("34 AAA 1")).await.unwrap();
        assert!(fuel.overall_usage(v.id).await.unwrap().is_none());

        fuel.create(entry(v.id, 100_000, 40.0, "2026-07-01 09:00"))
            .await
            .unwrap();
        fuel.create(entry(v.id, 101_000, 50.0, "2026-07-20 09:00"))
            .await
            .unwrap();

        let span = fuel.overall_usage(v.id).await.unwrap().unwrap();
        assert_eq!(span.min_km, 100_000);
        assert_eq!(span.max_km, 101_000);
        assert!((span.total_liters - 90.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_usage_by_period_skips_single_entry_months() {
        let pool = test_pool().await;
        let vehicles = SqliteVehicleRepository::new(pool.clone());
        let fuel = SqliteFuelEntryRepository::new(pool);
        let v = vehicles.create(sample_vehicle("34 AAA 1")).await.unwrap();

        // July: two entries with a km span, qualifies
        fuel.create(entry(v.id, 100_000, 40.0, "2026-07-01 09:00"))
            .await
            .unwrap();
        fuel.create(entry(v.id, 100_500, 45.0, "2026-07-20 09:00"))
            .await
            .unwrap();
        // August: single entry, filtered out
        fuel.create(entry(v.id, 101_000, 42.0, "2026-08-03 09:00"))
            .await
            .unwrap();

        let months = fuel
            .usage_by_period(v.id, PeriodGrouping::Month)
            .await
            .unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].period, "2026-07");
        assert_eq!(months[0].max_km - months[0].min_km, 500);

        let years = fuel
            .usage_by_period(v.id, PeriodGrouping::Year)
            .await
            .unwrap();
        assert_eq!(years.len(), 1);
        assert_eq!(years[0].period, "2026");
        assert!((years[0].total_liters - 127.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_tank_seeded_and_adjustable() {
        let pool = test_pool().await;
        let tank = SqliteTankRepository::new(pool);

        let status = tank.status().await.unwrap();
        assert_eq!(status.current_liters, 0.0);

        tank.adjust_stock(500.0).await.unwrap();
        tank.adjust_stock(-42.5).await.unwrap();

        let status = tank.status().await.unwrap();
        assert!((status.current_liters - 457.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_tank_refill_records() {
        let pool = test_pool().await;
        let tank = SqliteTankRepository::new(pool);

        let refill = tank
            .create_refill(CreateTankRefill {
                liters: 500.0,
                unit_price: Some(42.0),
                total_cost: Some(21_000.0),
                note: None,
                refilled_at: "2026-08-01 08:00".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(refill.total_cost, Some(21_000.0));

        let listed = tank.list_refills(500).await.unwrap();
        assert_eq!(listed.len(), 1);

        tank.delete_refill(refill.id).await.unwrap();
        assert!(tank.get_refill(refill.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_maintenance_crud() {
        let pool = test_pool().await;
        let vehicles = SqliteVehicleRepository::new(pool.clone());
        let maintenance = SqliteMaintenanceRepository::new(pool);
        let v = vehicles.create(sample_vehicle("34 AAA 1")).await.unwrap();

        let record = maintenance
            .create(CreateMaintenanceRecord {
                vehicle_id: v.id,
                performed_on: "2026-08-01".to_string(),
                performed_at: Some("14:30".to_string()),
                fault: Some("brake wear".to_string()),
                work_done: Some("pads replaced".to_string()),
                parts_cost: 1200.0,
                labor_cost: 300.0,
                total_cost: 1500.0,
                note: None,
            })
            .await
            .unwrap();
        assert_eq!(record.total_cost, 1500.0);

        let updated = maintenance
            .update(
                record.id,
                UpdateMaintenanceRecord {
                    performed_on: "2026-08-02".to_string(),
                    performed_at: None,
                    fault: Some("brake wear".to_string()),
                    work_done: Some("pads and discs replaced".to_string()),
                    parts_cost: 2000.0,
                    labor_cost: 400.0,
                    total_cost: 2400.0,
                    note: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.performed_on, "2026-08-02");
        assert_eq!(updated.total_cost, 2400.0);

        assert_eq!(maintenance.delete_by_vehicle(v.id).await.unwrap(), 1);
        assert!(maintenance.get(record.id).await.unwrap().is_none());
    }
}
