use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::ports::repositories::{FuelEntryRepository, VehicleRepository};
use crate::datefmt;
use crate::db::models::{FuelEntry, FuelEntryWithPlate, PeriodGrouping, PeriodUsage};
use crate::errors::AppError;
use crate::infrastructure::logging::{BoundaryLogger, Timer};

/// Fleet-wide report row cap, matching the listing endpoints.
const REPORT_LIMIT: i64 = 500;

/// One chart point: the km reading plus the consumption figure against
/// the previous fill. The first point of a series carries no figure, and
/// neither does a point whose km did not advance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionPoint {
    pub filled_at: String,
    pub km: i64,
    pub liters: f64,
    pub l_per_100km: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsumptionReport {
    pub vehicle_id: i64,
    pub plate: String,
    pub overall_l_per_100km: Option<f64>,
    pub monthly_avg_l_per_100km: Option<f64>,
    pub yearly_avg_l_per_100km: Option<f64>,
    pub series: Vec<ConsumptionPoint>,
}

/// Read-side reporting: filtered fuel listings, L/100km statistics, and
/// the CSV export.
pub struct ReportService<FR, VR>
where
    FR: FuelEntryRepository,
    VR: VehicleRepository,
{
    fuel_repo: Arc<FR>,
    vehicle_repo: Arc<VR>,
    logger: Arc<BoundaryLogger>,
}

impl<FR, VR> ReportService<FR, VR>
where
    FR: FuelEntryRepository,
    VR: VehicleRepository,
{
    pub fn new(fuel_repo: Arc<FR>, vehicle_repo: Arc<VR>, logger: Arc<BoundaryLogger>) -> Self {
        Self {
            fuel_repo,
            vehicle_repo,
            logger,
        }
    }

    /// Fuel entries joined with plates, optionally narrowed to one vehicle
    /// and/or one month ("YYYY-MM").
    pub async fn fuel_report(
        &self,
        trace_id: &str,
        vehicle_id: Option<i64>,
        month: Option<&str>,
    ) -> Result<Vec<FuelEntryWithPlate>> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "ReportService", "fuel_report", &(vehicle_id, month));

        self.check_filters(vehicle_id, month).await?;

        self.logger
            .repo_call(trace_id, "ReportService", "FuelRepo", "list_filtered");
        let repo_timer = Timer::start();
        let entries = self
            .fuel_repo
            .list_filtered(vehicle_id, month, REPORT_LIMIT)
            .await?;
        self.logger.repo_done(
            trace_id,
            "ReportService",
            "FuelRepo",
            "list_filtered",
            repo_timer.elapsed_ms(),
        );

        self.logger
            .service_exit(trace_id, "ReportService", "fuel_report", timer.elapsed_ms());
        Ok(entries)
    }

    /// L/100km statistics and the per-fill consumption series for one
    /// vehicle.
    pub async fn consumption(&self, trace_id: &str, vehicle_id: i64) -> Result<ConsumptionReport> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "ReportService", "consumption", &vehicle_id);

        let vehicle = self
            .vehicle_repo
            .get(vehicle_id)
            .await?
            .ok_or_else(|| AppError::not_found("vehicle"))?;

        self.logger
            .repo_call(trace_id, "ReportService", "FuelRepo", "overall_usage");
        let overall = self.fuel_repo.overall_usage(vehicle_id).await?;
        let overall_l_per_100km = overall.and_then(|span| {
            if span.max_km > span.min_km {
                Some(per_100km(span.total_liters, span.max_km - span.min_km))
            } else {
                None
            }
        });

        self.logger
            .repo_call(trace_id, "ReportService", "FuelRepo", "usage_by_period");
        let monthly = self
            .fuel_repo
            .usage_by_period(vehicle_id, PeriodGrouping::Month)
            .await?;
        let yearly = self
            .fuel_repo
            .usage_by_period(vehicle_id, PeriodGrouping::Year)
            .await?;

        self.logger
            .repo_call(trace_id, "ReportService", "FuelRepo", "list_chronological");
        let entries = self.fuel_repo.list_chronological(vehicle_id).await?;

        let report = ConsumptionReport {
            vehicle_id,
            plate: vehicle.plate,
            overall_l_per_100km,
            monthly_avg_l_per_100km: mean_per_100km(&monthly),
            yearly_avg_l_per_100km: mean_per_100km(&yearly),
            series: consumption_series(&entries),
        };

        self.logger
            .service_exit(trace_id, "ReportService", "consumption", timer.elapsed_ms());
        Ok(report)
    }

    /// The fuel report rendered as CSV bytes.
    pub async fn export_csv(
        &self,
        trace_id: &str,
        vehicle_id: Option<i64>,
        month: Option<&str>,
    ) -> Result<Vec<u8>> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "ReportService", "export_csv", &(vehicle_id, month));

        self.check_filters(vehicle_id, month).await?;
        let entries = self
            .fuel_repo
            .list_filtered(vehicle_id, month, REPORT_LIMIT)
            .await?;

        let bytes = render_csv(&entries)?;

        self.logger
            .service_exit(trace_id, "ReportService", "export_csv", timer.elapsed_ms());
        Ok(bytes)
    }

    async fn check_filters(&self, vehicle_id: Option<i64>, month: Option<&str>) -> Result<()> {
        if let Some(m) = month {
            if !datefmt::is_valid_month(m) {
                return Err(AppError::validation(format!(
                    "month must be YYYY-MM, got '{}'",
                    m
                )));
            }
        }
        if let Some(id) = vehicle_id {
            self.vehicle_repo
                .get(id)
                .await?
                .ok_or_else(|| AppError::not_found("vehicle"))?;
        }
        Ok(())
    }
}

fn per_100km(liters: f64, span_km: i64) -> f64 {
    liters / span_km as f64 * 100.0
}

/// Mean of the per-period consumption figures. The repository already
/// filters out periods without a usable span.
fn mean_per_100km(periods: &[PeriodUsage]) -> Option<f64> {
    if periods.is_empty() {
        return None;
    }
    let sum: f64 = periods
        .iter()
        .map(|p| per_100km(p.total_liters, p.max_km - p.min_km))
        .sum();
    Some(sum / periods.len() as f64)
}

fn consumption_series(entries: &[FuelEntry]) -> Vec<ConsumptionPoint> {
    let mut series = Vec::with_capacity(entries.len());
    let mut previous_km: Option<i64> = None;

    for entry in entries {
        let l_per_100km = previous_km.and_then(|prev| {
            let delta = entry.km - prev;
            if delta > 0 {
                Some(per_100km(entry.liters, delta))
            } else {
                None
            }
        });
        series.push(ConsumptionPoint {
            filled_at: entry.filled_at.clone(),
            km: entry.km,
            liters: entry.liters,
            l_per_100km,
        });
        previous_km = Some(entry.km);
    }

    series
}

fn render_csv(entries: &[FuelEntryWithPlate]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["filled_at", "plate", "km", "liters", "note"])?;
    for entry in entries {
        writer.write_record([
            entry.filled_at.as_str(),
            entry.plate.as_str(),
            &entry.km.to_string(),
            &entry.liters.to_string(),
            entry.note.as_deref().unwrap_or(""),
        ])?;
    }
    writer
        .into_inner()
        .context("failed to flush CSV writer")
}
