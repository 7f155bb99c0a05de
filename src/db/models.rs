use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::datefmt::{self, DUE_SOON_DAYS};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: i64,

    // Identification
    pub plate: String,
    pub model: String,

    // Odometer, updated by every fuel entry
    pub current_km: i64,

    // Detail fields, editable after creation
    pub model_year: Option<i64>,
    pub inspection_due: Option<String>,
    pub service_due: Option<String>,
    pub driver: Option<String>,

    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVehicle {
    pub plate: String,
    pub model: String,
    pub current_km: i64,
    pub model_year: Option<i64>,
    pub inspection_due: Option<String>,
    pub service_due: Option<String>,
    pub driver: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateVehicleDetails {
    pub model_year: Option<i64>,
    pub inspection_due: Option<String>,
    pub service_due: Option<String>,
    pub driver: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    InspectionOverdue,
    InspectionDueSoon,
    ServiceOverdue,
    ServiceDueSoon,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::InspectionOverdue => write!(f, "inspection_overdue"),
            AlertKind::InspectionDueSoon => write!(f, "inspection_due_soon"),
            AlertKind::ServiceOverdue => write!(f, "service_overdue"),
            AlertKind::ServiceDueSoon => write!(f, "service_due_soon"),
        }
    }
}

/// A due-date warning for a vehicle, derived from inspection_due / service_due.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleAlert {
    pub kind: AlertKind,
    pub due: String,
    pub days_left: Option<i64>,
    pub message: String,
}

impl Vehicle {
    /// Computes overdue / due-soon alerts against the given day.
    /// Unparseable stored dates are skipped.
    pub fn alerts(&self, today: NaiveDate) -> Vec<VehicleAlert> {
        let mut alerts = Vec::new();

        let checks = [
            (
                &self.inspection_due,
                "inspection",
                AlertKind::InspectionOverdue,
                AlertKind::InspectionDueSoon,
            ),
            (
                &self.service_due,
                "service",
                AlertKind::ServiceOverdue,
                AlertKind::ServiceDueSoon,
            ),
        ];

        for (stored, label, overdue_kind, soon_kind) in checks {
            let Some(raw) = stored else { continue };
            let Some(due) = datefmt::parse_date(raw) else { continue };

            if due < today {
                alerts.push(VehicleAlert {
                    kind: overdue_kind,
                    due: raw.clone(),
                    days_left: None,
                    message: format!("{} overdue since {}", label, raw),
                });
            } else {
                let days_left = (due - today).num_days();
                if days_left <= DUE_SOON_DAYS {
                    alerts.push(VehicleAlert {
                        kind: soon_kind,
                        due: raw.clone(),
                        days_left: Some(days_left),
                        message: format!("{} due in {} days ({})", label, days_left, raw),
                    });
                }
            }
        }

        alerts
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FuelEntry {
    pub id: i64,
    pub vehicle_id: i64,
    pub km: i64,
    pub liters: f64,
    pub note: Option<String>,
    pub filled_at: String,
    pub created_at: String,
}

/// Fuel entry joined with the vehicle's plate, for fleet-wide listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FuelEntryWithPlate {
    pub id: i64,
    pub vehicle_id: i64,
    pub plate: String,
    pub km: i64,
    pub liters: f64,
    pub note: Option<String>,
    pub filled_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFuelEntry {
    pub vehicle_id: i64,
    pub km: i64,
    pub liters: f64,
    pub note: Option<String>,
    pub filled_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TankRefill {
    pub id: i64,
    pub liters: f64,
    pub unit_price: Option<f64>,
    pub total_cost: Option<f64>,
    pub note: Option<String>,
    pub refilled_at: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTankRefill {
    pub liters: f64,
    pub unit_price: Option<f64>,
    pub total_cost: Option<f64>,
    pub note: Option<String>,
    pub refilled_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TankStatus {
    pub id: i64,
    pub current_liters: f64,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceRecord {
    pub id: i64,
    pub vehicle_id: i64,
    pub performed_on: String,
    pub performed_at: Option<String>,
    pub fault: Option<String>,
    pub work_done: Option<String>,
    pub parts_cost: f64,
    pub labor_cost: f64,
    pub total_cost: f64,
    pub note: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMaintenanceRecord {
    pub vehicle_id: i64,
    pub performed_on: String,
    pub performed_at: Option<String>,
    pub fault: Option<String>,
    pub work_done: Option<String>,
    pub parts_cost: f64,
    pub labor_cost: f64,
    pub total_cost: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMaintenanceRecord {
    pub performed_on: String,
    pub performed_at: Option<String>,
    pub fault: Option<String>,
    pub work_done: Option<String>,
    pub parts_cost: f64,
    pub labor_cost: f64,
    pub total_cost: f64,
    pub note: Option<String>,
}

/// km span and fuel total for one vehicle over all entries.
#[derive(Debug, Clone, Copy)]
pub struct UsageSpan {
    pub min_km: i64,
    pub max_km: i64,
    pub total_liters: f64,
}

/// km span and fuel total within one calendar period (month or year).
#[derive(Debug, Clone, FromRow)]
pub struct PeriodUsage {
    pub period: String,
    pub min_km: i64,
    pub max_km: i64,
    pub total_liters: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodGrouping {
    Month,
    Year,
}

impl PeriodGrouping {
    /// strftime pattern applied to filled_at when grouping.
    pub fn strftime_pattern(&self) -> &'static str {
        match self {
            PeriodGrouping::Month => "%Y-%m",
            PeriodGrouping::Year => "%Y",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle_with_dates(inspection: Option<&str>, service: Option<&str>) -> Vehicle {
        Vehicle {
            id: 1,
            plate: "34 ABC 123".to_string(),
            model: "Transit".to_string(),
            current_km: 120_000,
            model_year: Some(2019),
            inspection_due: inspection.map(String::from),
            service_due: service.map(String::from),
            driver: None,
            created_at: "2026-01-01 09:00".to_string(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_no_dates_no_alerts() {
        let v = vehicle_with_dates(None, None);
        assert!(v.alerts(day("2026-08-05")).is_empty());
    }

    #[test]
    fn test_overdue_inspection() {
        let v = vehicle_with_dates(Some("2026-07-01"), None);
        let alerts = v.alerts(day("2026-08-05"));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::InspectionOverdue);
        assert_eq!(alerts[0].days_left, None);
    }

    #[test]
    fn test_due_soon_service() {
        let v = vehicle_with_dates(None, Some("2026-08-20"));
        let alerts = v.alerts(day("2026-08-05"));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::ServiceDueSoon);
        assert_eq!(alerts[0].days_left, Some(15));
    }

    #[test]
    fn test_far_future_date_is_quiet() {
        let v = vehicle_with_dates(Some("2027-08-05"), None);
        assert!(v.alerts(day("2026-08-05")).is_empty());
    }

    #[test]
    fn test_due_today_counts_as_due_soon() {
        let v = vehicle_with_dates(Some("2026-08-05"), None);
        let alerts = v.alerts(day("2026-08-05"));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::InspectionDueSoon);
        assert_eq!(alerts[0].days_left, Some(0));
    }

    #[test]
    fn test_garbage_date_is_skipped() {
        let v = vehicle_with_dates(Some("soon"), Some("2026-08-10"));
        let alerts = v.alerts(day("2026-08-05"));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::ServiceDueSoon);
    }

    #[test]
    fn test_both_dates_alert_independently() {
        let v = vehicle_with_dates(Some("2026-07-01"), Some("2026-08-10"));
        let alerts = v.alerts(day("2026-08-05"));
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, AlertKind::InspectionOverdue);
        assert_eq!(alerts[1].kind, AlertKind::ServiceDueSoon);
    }
}
