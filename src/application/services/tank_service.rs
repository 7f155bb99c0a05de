use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::application::ports::repositories::TankRepository;
use crate::application::services::blank_to_none;
use crate::datefmt;
use crate::db::models::{CreateTankRefill, TankRefill, TankStatus};
use crate::errors::AppError;
use crate::infrastructure::logging::{BoundaryLogger, Timer};

/// Tank stock accounting: refills add to the stock, deleting a refill
/// record takes its liters back out.
pub struct TankService<TR>
where
    TR: TankRepository,
{
    tank_repo: Arc<TR>,
    logger: Arc<BoundaryLogger>,
}

impl<TR> TankService<TR>
where
    TR: TankRepository,
{
    pub fn new(tank_repo: Arc<TR>, logger: Arc<BoundaryLogger>) -> Self {
        Self { tank_repo, logger }
    }

    pub async fn status(&self, trace_id: &str) -> Result<TankStatus> {
        self.logger
            .repo_call(trace_id, "TankService", "TankRepo", "status");
        self.tank_repo.status().await
    }

    /// Record a delivery. total_cost is computed from unit_price when one
    /// is given; callers cannot supply their own total.
    pub async fn record_refill(
        &self,
        trace_id: &str,
        input: CreateTankRefill,
    ) -> Result<TankRefill> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "TankService", "record_refill", &input.liters);

        if !(input.liters > 0.0 && input.liters.is_finite()) {
            return Err(AppError::validation("liters must be positive"));
        }
        if let Some(price) = input.unit_price {
            if !(price >= 0.0 && price.is_finite()) {
                return Err(AppError::validation("unit_price cannot be negative"));
            }
        }
        if datefmt::parse_timestamp(&input.refilled_at).is_none() {
            return Err(AppError::validation(format!(
                "refilled_at must be YYYY-MM-DD HH:MM, got '{}'",
                input.refilled_at
            )));
        }

        let create = CreateTankRefill {
            total_cost: input.unit_price.map(|price| price * input.liters),
            note: blank_to_none(input.note),
            ..input
        };

        self.logger
            .repo_call(trace_id, "TankService", "TankRepo", "create_refill");
        let repo_timer = Timer::start();
        let refill = self.tank_repo.create_refill(create).await?;
        self.logger.repo_done(
            trace_id,
            "TankService",
            "TankRepo",
            "create_refill",
            repo_timer.elapsed_ms(),
        );

        self.logger
            .repo_call(trace_id, "TankService", "TankRepo", "adjust_stock");
        self.tank_repo.adjust_stock(refill.liters).await?;

        info!("[{}] Tank refilled with {:.2}L", trace_id, refill.liters);

        self.logger
            .service_exit(trace_id, "TankService", "record_refill", timer.elapsed_ms());
        Ok(refill)
    }

    /// Delete a refill record and remove its liters from the stock.
    pub async fn delete_refill(&self, trace_id: &str, id: i64) -> Result<()> {
        let timer = Timer::start();
        self.logger
            .service_entry(trace_id, "TankService", "delete_refill", &id);

        let refill = self
            .tank_repo
            .get_refill(id)
            .await?
            .ok_or_else(|| AppError::not_found("tank refill"))?;

        self.logger
            .repo_call(trace_id, "TankService", "TankRepo", "delete_refill");
        self.tank_repo.delete_refill(id).await?;

        self.logger
            .repo_call(trace_id, "TankService", "TankRepo", "adjust_stock");
        self.tank_repo.adjust_stock(-refill.liters).await?;

        info!(
            "[{}] Deleted tank refill {} ({:.2}L removed from stock)",
            trace_id, id, refill.liters
        );

        self.logger
            .service_exit(trace_id, "TankService", "delete_refill", timer.elapsed_ms());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::SqliteTankRepository;

    async fn service() -> (TankService<SqliteTankRepository>, SqliteTankRepository) {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        let repo = SqliteTankRepository::new(pool);
        (
            TankService::new(Arc::new(repo.clone()), Arc::new(BoundaryLogger::new())),
            repo,
        )
    }

    fn refill(liters: f64, unit_price: Option<f64>) -> CreateTankRefill {
        CreateTankRefill {
            liters,
            unit_price,
            total_cost: None,
            note: None,
            refilled_at: "2026-08-01 08:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_refill_adds_stock_and_computes_total() {
        let (svc, repo) = service().await;

        let r = svc.record_refill("t", refill(500.0, Some(42.0))).await.unwrap();
        assert_eq!(r.total_cost, Some(21_000.0));

        let status = repo.status().await.unwrap();
        assert!((status.current_liters - 500.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_refill_without_price_has_no_total() {
        let (svc, _repo) = service().await;
        let r = svc.record_refill("t", refill(250.0, None)).await.unwrap();
        assert_eq!(r.total_cost, None);
    }

    #[tokio::test]
    async fn test_refill_validation() {
        let (svc, _repo) = service().await;

        for bad in [
            refill(0.0, None),
            refill(-10.0, None),
            refill(100.0, Some(-1.0)),
            CreateTankRefill {
                refilled_at: "bad".to_string(),
                ..refill(100.0, None)
            },
        ] {
            let err = svc.record_refill("t", bad).await.unwrap_err();
            assert!(matches!(
                err.downcast_ref::<AppError>(),
                Some(AppError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_delete_refill_removes_stock() {
        let (svc, repo) = service().await;
        let r = svc.record_refill("t", refill(300.0, None)).await.unwrap();

        svc.delete_refill("t", r.id).await.unwrap();
        let status = repo.status().await.unwrap();
        assert!(status.current_liters.abs() < 1e-9);

        let err = svc.delete_refill("t", r.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::NotFound(_))
        ));
    }
}
