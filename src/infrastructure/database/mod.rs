pub mod sqlite_repo;

pub use sqlite_repo::{
    SqliteFuelEntryRepository, SqliteMaintenanceRepository, SqliteTankRepository,
    SqliteVehicleRepository,
};

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;

/// Snapshot the live database into `dest` using VACUUM INTO.
/// Produces a consistent copy without closing the pool. The destination
/// must not already exist (SQLite refuses to overwrite).
pub async fn backup_to(pool: &SqlitePool, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create backup directory {:?}", parent))?;
        }
    }

    let dest_str = dest
        .to_str()
        .context("backup destination is not valid UTF-8")?;

    sqlx::query("VACUUM INTO ?")
        .bind(dest_str)
        .execute(pool)
        .await
        .with_context(|| format!("failed to back up database to {:?}", dest))?;

    Ok(())
}
