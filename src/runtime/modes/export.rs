//! Offline CSV export
//!
//! Writes the same file the HTTP endpoint serves, straight to a path. Needs
//! local database access, so no password is asked for.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::config::StaticConfig;
use crate::runtime::lifetime;
use crate::utils::parse_export;

pub async fn run_export(config: &StaticConfig, dest: &Path) -> Result<usize> {
    let startup = lifetime::prepare_server_startup(config).await?;

    let export = startup
        .reporting
        .write_export()
        .await
        .context("Failed to write CSV export")?;
    let rows = export.rows();

    export
        .persist_to(dest)
        .with_context(|| format!("Failed to save export to {}", dest.display()))?;

    // 读回校验
    let parsed = parse_export(dest).context("Exported file is not readable")?;
    info!("Exported {} telemetry records to {}", parsed.len(), dest.display());

    if let Err(e) = startup.storage.get_db().clone().close().await {
        warn!("Failed to close database connections: {}", e);
    }
    Ok(rows)
}
