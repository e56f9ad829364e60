//! Usage statistics and CSV export
//!
//! Every operation checks the access gate before touching the store.
//! Usage figures are folded from the aggregated rows, whose number is bounded
//! by distinct (mod, game version, mod version, loader) combinations. Ties
//! are ordered by name ascending.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::access_gate::AccessGate;
use crate::errors::{Result, TelemetryError};
use crate::storage::{MOD_DOES_NOT_EXIST, SeaOrmStorage, TelemetryRecord, UsageEntry};
use crate::utils::CsvExport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModUsage {
    pub mod_name: String,
    pub usage: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModVersionUsage {
    pub mod_version: String,
    pub game_version: String,
    pub loader: String,
    pub usage: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameVersionUsage {
    pub game_version: String,
    pub usage: i64,
}

/// Sum counts per mod display name, highest usage first.
pub fn aggregate_by_mod(entries: &[UsageEntry]) -> Vec<ModUsage> {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for entry in entries {
        *totals.entry(entry.mod_name.as_str()).or_default() += entry.record.count;
    }

    let mut usage: Vec<ModUsage> = totals
        .into_iter()
        .map(|(mod_name, usage)| ModUsage {
            mod_name: mod_name.to_string(),
            usage,
        })
        .collect();
    usage.sort_by(|a, b| b.usage.cmp(&a.usage).then_with(|| a.mod_name.cmp(&b.mod_name)));
    usage
}

/// Sum counts per game version, highest usage first.
pub fn aggregate_by_game_version(entries: &[UsageEntry]) -> Vec<GameVersionUsage> {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for entry in entries {
        *totals.entry(entry.record.game_version.as_str()).or_default() += entry.record.count;
    }

    let mut usage: Vec<GameVersionUsage> = totals
        .into_iter()
        .map(|(game_version, usage)| GameVersionUsage {
            game_version: game_version.to_string(),
            usage,
        })
        .collect();
    usage.sort_by(|a, b| {
        b.usage
            .cmp(&a.usage)
            .then_with(|| a.game_version.cmp(&b.game_version))
    });
    usage
}

/// One mod's records are already unique per (mod_version, game_version,
/// loader); rank them by count.
pub fn rank_mod_versions(records: Vec<TelemetryRecord>) -> Vec<ModVersionUsage> {
    let mut usage: Vec<ModVersionUsage> = records
        .into_iter()
        .map(|record| ModVersionUsage {
            mod_version: record.mod_version,
            game_version: record.game_version,
            loader: record.loader,
            usage: record.count,
        })
        .collect();
    usage.sort_by(|a, b| {
        b.usage
            .cmp(&a.usage)
            .then_with(|| a.mod_version.cmp(&b.mod_version))
            .then_with(|| a.game_version.cmp(&b.game_version))
            .then_with(|| a.loader.cmp(&b.loader))
    });
    usage
}

pub struct ReportingService {
    storage: Arc<SeaOrmStorage>,
    gate: Arc<AccessGate>,
    export_dir: PathBuf,
}

impl ReportingService {
    pub fn new(storage: Arc<SeaOrmStorage>, gate: Arc<AccessGate>, export_dir: PathBuf) -> Self {
        Self {
            storage,
            gate,
            export_dir,
        }
    }

    fn authorize(&self, password: Option<&str>, operation: &str) -> Result<()> {
        self.gate.authorize(password).inspect_err(|_| {
            warn!("{} rejected: incorrect password", operation);
        })
    }

    pub async fn most_used_mods(&self, password: Option<&str>) -> Result<Vec<ModUsage>> {
        self.authorize(password, "Mod statistics")?;
        let entries = self.storage.load_usage().await?;
        Ok(aggregate_by_mod(&entries))
    }

    pub async fn most_used_mod_versions(
        &self,
        password: Option<&str>,
        mod_id: &str,
    ) -> Result<Vec<ModVersionUsage>> {
        self.authorize(password, "Mod version statistics")?;

        let owner = self
            .storage
            .find_mod(mod_id.trim())
            .await?
            .ok_or_else(|| TelemetryError::not_found(MOD_DOES_NOT_EXIST))?;

        let records = self.storage.load_mod_usage(&owner).await?;
        Ok(rank_mod_versions(records))
    }

    pub async fn most_used_game_versions(
        &self,
        password: Option<&str>,
    ) -> Result<Vec<GameVersionUsage>> {
        self.authorize(password, "Game version statistics")?;
        let entries = self.storage.load_usage().await?;
        Ok(aggregate_by_game_version(&entries))
    }

    /// Write every usage record to a transient CSV file.
    ///
    /// The returned handle owns the file; dropping it deletes the file.
    pub async fn export_csv(&self, password: Option<&str>) -> Result<CsvExport> {
        self.authorize(password, "CSV export")?;
        self.write_export().await
    }

    /// Export without the gate, for local operator tooling.
    pub async fn write_export(&self) -> Result<CsvExport> {
        let records: Vec<TelemetryRecord> = self
            .storage
            .load_usage()
            .await?
            .into_iter()
            .map(|entry| entry.record)
            .collect();

        let dir = self.export_dir.clone();
        let export = tokio::task::spawn_blocking(move || CsvExport::create_in(&dir, &records))
            .await
            .map_err(|e| TelemetryError::file_operation(format!("CSV export task failed: {}", e)))??;

        info!(
            "CSV export written: {} ({} rows)",
            export.filename(),
            export.rows()
        );
        Ok(export)
    }
}
