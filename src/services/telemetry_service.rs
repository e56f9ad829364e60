//! Usage ping ingestion
//!
//! Unauthenticated: any client may report usage for any registered mod.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::validation::{
    GAME_VERSION_MAX_LEN, LOADER_MAX_LEN, MOD_ID_MAX_LEN, MOD_VERSION_MAX_LEN, ensure_max_len,
    require_fields,
};
use crate::errors::{Result, TelemetryError};
use crate::storage::{SeaOrmStorage, TelemetryRecord, UsageKey};

/// One usage report from a game client
#[derive(Debug, Clone, Default)]
pub struct PingRequest {
    pub mod_id: Option<String>,
    pub game_version: Option<String>,
    pub mod_version: Option<String>,
    pub loader: Option<String>,
}

pub struct TelemetryService {
    storage: Arc<SeaOrmStorage>,
}

impl TelemetryService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Record a ping and return the aggregated record with its current count.
    pub async fn record_ping(&self, request: PingRequest) -> Result<TelemetryRecord> {
        let [mod_id, game_version, mod_version, loader] = require_fields([
            ("mod_id", request.mod_id),
            ("game_version", request.game_version),
            ("mod_version", request.mod_version),
            ("loader", request.loader),
        ])?;
        ensure_max_len("mod_id", &mod_id, MOD_ID_MAX_LEN)?;
        ensure_max_len("game_version", &game_version, GAME_VERSION_MAX_LEN)?;
        ensure_max_len("mod_version", &mod_version, MOD_VERSION_MAX_LEN)?;
        ensure_max_len("loader", &loader, LOADER_MAX_LEN)?;

        let key = UsageKey {
            mod_id,
            game_version,
            mod_version,
            loader,
        };

        match self.storage.record_usage(&key, Utc::now().date_naive()).await {
            Ok(record) => {
                debug!("Ping accepted for {} (count {})", record.mod_id, record.count);
                Ok(record)
            }
            Err(e @ TelemetryError::NotFound(_)) => {
                warn!("Ping rejected: unknown mod {}", key.mod_id);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}
