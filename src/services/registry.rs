//! Mod registry service
//!
//! Owns the catalog of known mods. Listing is public; registration requires
//! the shared password.

use std::sync::Arc;

use tracing::{info, warn};

use super::access_gate::AccessGate;
use super::validation::{MOD_ID_MAX_LEN, MOD_NAME_MAX_LEN, ensure_max_len, require_fields};
use crate::errors::{Result, TelemetryError};
use crate::storage::{RegisteredMod, SeaOrmStorage};

/// Request to register a new mod
#[derive(Debug, Clone, Default)]
pub struct NewModRequest {
    pub mod_id: Option<String>,
    pub mod_name: Option<String>,
    pub password: Option<String>,
}

pub struct RegistryService {
    storage: Arc<SeaOrmStorage>,
    gate: Arc<AccessGate>,
}

impl RegistryService {
    pub fn new(storage: Arc<SeaOrmStorage>, gate: Arc<AccessGate>) -> Self {
        Self { storage, gate }
    }

    pub async fn list_mods(&self) -> Result<Vec<RegisteredMod>> {
        self.storage.list_mods().await
    }

    /// Register a mod.
    ///
    /// Checks run in order: password, required fields, field lengths, then
    /// the duplicate check inside the storage transaction.
    pub async fn register_mod(&self, request: NewModRequest) -> Result<RegisteredMod> {
        if let Err(e) = self.gate.authorize(request.password.as_deref()) {
            warn!("Mod registration rejected: incorrect password");
            return Err(e);
        }

        let [mod_id, mod_name] = require_fields([
            ("mod_id", request.mod_id),
            ("mod_name", request.mod_name),
        ])?;
        ensure_max_len("mod_id", &mod_id, MOD_ID_MAX_LEN)?;
        ensure_max_len("mod_name", &mod_name, MOD_NAME_MAX_LEN)?;

        match self.storage.insert_mod(&mod_id, &mod_name).await {
            Ok(registered) => {
                info!("Registered mod {}", registered.mod_id);
                Ok(registered)
            }
            Err(e @ TelemetryError::Conflict(_)) => {
                warn!("Mod registration rejected: {} already exists", mod_id);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}
