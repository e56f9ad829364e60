use migration::entities::{game_mod, telemetry};

use crate::storage::{RegisteredMod, TelemetryRecord};

pub fn model_to_registered_mod(model: game_mod::Model) -> RegisteredMod {
    RegisteredMod {
        id: model.id,
        mod_id: model.mod_id,
        mod_name: model.mod_name,
    }
}

/// `external_mod_id` is the owning mod's public identifier; the row only
/// carries the surrogate key.
pub fn model_to_record(model: telemetry::Model, external_mod_id: &str) -> TelemetryRecord {
    TelemetryRecord {
        mod_id: external_mod_id.to_string(),
        game_version: model.game_version,
        mod_version: model.mod_version,
        loader: model.loader,
        count: model.count,
        last_used: model.last_used,
    }
}
