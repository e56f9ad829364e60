use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered mod as seen by callers. The surrogate key stays internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredMod {
    #[serde(skip)]
    pub id: i32,
    pub mod_id: String,
    pub mod_name: String,
}

/// Composite identity of an aggregated usage record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UsageKey {
    pub mod_id: String,
    pub game_version: String,
    pub mod_version: String,
    pub loader: String,
}

/// Aggregated usage counter for one (mod, game version, mod version, loader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub mod_id: String,
    pub game_version: String,
    pub mod_version: String,
    pub loader: String,
    pub count: i64,
    pub last_used: NaiveDate,
}

/// A telemetry record joined to its mod's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    pub mod_name: String,
    pub record: TelemetryRecord,
}
