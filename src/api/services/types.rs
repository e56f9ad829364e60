//! Request and response bodies

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::services::{
    GameVersionUsage, ModUsage, ModVersionUsage, NewModRequest, PingRequest,
};
use crate::storage::{RegisteredMod, TelemetryRecord};

/// A field counts as present only when it is a JSON string; numbers, `null`
/// and objects are treated as missing.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordQuery {
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterModBody {
    #[serde(default, deserialize_with = "lenient_string")]
    pub mod_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mod_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
}

impl RegisterModBody {
    /// The body password wins; the query parameter is the fallback.
    pub fn into_request(self, query_password: Option<String>) -> NewModRequest {
        NewModRequest {
            mod_id: self.mod_id,
            mod_name: self.mod_name,
            password: self.password.or(query_password),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PingBody {
    #[serde(default, deserialize_with = "lenient_string")]
    pub mod_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub game_version: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mod_version: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub loader: Option<String>,
}

impl From<PingBody> for PingRequest {
    fn from(body: PingBody) -> Self {
        PingRequest {
            mod_id: body.mod_id,
            game_version: body.game_version,
            mod_version: body.mod_version,
            loader: body.loader,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub database: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModListResponse {
    pub mods: Vec<RegisteredMod>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModCreatedResponse {
    pub message: String,
    #[serde(rename = "mod")]
    pub registered: RegisteredMod,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TelemetrySavedResponse {
    pub message: String,
    pub telemetry: TelemetryRecord,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModStatisticsResponse {
    pub mods: Vec<ModUsage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModVersionStatisticsResponse {
    pub mod_versions: Vec<ModVersionUsage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GameVersionStatisticsResponse {
    pub game_versions: Vec<GameVersionUsage>,
}
