//! Request field checks shared by registration and ingestion

use crate::errors::{Result, TelemetryError};

pub const MOD_ID_MAX_LEN: usize = 50;
pub const MOD_NAME_MAX_LEN: usize = 100;
pub const GAME_VERSION_MAX_LEN: usize = 10;
pub const MOD_VERSION_MAX_LEN: usize = 10;
pub const LOADER_MAX_LEN: usize = 25;

/// Returns the trimmed values in order, or `MissingFields` naming every
/// absent or blank field.
pub fn require_fields<const N: usize>(
    fields: [(&'static str, Option<String>); N],
) -> Result<[String; N]> {
    let mut missing = Vec::new();
    let values = fields.map(|(name, value)| {
        match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => {
                missing.push(name);
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(values)
    } else {
        Err(TelemetryError::missing_fields(format!(
            "Missing data: {}",
            missing.join(", ")
        )))
    }
}

pub fn ensure_max_len(name: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(TelemetryError::validation(format!(
            "{} must be at most {} characters",
            name, max
        )));
    }
    Ok(())
}
