//! Route table
//!
//! Everything is mounted under the configured prefix:
//! - GET  /health
//! - GET  /mods, POST /mods
//! - POST /data
//! - GET  /statistics/mods
//! - GET  /statistics/mod_versions/{mod_id}
//! - GET  /statistics/game_versions
//! - GET  /export/csv

use actix_web::web;

use super::export::export_csv;
use super::health::HealthService;
use super::mods::{list_mods, register_mod};
use super::statistics::{most_used_game_versions, most_used_mod_versions, most_used_mods};
use super::telemetry::record_ping;

/// 统计路由 `/statistics`
pub fn statistics_routes() -> actix_web::Scope {
    web::scope("/statistics")
        .route("/mods", web::get().to(most_used_mods))
        .route("/mod_versions/{mod_id}", web::get().to(most_used_mod_versions))
        .route("/game_versions", web::get().to(most_used_game_versions))
}

pub fn telemetry_routes(prefix: &str) -> actix_web::Scope {
    web::scope(prefix)
        .route("/health", web::get().to(HealthService::health_check))
        .route("/mods", web::get().to(list_mods))
        .route("/mods", web::post().to(register_mod))
        .route("/data", web::post().to(record_ping))
        .service(statistics_routes())
        .route("/export/csv", web::get().to(export_csv))
}

/// Trim trailing slashes; `/` and blank mean "mount at the root".
pub fn normalize_route_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
