mod export;
pub mod health;
pub mod helpers;
mod mods;
pub mod routes;
mod statistics;
mod telemetry;
pub mod types;

pub use health::HealthService;
pub use helpers::{error_from_telemetry, json_config, json_response};
pub use routes::{normalize_route_prefix, statistics_routes, telemetry_routes};
pub use types::*;
