pub mod game_mod;
pub mod telemetry;

pub use game_mod::Entity as GameModEntity;
pub use telemetry::Entity as TelemetryEntity;
