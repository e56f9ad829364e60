//! Execution modes

pub mod export;
pub mod server;

pub use export::run_export;
pub use server::run_server;
