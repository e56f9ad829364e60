//! Service layer for business logic
//!
//! This module provides the business logic shared between the HTTP API and
//! the CLI: the access gate, the mod registry, usage recording and reporting.

mod access_gate;
mod registry;
mod reporting;
mod telemetry_service;
pub mod validation;

pub use access_gate::AccessGate;
pub use registry::*;
pub use reporting::*;
pub use telemetry_service::*;
