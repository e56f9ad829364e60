//! modtelemetry - usage telemetry backend for game mods
//!
//! Mods are registered once; game clients then report usage pings keyed by
//! (mod, game version, mod version, loader), which are folded into per-key
//! counters. Password-gated endpoints serve aggregate statistics and a CSV
//! export of every counter.
//!
//! # Architecture
//! - `storage`: SeaORM backend (SQLite, MySQL/MariaDB, PostgreSQL)
//! - `services`: access gate, registry, ping recording, reporting
//! - `api`: actix-web handlers and route table
//! - `config`: TOML + environment configuration
//! - `runtime`: startup wiring, server and export modes, shutdown
//! - `system`: logging
//! - `utils`: CSV export files

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
