use actix_web::web;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::services::{json_config, normalize_route_prefix, telemetry_routes};
use crate::config::StaticConfig;
use crate::services::{AccessGate, RegistryService, ReportingService, TelemetryService};
use crate::storage::{SeaOrmStorage, StorageFactory};

/// Everything a worker needs to serve requests.
#[derive(Clone)]
pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub gate: Arc<AccessGate>,
    pub registry: Arc<RegistryService>,
    pub telemetry: Arc<TelemetryService>,
    pub reporting: Arc<ReportingService>,
    pub route_prefix: String,
}

impl StartupContext {
    /// Wire the services over an already connected storage.
    pub fn new(storage: Arc<SeaOrmStorage>, config: &StaticConfig) -> Self {
        let gate = Arc::new(AccessGate::new(config.auth.password.clone()));
        if !gate.is_configured() {
            warn!(
                "No shared password configured (auth.password / PASSWORD): \
                 registration, statistics and export will reject every request"
            );
        }

        let registry = Arc::new(RegistryService::new(storage.clone(), gate.clone()));
        let telemetry = Arc::new(TelemetryService::new(storage.clone()));
        let reporting = Arc::new(ReportingService::new(
            storage.clone(),
            gate.clone(),
            config.export.resolve_temp_dir(),
        ));

        Self {
            storage,
            gate,
            registry,
            telemetry,
            reporting,
            route_prefix: normalize_route_prefix(&config.server.route_prefix),
        }
    }

    /// Register shared state and routes on an `App`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.storage.clone()))
            .app_data(web::Data::new(self.registry.clone()))
            .app_data(web::Data::new(self.telemetry.clone()))
            .app_data(web::Data::new(self.reporting.clone()))
            .app_data(json_config())
            .service(telemetry_routes(&self.route_prefix));
    }
}

/// 准备服务器启动的上下文：连接存储并构建服务
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let mods = storage.count_mods().await.unwrap_or_else(|e| {
        warn!("Failed to count registered mods: {}", e);
        0
    });
    let records = storage.count_records().await.unwrap_or_else(|e| {
        warn!("Failed to count telemetry records: {}", e);
        0
    });
    info!(
        "Loaded {} registered mods and {} telemetry records",
        mods, records
    );

    let context = StartupContext::new(storage, config);
    debug!("Pre-startup processing completed in {:?}", start_time.elapsed());
    Ok(context)
}
