//! Server mode
//!
//! Starts the HTTP server and waits for it or for Ctrl+C.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, warn};

use crate::api::middleware::TimingMiddleware;
use crate::config::StaticConfig;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let startup = lifetime::prepare_server_startup(config)
        .await
        .inspect_err(|e| error!("Server startup failed: {:#}", e))?;

    // Clone db reference before the context moves into the HttpServer closure
    let db_for_shutdown = startup.storage.get_db().clone();

    let workers = config.server.workers.clamp(1, 32);
    warn!("Using {} worker threads for the server", workers);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!(
        "Starting server at http://{}{}",
        bind_address, startup.route_prefix
    );

    let server = HttpServer::new(move || {
        let context = startup.clone();
        App::new()
            .wrap(DefaultHeaders::new().add((
                "Cache-Control",
                "no-cache, no-store, must-revalidate",
            )))
            .wrap(Compress::default())
            .wrap(TimingMiddleware) // 最外层，记录请求延迟
            .configure(|cfg| context.configure(cfg))
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .workers(workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tokio::select! {
        res = server => {
            res.context("HTTP server terminated with an error")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown complete");
        }
    }

    Ok(())
}
