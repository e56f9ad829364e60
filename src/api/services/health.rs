use actix_web::http::StatusCode;
use actix_web::{Responder, web};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, trace};

use crate::storage::SeaOrmStorage;

use super::helpers::json_response;
use super::types::HealthResponse;

/// Upper bound for the database ping.
const HEALTH_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Health Service
///
/// Talks to storage directly: a health check must answer quickly and should not
/// depend on business logic. Always answers 200; a failed database ping
/// only marks the service as degraded.
pub struct HealthService;

impl HealthService {
    pub async fn health_check(storage: web::Data<Arc<SeaOrmStorage>>) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let connected = match tokio::time::timeout(HEALTH_PING_TIMEOUT, storage.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!("Health check: database ping failed: {}", e);
                false
            }
            Err(_) => {
                error!("Health check: database ping timed out");
                false
            }
        };

        let body = HealthResponse {
            status: if connected { "healthy" } else { "degraded" }.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            database: if connected { "connected" } else { "unreachable" }.to_string(),
        };

        trace!(
            "Health check completed in {:?}, status: {}",
            start_time.elapsed(),
            body.status
        );
        json_response(StatusCode::OK, body)
    }
}
