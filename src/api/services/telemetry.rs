//! Usage ping ingestion endpoint

use actix_web::http::StatusCode;
use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;

use crate::services::TelemetryService;

use super::helpers::{error_from_telemetry, json_response};
use super::types::{PingBody, TelemetrySavedResponse};

/// POST /data
pub async fn record_ping(
    body: web::Json<PingBody>,
    telemetry: web::Data<Arc<TelemetryService>>,
) -> ActixResult<impl Responder> {
    let result = telemetry.record_ping(body.into_inner().into()).await;

    Ok(match result {
        Ok(record) => json_response(
            StatusCode::CREATED,
            TelemetrySavedResponse {
                message: "Data saved successfully".to_string(),
                telemetry: record,
            },
        ),
        Err(e) => error_from_telemetry(&e),
    })
}
