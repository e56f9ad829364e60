//! Response helpers shared by the handlers

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, error::InternalError, web};
use serde::Serialize;
use tracing::{error, warn};

use crate::errors::{Result, TelemetryError};

use super::types::ErrorBody;

pub const INVALID_JSON_BODY: &str = "Invalid JSON body";

/// Largest accepted JSON body.
const JSON_BODY_LIMIT: usize = 64 * 1024;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(status: StatusCode, body: T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(body)
}

/// 从 TelemetryError 构建错误响应
///
/// Internal errors are logged here and reach the caller only as a generic
/// message.
pub fn error_from_telemetry(err: &TelemetryError) -> HttpResponse {
    if err.is_internal() {
        error!("Request failed: {}", err);
    }
    json_response(
        err.http_status(),
        ErrorBody {
            error: err.public_message().to_string(),
            code: err.code().to_string(),
        },
    )
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(status: StatusCode, result: Result<T>) -> HttpResponse {
    match result {
        Ok(body) => json_response(status, body),
        Err(e) => error_from_telemetry(&e),
    }
}

/// JSON extractor settings: malformed or oversized bodies become
/// `400 {"error": "Invalid JSON body"}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, req| {
            warn!("Rejected body for {}: {}", req.path(), err);
            let response = error_from_telemetry(&TelemetryError::validation(INVALID_JSON_BODY));
            InternalError::from_response(err, response).into()
        })
}
