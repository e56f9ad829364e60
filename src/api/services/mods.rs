//! Mod registry endpoints

use actix_web::http::StatusCode;
use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{info, trace};

use crate::services::RegistryService;

use super::helpers::{error_from_telemetry, json_response};
use super::types::{ModCreatedResponse, ModListResponse, PasswordQuery, RegisterModBody};

/// GET /mods
pub async fn list_mods(registry: web::Data<Arc<RegistryService>>) -> ActixResult<impl Responder> {
    trace!("API: request to list mods");

    Ok(match registry.list_mods().await {
        Ok(mods) => {
            info!("API: returning {} mods", mods.len());
            json_response(
                StatusCode::OK,
                ModListResponse {
                    count: mods.len(),
                    mods,
                },
            )
        }
        Err(e) => error_from_telemetry(&e),
    })
}

/// POST /mods
pub async fn register_mod(
    query: web::Query<PasswordQuery>,
    body: web::Json<RegisterModBody>,
    registry: web::Data<Arc<RegistryService>>,
) -> ActixResult<impl Responder> {
    let request = body.into_inner().into_request(query.into_inner().password);

    Ok(match registry.register_mod(request).await {
        Ok(registered) => json_response(
            StatusCode::CREATED,
            ModCreatedResponse {
                message: "Mod created successfully".to_string(),
                registered,
            },
        ),
        Err(e) => error_from_telemetry(&e),
    })
}
