//! Password-gated usage statistics

use actix_web::http::StatusCode;
use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::trace;

use crate::services::ReportingService;

use super::helpers::api_result;
use super::types::{
    GameVersionStatisticsResponse, ModStatisticsResponse, ModVersionStatisticsResponse,
    PasswordQuery,
};

/// GET /statistics/mods
pub async fn most_used_mods(
    query: web::Query<PasswordQuery>,
    reporting: web::Data<Arc<ReportingService>>,
) -> ActixResult<impl Responder> {
    trace!("API: mod statistics requested");
    let result = reporting
        .most_used_mods(query.password.as_deref())
        .await
        .map(|mods| ModStatisticsResponse { mods });
    Ok(api_result(StatusCode::OK, result))
}

/// GET /statistics/mod_versions/{mod_id}
pub async fn most_used_mod_versions(
    path: web::Path<String>,
    query: web::Query<PasswordQuery>,
    reporting: web::Data<Arc<ReportingService>>,
) -> ActixResult<impl Responder> {
    let mod_id = path.into_inner();
    trace!("API: version statistics requested for {}", mod_id);
    let result = reporting
        .most_used_mod_versions(query.password.as_deref(), &mod_id)
        .await
        .map(|mod_versions| ModVersionStatisticsResponse { mod_versions });
    Ok(api_result(StatusCode::OK, result))
}

/// GET /statistics/game_versions
pub async fn most_used_game_versions(
    query: web::Query<PasswordQuery>,
    reporting: web::Data<Arc<ReportingService>>,
) -> ActixResult<impl Responder> {
    trace!("API: game version statistics requested");
    let result = reporting
        .most_used_game_versions(query.password.as_deref())
        .await
        .map(|game_versions| GameVersionStatisticsResponse { game_versions });
    Ok(api_result(StatusCode::OK, result))
}
