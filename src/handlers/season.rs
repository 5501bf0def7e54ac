use crate::models::*;
use crate::services::SeasonService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/check-season",
    tag = "seasons",
    responses(
        (status = 200, description = "当前赛季（必要时已重置）", body = SeasonCheckResponse),
        (status = 404, description = "没有进行中的赛季", body = ApiErrorResponse)
    )
)]
pub async fn check_season(season_service: web::Data<SeasonService>) -> Result<HttpResponse> {
    match season_service.check_season(Utc::now()).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn season_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/check-season", web::get().to(check_season))
        .route("/check-season", web::post().to(check_season));
}
