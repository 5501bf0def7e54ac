use crate::middlewares::{current_user, optional_user};
use crate::models::*;
use crate::services::PrizeService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/prizes",
    tag = "prizes",
    responses(
        (status = 200, description = "奖品列表", body = [PrizeResponse])
    )
)]
pub async fn list_prizes(
    prize_service: web::Data<PrizeService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = optional_user(&req).map(|u| u.id);

    match prize_service.list_prizes(user_id).await {
        Ok(prizes) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": prizes
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/prizes/{id}/participate",
    tag = "prizes",
    params(("id" = Uuid, Path, description = "奖品 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "购票成功", body = ParticipateResponse),
        (status = 400, description = "积分不足 / 缺少收货地址", body = ApiErrorResponse),
        (status = 404, description = "奖品不存在", body = ApiErrorResponse),
        (status = 409, description = "奖品已满", body = ApiErrorResponse)
    )
)]
pub async fn participate(
    prize_service: web::Data<PrizeService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match prize_service.participate(user.id, path.into_inner()).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/winners",
    tag = "prizes",
    responses(
        (status = 200, description = "中奖名单", body = [WinnerResponse])
    )
)]
pub async fn list_winners(prize_service: web::Data<PrizeService>) -> Result<HttpResponse> {
    match prize_service.list_winners().await {
        Ok(winners) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": winners
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn prize_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/prizes", web::get().to(list_prizes))
        .route("/prizes/{id}/participate", web::post().to(participate))
        .route("/winners", web::get().to(list_winners));
}
