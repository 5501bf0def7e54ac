use crate::middlewares::current_user;
use crate::models::*;
use crate::services::{EarningService, TapTapService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    post,
    path = "/games/scratch",
    tag = "games",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "刮刮卡结果", body = ScratchResponse),
        (status = 429, description = "冷却中", body = ApiErrorResponse)
    )
)]
pub async fn scratch(
    earning_service: web::Data<EarningService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match earning_service.scratch(user.id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/games/wheel",
    tag = "games",
    request_body = WheelRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "转盘结果", body = WheelResponse),
        (status = 400, description = "下注无效 / 积分不足", body = ApiErrorResponse),
        (status = 429, description = "冷却中", body = ApiErrorResponse)
    )
)]
pub async fn wheel(
    earning_service: web::Data<EarningService>,
    req: HttpRequest,
    request: web::Json<WheelRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match earning_service.wheel(user.id, request.bet).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/games/wheel/rescue",
    tag = "games",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "下注已找回", body = WheelRescueResponse),
        (status = 400, description = "没有可找回的下注", body = ApiErrorResponse)
    )
)]
pub async fn wheel_rescue(
    earning_service: web::Data<EarningService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match earning_service.rescue_wheel(user.id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/games/slot",
    tag = "games",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "VIP 老虎机结果", body = SlotResponse),
        (status = 403, description = "非 VIP", body = ApiErrorResponse),
        (status = 429, description = "冷却中", body = ApiErrorResponse)
    )
)]
pub async fn vip_slot(
    earning_service: web::Data<EarningService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match earning_service.vip_slot(user.id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/games/tap-tap",
    tag = "games",
    request_body = SubmitScoreRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "成绩已提交", body = LeaderboardEntry),
        (status = 403, description = "仅限 VIP+", body = ApiErrorResponse)
    )
)]
pub async fn submit_tap_tap_score(
    tap_tap_service: web::Data<TapTapService>,
    req: HttpRequest,
    request: web::Json<SubmitScoreRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match tap_tap_service.submit_score(user.id, request.score).await {
        Ok(entry) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": entry
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/games/tap-tap/leaderboard",
    tag = "games",
    responses(
        (status = 200, description = "本周排行榜", body = [LeaderboardEntry])
    )
)]
pub async fn tap_tap_leaderboard(
    tap_tap_service: web::Data<TapTapService>,
) -> Result<HttpResponse> {
    match tap_tap_service.leaderboard(Utc::now()).await {
        Ok(entries) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": entries
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/games/tap-tap/previous-winner",
    tag = "games",
    responses(
        (status = 200, description = "上周冠军（可能为空）", body = WeeklyWinnerResponse)
    )
)]
pub async fn tap_tap_previous_winner(
    tap_tap_service: web::Data<TapTapService>,
) -> Result<HttpResponse> {
    match tap_tap_service.previous_week_winner(Utc::now()).await {
        Ok(winner) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": winner
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn game_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/games")
            .route("/scratch", web::post().to(scratch))
            .route("/wheel", web::post().to(wheel))
            .route("/wheel/rescue", web::post().to(wheel_rescue))
            .route("/slot", web::post().to(vip_slot))
            .route("/tap-tap", web::post().to(submit_tap_tap_score))
            .route("/tap-tap/leaderboard", web::get().to(tap_tap_leaderboard))
            .route("/tap-tap/previous-winner", web::get().to(tap_tap_previous_winner)),
    );
}
