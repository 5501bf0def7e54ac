use crate::middlewares::current_user;
use crate::models::*;
use crate::services::{EarningService, LedgerService, ProfileService, VipService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/user/profile",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取用户资料成功", body = ProfileResponse),
        (status = 401, description = "未授权", body = ApiErrorResponse),
        (status = 404, description = "用户不存在", body = ApiErrorResponse)
    )
)]
pub async fn get_profile(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match profile_service.get_profile(user.id).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/user/profile",
    tag = "user",
    request_body = UpdateProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "更新用户资料成功", body = ProfileResponse),
        (status = 401, description = "未授权", body = ApiErrorResponse)
    )
)]
pub async fn update_profile(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match profile_service
        .update_profile(user.id, request.into_inner())
        .await
    {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/transactions",
    tag = "user",
    params(PaginationParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "积分流水", body = [LedgerEntryResponse]),
        (status = 401, description = "未授权", body = ApiErrorResponse)
    )
)]
pub async fn get_transactions(
    ledger_service: web::Data<LedgerService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match ledger_service.history(user.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/tickets",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "我的奖品票", body = [TicketResponse])
    )
)]
pub async fn get_my_tickets(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match profile_service.my_tickets(user.id).await {
        Ok(tickets) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": tickets
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/rewards",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "我的奖励", body = [RewardResponse])
    )
)]
pub async fn get_my_rewards(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match profile_service.my_rewards(user.id).await {
        Ok(rewards) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": rewards
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/user/claim-daily",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "VIP 每日奖励", body = ClaimDailyResponse),
        (status = 403, description = "非 VIP", body = ApiErrorResponse),
        (status = 409, description = "今日已领取", body = ApiErrorResponse)
    )
)]
pub async fn claim_daily(
    vip_service: web::Data<VipService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match vip_service.claim_daily(user.id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/user/update-points",
    tag = "user",
    request_body = UpdatePointsRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "积分已更新", body = UpdatePointsResponse),
        (status = 400, description = "积分不足或参数错误", body = ApiErrorResponse),
        (status = 429, description = "冷却中", body = ApiErrorResponse)
    )
)]
pub async fn update_points(
    earning_service: web::Data<EarningService>,
    req: HttpRequest,
    request: web::Json<UpdatePointsRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match earning_service
        .update_points(user.id, request.into_inner())
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/rewards/ad-view",
    tag = "earning",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "广告奖励已发放", body = AdViewResponse),
        (status = 429, description = "超出每小时 / 每日上限", body = ApiErrorResponse)
    )
)]
pub async fn reward_ad_view(
    earning_service: web::Data<EarningService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match earning_service.reward_ad_view(user.id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::put().to(update_profile))
            .route("/transactions", web::get().to(get_transactions))
            .route("/tickets", web::get().to(get_my_tickets))
            .route("/rewards", web::get().to(get_my_rewards))
            .route("/claim-daily", web::post().to(claim_daily))
            .route("/update-points", web::post().to(update_points)),
    )
    // 旧客户端路径
    .route("/claim-daily", web::post().to(claim_daily))
    .route("/rewards/ad-view", web::post().to(reward_ad_view));
}
