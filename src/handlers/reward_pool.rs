use crate::middlewares::current_user;
use crate::models::*;
use crate::services::RewardPoolService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/rewards-pools/list",
    tag = "rewards-pools",
    responses(
        (status = 200, description = "奖池列表", body = [RewardPoolResponse])
    )
)]
pub async fn list_pools(pool_service: web::Data<RewardPoolService>) -> Result<HttpResponse> {
    match pool_service.list_pools().await {
        Ok(pools) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": pools
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/rewards-pools/watch",
    tag = "rewards-pools",
    request_body = PoolIdRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "观看已记录", body = PoolWatchResponse),
        (status = 429, description = "超出每日上限", body = ApiErrorResponse)
    )
)]
pub async fn watch(
    pool_service: web::Data<RewardPoolService>,
    req: HttpRequest,
    request: web::Json<PoolIdRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match pool_service.watch(user.id, request.pool_id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/rewards-pools/participate",
    tag = "rewards-pools",
    request_body = PoolParticipateRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "投入成功", body = PoolParticipateResponse),
        (status = 400, description = "积分不足", body = ApiErrorResponse),
        (status = 429, description = "请求过快", body = ApiErrorResponse)
    )
)]
pub async fn participate(
    pool_service: web::Data<RewardPoolService>,
    req: HttpRequest,
    request: web::Json<PoolParticipateRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match pool_service
        .participate(user.id, request.pool_id, request.ticket_count())
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
    path = "/rewards-pools/purchase",
    tag = "rewards-pools",
    request_body = PoolIdRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "兑换成功", body = PoolPurchaseResponse),
        (status = 400, description = "积分不足", body = ApiErrorResponse),
        (status = 404, description = "奖池不存在", body = ApiErrorResponse)
    )
)]
pub async fn purchase(
    pool_service: web::Data<RewardPoolService>,
    req: HttpRequest,
    request: web::Json<PoolIdRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match pool_service.purchase(user.id, request.pool_id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn reward_pool_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rewards-pools")
            .route("/list", web::get().to(list_pools))
            .route("/watch", web::post().to(watch))
            .route("/participate", web::post().to(participate))
            .route("/purchase", web::post().to(purchase)),
    )
    .route("/purchase", web::post().to(purchase));
}
