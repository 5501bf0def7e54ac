use crate::error::AppResult;
use crate::middlewares::current_user;
use crate::models::*;
use crate::services::{
    AdminService, DrawService, PrizeService, RewardPoolService, SeasonService, SettingsService,
};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

/// 登录且具备管理员角色，返回管理员 id
async fn require_admin(req: &HttpRequest, admin_service: &AdminService) -> AppResult<Uuid> {
    let user = current_user(req)?;
    admin_service.require_admin(user.id).await?;
    Ok(user.id)
}

// ---- 用户 ----

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    params(PaginationParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "用户列表", body = [AdminUserResponse]),
        (status = 403, description = "需要管理员权限", body = ApiErrorResponse)
    )
)]
pub async fn list_users(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match admin_service.list_users(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/users/update",
    tag = "admin",
    request_body = AdminUpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "用户已更新", body = AdminUserResponse),
        (status = 400, description = "参数错误", body = ApiErrorResponse),
        (status = 403, description = "需要管理员权限", body = ApiErrorResponse)
    )
)]
pub async fn update_user(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
    request: web::Json<AdminUpdateUserRequest>,
) -> Result<HttpResponse> {
    let admin_id = match require_admin(&req, &admin_service).await {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match admin_service
        .update_user(admin_id, request.into_inner())
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- 奖励发放 ----

#[utoipa::path(
    get,
    path = "/admin/rewards/pending",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "待发放奖励", body = [PendingRewardResponse])
    )
)]
pub async fn pending_rewards(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match admin_service.pending_rewards().await {
        Ok(rewards) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": rewards
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/rewards/mark-sent",
    tag = "admin",
    request_body = MarkSentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "已标记为发放", body = RewardResponse),
        (status = 404, description = "奖励不存在", body = ApiErrorResponse)
    )
)]
pub async fn mark_reward_sent(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
    request: web::Json<MarkSentRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match admin_service.mark_reward_sent(request.reward_id).await {
        Ok(reward) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": reward
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/test-email",
    tag = "admin",
    request_body = TestEmailRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "测试邮件已发送"),
        (status = 502, description = "邮件服务调用失败", body = ApiErrorResponse)
    )
)]
pub async fn send_test_email(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
    request: web::Json<TestEmailRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match admin_service.send_test_email(request.into_inner().to).await {
        Ok(to) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "to": to }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- 奖池 ----

#[utoipa::path(
    get,
    path = "/admin/rewards-pools",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "奖池列表", body = [RewardPoolResponse])
    )
)]
pub async fn list_pools(
    admin_service: web::Data<AdminService>,
    pool_service: web::Data<RewardPoolService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

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
    path = "/admin/rewards-pools",
    tag = "admin",
    request_body = CreatePoolRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "奖池已创建", body = RewardPoolResponse),
        (status = 400, description = "参数错误", body = ApiErrorResponse)
    )
)]
pub async fn create_pool(
    admin_service: web::Data<AdminService>,
    pool_service: web::Data<RewardPoolService>,
    req: HttpRequest,
    request: web::Json<CreatePoolRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match pool_service.create_pool(request.into_inner()).await {
        Ok(pool) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": pool
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/rewards-pools/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "奖池 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "奖池已删除"),
        (status = 404, description = "奖池不存在", body = ApiErrorResponse)
    )
)]
pub async fn delete_pool(
    admin_service: web::Data<AdminService>,
    pool_service: web::Data<RewardPoolService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match pool_service.delete_pool(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 旧接口：奖池 id 放在请求体中
#[utoipa::path(
    post,
    path = "/admin/rewards-pools/delete",
    tag = "admin",
    request_body = PoolIdRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "奖池已删除"),
        (status = 404, description = "奖池不存在", body = ApiErrorResponse)
    )
)]
pub async fn delete_pool_by_body(
    admin_service: web::Data<AdminService>,
    pool_service: web::Data<RewardPoolService>,
    req: HttpRequest,
    request: web::Json<PoolIdRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match pool_service.delete_pool(request.pool_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- 奖品 ----

#[utoipa::path(
    get,
    path = "/admin/prizes",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "全部奖品及中奖人", body = [AdminPrizeResponse])
    )
)]
pub async fn list_prizes(
    admin_service: web::Data<AdminService>,
    prize_service: web::Data<PrizeService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match prize_service.list_admin().await {
        Ok(prizes) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": prizes
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/prizes",
    tag = "admin",
    request_body = CreatePrizeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "奖品已创建", body = PrizeResponse),
        (status = 400, description = "参数错误", body = ApiErrorResponse)
    )
)]
pub async fn create_prize(
    admin_service: web::Data<AdminService>,
    prize_service: web::Data<PrizeService>,
    req: HttpRequest,
    request: web::Json<CreatePrizeRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match prize_service.create_prize(request.into_inner()).await {
        Ok(prize) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": prize
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/prizes/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "奖品 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "奖品已删除"),
        (status = 404, description = "奖品不存在", body = ApiErrorResponse)
    )
)]
pub async fn delete_prize(
    admin_service: web::Data<AdminService>,
    prize_service: web::Data<PrizeService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match prize_service.delete_prize(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/prizes/{id}/ship",
    tag = "admin",
    params(("id" = Uuid, Path, description = "奖品 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "已标记为寄出", body = PrizeResponse),
        (status = 409, description = "奖品尚未满额", body = ApiErrorResponse)
    )
)]
pub async fn mark_prize_shipped(
    admin_service: web::Data<AdminService>,
    prize_service: web::Data<PrizeService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match prize_service.mark_shipped(path.into_inner()).await {
        Ok(prize) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": prize
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/prizes/{id}/draw",
    tag = "admin",
    params(("id" = Uuid, Path, description = "奖品 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "开奖结果", body = DrawResultResponse),
        (status = 400, description = "票数不足", body = ApiErrorResponse),
        (status = 409, description = "已开过奖", body = ApiErrorResponse)
    )
)]
pub async fn draw_winner(
    admin_service: web::Data<AdminService>,
    draw_service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match draw_service.draw_winner(path.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// pick-winner 旧接口，奖品 id 放在请求体中
#[utoipa::path(
    post,
    path = "/admin/pick-winner",
    tag = "admin",
    request_body = PrizeIdRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "开奖结果", body = DrawResultResponse)
    )
)]
pub async fn pick_winner(
    admin_service: web::Data<AdminService>,
    draw_service: web::Data<DrawService>,
    req: HttpRequest,
    request: web::Json<PrizeIdRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match draw_service.draw_winner(request.prize_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- 统计 ----

#[utoipa::path(
    get,
    path = "/admin/statistics/tickets",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "票数统计", body = TicketStatistics)
    )
)]
pub async fn ticket_statistics(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match admin_service.ticket_statistics().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/statistics/vip-plus",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "VIP+ 人数", body = VipPlusCountResponse)
    )
)]
pub async fn vip_plus_count(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match admin_service.vip_plus_count().await {
        Ok(count) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": count
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- 设置与赛季 ----

#[utoipa::path(
    get,
    path = "/admin/settings/grades",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "等级设置", body = GradeSettings)
    )
)]
pub async fn get_grades(
    admin_service: web::Data<AdminService>,
    settings_service: web::Data<SettingsService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match settings_service.grades().await {
        Ok(grades) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": grades
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/settings/grades",
    tag = "admin",
    request_body = GradeSettings,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "等级设置已更新", body = GradeSettings),
        (status = 400, description = "阈值必须递增", body = ApiErrorResponse)
    )
)]
pub async fn update_grades(
    admin_service: web::Data<AdminService>,
    settings_service: web::Data<SettingsService>,
    req: HttpRequest,
    request: web::Json<GradeSettings>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match settings_service.update_grades(request.into_inner()).await {
        Ok(grades) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": grades
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/seasons/reset",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "新赛季已开启", body = SeasonResponse)
    )
)]
pub async fn reset_season(
    admin_service: web::Data<AdminService>,
    season_service: web::Data<SeasonService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req, &admin_service).await {
        return Ok(e.error_response());
    }

    match season_service.reset_season(Utc::now()).await {
        Ok(season) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": season
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/users", web::get().to(list_users))
            .route("/users/list", web::get().to(list_users))
            .route("/users/update", web::post().to(update_user))
            .route("/rewards/pending", web::get().to(pending_rewards))
            .route("/rewards/list", web::get().to(pending_rewards))
            .route("/rewards/mark-sent", web::post().to(mark_reward_sent))
            .route("/test-email", web::post().to(send_test_email))
            .route("/rewards/test-email", web::post().to(send_test_email))
            .route("/rewards-pools", web::get().to(list_pools))
            .route("/rewards-pools/list", web::get().to(list_pools))
            .route("/rewards-pools", web::post().to(create_pool))
            .route("/rewards-pools/create", web::post().to(create_pool))
            .route("/rewards-pools/delete", web::post().to(delete_pool_by_body))
            .route("/rewards-pools/{id}", web::delete().to(delete_pool))
            .route("/prizes", web::get().to(list_prizes))
            .route("/prizes", web::post().to(create_prize))
            .route("/prizes/{id}", web::delete().to(delete_prize))
            .route("/prizes/{id}/ship", web::post().to(mark_prize_shipped))
            .route("/prizes/{id}/draw", web::post().to(draw_winner))
            .route("/pick-winner", web::post().to(pick_winner))
            .route("/statistics/tickets", web::get().to(ticket_statistics))
            .route("/statistics/vip-plus", web::get().to(vip_plus_count))
            .route("/settings/grades", web::get().to(get_grades))
            .route("/settings/grades", web::put().to(update_grades))
            .route("/seasons/reset", web::post().to(reset_season)),
    );
}
