use crate::middlewares::current_user;
use crate::models::*;
use crate::services::ReferralService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/referral/apply",
    tag = "referral",
    request_body = ApplyReferralRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "推荐码已使用", body = ApplyReferralResponse),
        (status = 400, description = "推荐码无效 / 不能使用自己的推荐码", body = ApiErrorResponse),
        (status = 404, description = "推荐码不存在", body = ApiErrorResponse),
        (status = 409, description = "已使用过推荐码", body = ApiErrorResponse)
    )
)]
pub async fn apply_referral(
    referral_service: web::Data<ReferralService>,
    req: HttpRequest,
    request: web::Json<ApplyReferralRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match referral_service.apply(user.id, &request.code).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn referral_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/referral/apply", web::post().to(apply_referral));
}
