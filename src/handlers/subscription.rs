use crate::middlewares::current_user;
use crate::models::*;
use crate::services::SubscriptionService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/checkout",
    tag = "subscription",
    request_body = CheckoutRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stripe Checkout 地址", body = CheckoutResponse),
        (status = 400, description = "未知方案", body = ApiErrorResponse),
        (status = 502, description = "Stripe 调用失败", body = ApiErrorResponse)
    )
)]
pub async fn create_checkout(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    request: web::Json<CheckoutRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service
        .create_checkout(user.id, &request.plan)
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
    path = "/portal",
    tag = "subscription",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stripe 客户门户地址", body = CheckoutResponse),
        (status = 404, description = "没有 Stripe 客户", body = ApiErrorResponse)
    )
)]
pub async fn create_portal(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.create_portal(user.id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/checkout", web::post().to(create_checkout))
        .route("/stripe/checkout", web::post().to(create_checkout))
        .route("/portal", web::post().to(create_portal))
        .route("/stripe/portal", web::post().to(create_portal));
}
