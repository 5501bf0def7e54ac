use crate::services::SubscriptionService;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use log::{error, info, warn};
use serde_json::json;
use stripe::Event;

/// Stripe webhook：签名错误返回 400，处理失败返回 500
pub async fn stripe_webhook(
    req: HttpRequest,
    body: web::Bytes,
    subscription_service: web::Data<SubscriptionService>,
) -> Result<HttpResponse> {
    let Some(signature) = req
        .headers()
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    else {
        warn!("Missing Stripe-Signature header");
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Missing Stripe-Signature header"
        })));
    };

    let Ok(payload) = std::str::from_utf8(&body) else {
        error!("Invalid UTF-8 in webhook payload");
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Invalid payload encoding"
        })));
    };

    let event = match subscription_service.verify_event(payload, signature) {
        Ok(event) => event,
        Err(e) => {
            error!("Webhook signature verification failed: {e}");
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Invalid signature"
            })));
        }
    };

    info!("Received Stripe webhook event: {} ({})", event.type_, event.id);
    Ok(process_event(&subscription_service, event).await)
}

/// 已验签事件的处理结果：失败返回 500，事务回滚后 Stripe 会重试
pub async fn process_event(subscription_service: &SubscriptionService, event: Event) -> HttpResponse {
    let event_id = event.id.to_string();
    match subscription_service.handle_event(event).await {
        Ok(processed) => HttpResponse::Ok().json(json!({
            "received": true,
            "duplicate": !processed
        })),
        Err(e) => {
            error!("Failed to process webhook event {event_id}: {e}");
            HttpResponse::InternalServerError().json(json!({
                "received": false,
                "error": "processing_failed"
            }))
        }
    }
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhook/stripe", web::post().to(stripe_webhook));
}
