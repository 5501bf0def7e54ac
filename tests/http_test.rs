// HTTP-level tests: routing, the auth middleware and the error envelope.

mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use bkreward_backend::handlers;
use bkreward_backend::middlewares::{AuthMiddleware, SESSION_COOKIE};
use bkreward_backend::services::{AuthService, PrizeService};
use bkreward_backend::utils::JwtService;
use common::{create_prize, recording_notifier, setup_db};
use serde_json::{Value, json};

const SITE_URL: &str = "https://bkreward.test";

/// 邮件正文里的重置令牌
fn reset_token_from(html: &str) -> String {
    let start = html.find("token=").expect("reset link in email") + "token=".len();
    html[start..].split('"').next().unwrap_or_default().to_string()
}

#[actix_web::test]
async fn test_error_envelope_and_auth() {
    let db = setup_db().await;
    let prize = create_prize(&db, 10, 5, 0).await;
    let jwt = JwtService::new("test-secret", 3600, 86400);
    let (_sink, notifier) = recording_notifier();
    let auth = AuthService::new(db.clone(), jwt.clone(), Vec::new(), notifier, SITE_URL.into());
    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(jwt.clone()))
            .app_data(web::Data::new(auth))
            .app_data(web::Data::new(PrizeService::new(db.clone())))
            .configure(handlers::api_config),
    )
    .await;

    // 公开列表无需登录
    let req = test::TestRequest::get().uri("/api/prizes").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["nom"], "Casque audio");

    // 受保护接口未登录
    let uri = format!("/api/prizes/{}/participate", prize.id);
    let req = test::TestRequest::post().uri(&uri).to_request();
    let status = match test::try_call_service(&app, req).await {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": "Camille@Example.fr",
            "password": "cadeau2024"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.response().cookies().any(|c| c.name() == SESSION_COOKIE));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["email"], "camille@example.fr");
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    // 新用户没有收货地址
    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "address_required");
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    // 重复注册
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": "camille@example.fr",
            "password": "cadeau2024"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "email_taken");
}

#[actix_web::test]
async fn test_password_reset_flow() {
    let db = setup_db().await;
    let jwt = JwtService::new("test-secret", 3600, 86400);
    let (sink, notifier) = recording_notifier();
    let auth = AuthService::new(db.clone(), jwt.clone(), Vec::new(), notifier, SITE_URL.into());
    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(jwt))
            .app_data(web::Data::new(auth))
            .configure(handlers::api_config),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": "lea@example.fr", "password": "ancien2024" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // 未注册的邮箱同样返回成功，但不发邮件
    let req = test::TestRequest::post()
        .uri("/api/auth/forgot-password")
        .set_json(json!({ "email": "inconnu@example.fr" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert!(sink.sent.lock().unwrap().is_empty());

    let req = test::TestRequest::post()
        .uri("/api/auth/forgot-password")
        .set_json(json!({ "email": "Lea@Example.fr" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let token = {
        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "lea@example.fr");
        assert!(sent[0].html.contains(&format!("{SITE_URL}/auth/reset-password?token=")));
        reset_token_from(&sent[0].html)
    };

    let reset = |password: &str| {
        test::TestRequest::post()
            .uri("/api/auth/reset-password")
            .set_json(json!({ "token": token, "password": password }))
            .to_request()
    };

    // 密码不符合规则时令牌不被消耗
    let resp = test::call_service(&app, reset("court")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(&app, reset("nouveau2025")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // 同一令牌第二次使用被拒绝
    let resp = test::call_service(&app, reset("encore2026")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "invalid_reset_token");

    let login = |password: &str| {
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "lea@example.fr", "password": password }))
            .to_request()
    };
    let resp = test::call_service(&app, login("ancien2024")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = test::call_service(&app, login("nouveau2025")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
