// Integration tests for subscriptions, seasons and the weekly Tap-Tap settlement.

mod common;

use actix_web::http::StatusCode;
use bkreward_backend::config::StripeConfig;
use bkreward_backend::entities::{
    RewardStatus, profile_entity as profiles, reward_entity as rewards,
    stripe_event_entity as stripe_events, tap_tap_score_entity as scores,
};
use bkreward_backend::external::StripeService;
use bkreward_backend::handlers::webhook::process_event;
use bkreward_backend::models::SubscriptionPlan;
use bkreward_backend::services::subscription_service::record_event;
use bkreward_backend::services::{
    LedgerService, SeasonService, SubscriptionService, TapTapService, VipService, week_start,
};
use chrono::{Duration, Utc};
use common::{ProfileSeed, create_profile, recording_notifier, setup_db};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde_json::json;
use uuid::Uuid;

fn subscription_service(db: &sea_orm::DatabaseConnection) -> SubscriptionService {
    let stripe = StripeService::new(StripeConfig {
        secret_key: "sk_test_local".to_string(),
        webhook_secret: "whsec_local".to_string(),
        ..Default::default()
    });
    SubscriptionService::new(db.clone(), stripe, "http://localhost:3000".to_string())
}

/// checkout.session.completed 事件（已验签后的形态）
fn checkout_completed(event_id: &str, user_id: Uuid) -> stripe::Event {
    serde_json::from_value(json!({
        "id": event_id,
        "object": "event",
        "created": 1_735_689_600,
        "livemode": false,
        "pending_webhooks": 1,
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "object": "checkout.session",
                "id": "cs_test_a1",
                "automatic_tax": { "enabled": false },
                "created": 1_735_689_600,
                "custom_fields": [],
                "custom_text": {},
                "expires_at": 1_735_776_000,
                "livemode": false,
                "mode": "subscription",
                "payment_method_types": ["card"],
                "payment_status": "paid",
                "shipping_options": [],
                "client_reference_id": user_id.to_string(),
                "metadata": { "user_id": user_id.to_string(), "plan": "hebdo" }
            }
        }
    }))
    .expect("valid checkout.session.completed event")
}

#[tokio::test]
async fn test_stripe_event_recorded_once() {
    let db = setup_db().await;

    assert!(record_event(&db, "evt_123", "checkout.session.completed").await.unwrap());
    assert!(!record_event(&db, "evt_123", "checkout.session.completed").await.unwrap());
    assert!(record_event(&db, "evt_456", "invoice.payment_succeeded").await.unwrap());
}

#[actix_web::test]
async fn test_failed_webhook_is_retryable() {
    let db = setup_db().await;
    let service = subscription_service(&db);

    // 用户不存在：处理失败，返回 500，事件标记随事务回滚
    let resp = process_event(&service, checkout_completed("evt_fail_1", Uuid::new_v4())).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(stripe_events::Entity::find().count(&db).await.unwrap(), 0);

    let buyer = create_profile(&db, ProfileSeed::default()).await;
    let resp = process_event(&service, checkout_completed("evt_ok_1", buyer.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile = profiles::Entity::find_by_id(buyer.id).one(&db).await.unwrap().unwrap();
    assert!(profile.is_vip);
    assert_eq!(profile.vip_plan.as_deref(), Some("weekly"));

    // 重复投递仍返回 200，不再延长会员
    let until = profile.vip_until;
    let resp = process_event(&service, checkout_completed("evt_ok_1", buyer.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile = profiles::Entity::find_by_id(buyer.id).one(&db).await.unwrap().unwrap();
    assert_eq!(profile.vip_until, until);
    assert_eq!(stripe_events::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_membership_expiry() {
    let db = setup_db().await;
    let expired = create_profile(
        &db,
        ProfileSeed { vip_until: Some(Utc::now() - Duration::hours(1)), vip_plus: true, ..Default::default() },
    )
    .await;
    let active = create_profile(
        &db,
        ProfileSeed { vip_until: Some(Utc::now() + Duration::days(3)), ..Default::default() },
    )
    .await;
    let service = VipService::new(db.clone());

    assert_eq!(service.expire_memberships(Utc::now()).await.unwrap(), 1);
    assert_eq!(service.expire_memberships(Utc::now()).await.unwrap(), 0);

    let expired = profiles::Entity::find_by_id(expired.id).one(&db).await.unwrap().unwrap();
    assert!(!expired.is_vip && !expired.is_vip_plus);
    let active = profiles::Entity::find_by_id(active.id).one(&db).await.unwrap().unwrap();
    assert!(active.is_vip);
}

#[tokio::test]
async fn test_season_rollover() {
    let db = setup_db().await;
    let service = SeasonService::new(db.clone());
    let now = Utc::now();

    let err = service.check_season(now).await.unwrap_err();
    assert_eq!(err.wire_code(), "no_active_season");

    let first = service.reset_season(now).await.unwrap();
    assert_eq!(first.name, "Saison 1");
    assert_eq!(first.end_date - first.start_date, Duration::days(30));

    let check = service.check_season(now + Duration::days(1)).await.unwrap();
    assert!(!check.reset);
    assert_eq!(check.season.id, first.id);

    let later = now + Duration::days(31);
    let check = service.check_season(later).await.unwrap();
    assert!(check.reset);
    assert_eq!(check.season.name, "Saison 2");
}

#[tokio::test]
async fn test_weekly_tap_tap_settlement_is_idempotent() {
    let db = setup_db().await;
    let (sink, notifier) = recording_notifier();
    let champion = create_profile(&db, ProfileSeed { vip_plus: true, ..Default::default() }).await;
    let runner_up = create_profile(&db, ProfileSeed { vip_plus: true, ..Default::default() }).await;
    let service = TapTapService::new(db.clone(), notifier);

    let now = Utc::now();
    let last_week = week_start(now) - Duration::days(3);
    for (user_id, score) in [(champion.id, 870), (runner_up.id, 640), (champion.id, 120)] {
        scores::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            score: Set(score),
            created_at: Set(last_week),
        }
        .insert(&db)
        .await
        .unwrap();
    }

    let winner = service
        .settle_previous_week(now)
        .await
        .unwrap()
        .expect("previous week has scores");
    assert_eq!(winner.user_id, champion.id);
    assert_eq!(winner.score, 870);
    // VIP+ 人数不足时奖励积分
    assert_eq!(winner.prize_type, "points");
    assert_eq!(LedgerService::new(db.clone()).balance(champion.id).await.unwrap(), 500);

    assert!(service.settle_previous_week(now).await.unwrap().is_none());
    assert_eq!(LedgerService::new(db.clone()).balance(champion.id).await.unwrap(), 500);

    let previous = service.previous_week_winner(now).await.unwrap().unwrap();
    assert_eq!(previous.user_id, champion.id);

    let sent = rewards::Entity::find()
        .filter(rewards::Column::UserId.eq(champion.id))
        .filter(rewards::Column::Status.eq(RewardStatus::Sent))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sink.sent.lock().unwrap().len(), 1);

    // 本周排行不包含上周成绩
    assert!(service.leaderboard(now).await.unwrap().is_empty());
}

#[test]
fn test_plan_aliases() {
    assert_eq!(SubscriptionPlan::parse("hebdo"), Some(SubscriptionPlan::Weekly));
    assert_eq!(SubscriptionPlan::parse("mensuel"), Some(SubscriptionPlan::Monthly));
    assert!(SubscriptionPlan::parse("yearly").is_none());
}
