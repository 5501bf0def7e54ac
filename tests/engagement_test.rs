// Integration tests for ad rewards, VIP daily claims, referrals, draws and
// reward fulfilment.

mod common;

use bkreward_backend::entities::{
    LedgerEntryKind, RewardStatus, ad_view_entity as ad_views,
    contribution_entity as contributions, point_transaction_entity as journal,
    profile_entity as profiles, reward_entity as rewards,
};
use bkreward_backend::external::{AdminNotifier, LogNotifier};
use bkreward_backend::models::{CreatePoolRequest, UpdatePointsRequest};
use bkreward_backend::services::{
    AdminService, DrawService, EarningService, LedgerService, PrizeService, ReferralService,
    RewardPoolService, RoleAuthorizer, VipService,
};
use chrono::{DateTime, Duration, Utc};
use common::{ProfileSeed, create_prize, create_profile, recording_notifier, setup_db};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use std::collections::HashMap;
use std::sync::Arc;

#[tokio::test]
async fn test_ad_view_hourly_limit() {
    let db = setup_db().await;
    let user = create_profile(&db, ProfileSeed::default()).await;
    let service = EarningService::new(db.clone());

    let first = service.reward_ad_view(user.id).await.unwrap();
    assert!(first.bonus_applied);
    assert_eq!(first.points_awarded, 2);
    for _ in 0..4 {
        let resp = service.reward_ad_view(user.id).await.unwrap();
        assert!(!resp.bonus_applied);
        assert_eq!(resp.points_awarded, 1);
    }
    assert_eq!(LedgerService::new(db.clone()).balance(user.id).await.unwrap(), 6);

    let err = service.reward_ad_view(user.id).await.unwrap_err();
    assert_eq!(err.wire_code(), "hour_limit");

    // 将已有记录移出滚动窗口
    ad_views::Entity::update_many()
        .col_expr(
            ad_views::Column::CreatedAt,
            Expr::value(Utc::now() - Duration::minutes(61)),
        )
        .filter(ad_views::Column::UserId.eq(user.id))
        .exec(&db)
        .await
        .unwrap();

    assert!(service.reward_ad_view(user.id).await.is_ok());
}

#[tokio::test]
async fn test_vip_daily_claim_once_per_day() {
    let db = setup_db().await;
    let vip = create_profile(
        &db,
        ProfileSeed { vip_until: Some(Utc::now() + Duration::days(5)), ..Default::default() },
    )
    .await;
    let free = create_profile(&db, ProfileSeed::default()).await;
    let service = VipService::new(db.clone());

    let resp = service.claim_daily(vip.id).await.unwrap();
    assert_eq!(resp.new_points, 10);

    let err = service.claim_daily(vip.id).await.unwrap_err();
    assert_eq!(err.wire_code(), "already_claimed_today");
    assert_eq!(service.claim_daily(free.id).await.unwrap_err().wire_code(), "not_vip");
    assert_eq!(LedgerService::new(db).balance(vip.id).await.unwrap(), 10);
}

#[tokio::test]
async fn test_referral_applies_once() {
    let db = setup_db().await;
    let referrer = create_profile(&db, ProfileSeed::default()).await;
    let other = create_profile(&db, ProfileSeed::default()).await;
    let user = create_profile(&db, ProfileSeed::default()).await;
    let service = ReferralService::new(db.clone());
    let ledger = LedgerService::new(db.clone());

    let code = referrer.referral_code.to_lowercase();
    let resp = service.apply(user.id, &format!("  {code} ")).await.unwrap();
    assert_eq!(resp.new_points, 5);
    assert_eq!(ledger.balance(referrer.id).await.unwrap(), 10);

    let err = service.apply(user.id, &other.referral_code).await.unwrap_err();
    assert_eq!(err.wire_code(), "already_referred");
    assert_eq!(ledger.balance(user.id).await.unwrap(), 5);
    assert_eq!(ledger.balance(other.id).await.unwrap(), 0);

    let err = service.apply(other.id, &other.referral_code).await.unwrap_err();
    assert_eq!(err.wire_code(), "self_referral");
    let err = service.apply(other.id, "NOPE1234").await.unwrap_err();
    assert_eq!(err.wire_code(), "invalid_code");
}

#[tokio::test]
async fn test_draw_happens_once() {
    let db = setup_db().await;
    let (sink, notifier) = recording_notifier();
    let alice = create_profile(&db, ProfileSeed { points: 100, ..Default::default() }).await;
    let bob = create_profile(&db, ProfileSeed { points: 100, ..Default::default() }).await;
    let prize = create_prize(&db, 10, 3, 0).await;
    let prizes = PrizeService::new(db.clone());
    let draws = DrawService::new(db.clone(), notifier);

    prizes.participate(alice.id, prize.id).await.unwrap();
    let err = draws.draw_winner(prize.id).await.unwrap_err();
    assert_eq!(err.wire_code(), "not_enough_tickets");

    prizes.participate(bob.id, prize.id).await.unwrap();
    prizes.participate(alice.id, prize.id).await.unwrap();

    let result = draws.draw_winner(prize.id).await.unwrap();
    assert!(result.success);
    assert!((1..=3).contains(&result.ticket_number));
    assert_eq!(result.tickets_count, 3);

    let err = draws.draw_winner(prize.id).await.unwrap_err();
    assert_eq!(err.wire_code(), "gagnant_already_exists");

    let pending = rewards::Entity::find()
        .filter(rewards::Column::Status.eq(RewardStatus::Pending))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(pending, 1);
    assert_eq!(sink.sent.lock().unwrap().len(), 1);

    let winners = prizes.list_winners().await.unwrap();
    assert_eq!(winners.len(), 1);
}

#[tokio::test]
async fn test_mark_reward_sent_is_idempotent() {
    let db = setup_db().await;
    let user = create_profile(&db, ProfileSeed { points: 100, ..Default::default() }).await;
    let prize = create_prize(&db, 10, 1, 0).await;
    PrizeService::new(db.clone())
        .participate(user.id, prize.id)
        .await
        .unwrap();
    let notifier = AdminNotifier::new(Arc::new(LogNotifier), None);
    DrawService::new(db.clone(), notifier.clone())
        .draw_winner(prize.id)
        .await
        .unwrap();

    let admin = AdminService::new(db.clone(), Arc::new(RoleAuthorizer), notifier);
    let pending = admin.pending_rewards().await.unwrap();
    assert_eq!(pending.len(), 1);
    let reward_id = pending[0].reward.id;

    let first = admin.mark_reward_sent(reward_id).await.unwrap();
    assert_eq!(first.status, RewardStatus::Sent);
    let sent_at = first.sent_at.expect("sent_at set");

    let second = admin.mark_reward_sent(reward_id).await.unwrap();
    assert_eq!(second.status, RewardStatus::Sent);
    assert_eq!(second.sent_at, Some(sent_at));
    assert!(admin.pending_rewards().await.unwrap().is_empty());

    let err = admin
        .mark_reward_sent(uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.wire_code(), "reward_not_found");
}

#[tokio::test]
async fn test_require_admin() {
    let db = setup_db().await;
    let user = create_profile(&db, ProfileSeed::default()).await;
    let notifier = AdminNotifier::new(Arc::new(LogNotifier), None);
    let admin = AdminService::new(db.clone(), Arc::new(RoleAuthorizer), notifier);

    assert_eq!(admin.require_admin(user.id).await.unwrap_err().wire_code(), "forbidden");

    let promoted = admin.bootstrap_admins(&[user.email.clone()]).await.unwrap();
    assert_eq!(promoted, 1);
    assert!(admin.require_admin(user.id).await.is_ok());
}

async fn create_pool(service: &RewardPoolService, name: &str) -> uuid::Uuid {
    service
        .create_pool(CreatePoolRequest {
            name: name.to_string(),
            target_videos: 1000,
            ticket_cost: None,
            image_url: None,
        })
        .await
        .unwrap()
        .id
}

async fn reload(db: &DatabaseConnection, id: uuid::Uuid) -> profiles::Model {
    profiles::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
}

/// 把冷却时间戳改到过去
async fn backdate(db: &DatabaseConnection, id: uuid::Uuid, column: profiles::Column, ago: Duration) {
    profiles::Entity::update_many()
        .col_expr(column, Expr::value(Utc::now() - ago))
        .filter(profiles::Column::Id.eq(id))
        .exec(db)
        .await
        .unwrap();
}

fn assert_cooldown(next: DateTime<Utc>, before: DateTime<Utc>, expected: Duration) {
    let delta = next - before;
    assert!(delta >= expected && delta < expected + Duration::minutes(1), "{delta}");
}

#[tokio::test]
async fn test_pool_watch_daily_limit() {
    let db = setup_db().await;
    let user = create_profile(&db, ProfileSeed::default()).await;
    let service = RewardPoolService::new(db.clone());
    let pool_id = create_pool(&service, "Carte Amazon").await;

    for _ in 0..25 {
        service.watch(user.id, pool_id).await.unwrap();
    }
    let err = service.watch(user.id, pool_id).await.unwrap_err();
    assert_eq!(err.wire_code(), "day_limit");

    let pool = &service.list_pools().await.unwrap()[0];
    assert_eq!(pool.current_videos, 25);

    // 其他用户不受影响，每 10 次观看折算一张票
    let other = create_profile(&db, ProfileSeed::default()).await;
    let mut last = None;
    for _ in 0..10 {
        last = Some(service.watch(other.id, pool_id).await.unwrap());
    }
    let last = last.unwrap();
    assert_eq!(last.user_views, 10);
    assert_eq!(last.user_tickets, 1);
    assert_eq!(last.current_videos, 35);
}

#[tokio::test]
async fn test_pool_participation_spacing_and_balance() {
    let db = setup_db().await;
    let user = create_profile(&db, ProfileSeed { points: 25, ..Default::default() }).await;
    let service = RewardPoolService::new(db.clone());
    let pool_id = create_pool(&service, "Carte Amazon").await;

    let resp = service.participate(user.id, pool_id, 1).await.unwrap();
    assert_eq!(resp.new_points, 15);
    assert_eq!(resp.current_videos, 1);

    let err = service.participate(user.id, pool_id, 1).await.unwrap_err();
    assert_eq!(err.wire_code(), "rate_limited");

    contributions::Entity::update_many()
        .col_expr(
            contributions::Column::CreatedAt,
            Expr::value(Utc::now() - Duration::seconds(2)),
        )
        .filter(contributions::Column::UserId.eq(user.id))
        .exec(&db)
        .await
        .unwrap();

    // 2 张票需要 20 分，只剩 15 分
    let err = service.participate(user.id, pool_id, 2).await.unwrap_err();
    assert_eq!(err.wire_code(), "insufficient_points");
    assert_eq!(LedgerService::new(db.clone()).balance(user.id).await.unwrap(), 15);
    let count = contributions::Entity::find()
        .filter(contributions::Column::UserId.eq(user.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_pool_purchase_creates_pending_reward() {
    let db = setup_db().await;
    let buyer = create_profile(&db, ProfileSeed { points: 30, ..Default::default() }).await;
    let poor = create_profile(&db, ProfileSeed { points: 5, ..Default::default() }).await;
    let service = RewardPoolService::new(db.clone());
    let pool_id = create_pool(&service, "iPhone 15").await;

    let resp = service.purchase(buyer.id, pool_id).await.unwrap();
    assert_eq!(resp.reward_type, "iphone");
    assert_eq!(resp.new_points, 20);

    let pending = rewards::Entity::find()
        .filter(rewards::Column::UserId.eq(buyer.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, RewardStatus::Pending);
    assert_eq!(pending[0].reward_type, "iphone");
    assert_eq!(pending[0].label.as_deref(), Some("iPhone 15"));

    let err = service.purchase(poor.id, pool_id).await.unwrap_err();
    assert_eq!(err.wire_code(), "insufficient_points");
    let none = rewards::Entity::find()
        .filter(rewards::Column::UserId.eq(poor.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(none, 0);

    let err = service.purchase(buyer.id, uuid::Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.wire_code(), "pool_not_found");
}

#[tokio::test]
async fn test_scratch_cooldown_and_vip_plus_halving() {
    let db = setup_db().await;
    let free = create_profile(&db, ProfileSeed::default()).await;
    let vip_plus = create_profile(
        &db,
        ProfileSeed { vip_until: Some(Utc::now() + Duration::days(10)), vip_plus: true, ..Default::default() },
    )
    .await;
    let service = EarningService::new(db.clone());

    let before = Utc::now();
    let resp = service.scratch(free.id).await.unwrap();
    assert!([0, 1, 2].contains(&resp.points_won));
    assert_eq!(resp.new_points, resp.points_won);
    assert_cooldown(resp.next_available_at, before, Duration::days(3));
    let err = service.scratch(free.id).await.unwrap_err();
    assert_eq!(err.wire_code(), "cooldown");

    let before = Utc::now();
    let resp = service.scratch(vip_plus.id).await.unwrap();
    assert_cooldown(resp.next_available_at, before, Duration::hours(36));

    // 37 小时后：VIP+ 已冷却完毕，普通用户仍在冷却
    backdate(&db, free.id, profiles::Column::LastScratchAt, Duration::hours(37)).await;
    backdate(&db, vip_plus.id, profiles::Column::LastScratchAt, Duration::hours(37)).await;
    assert_eq!(service.scratch(free.id).await.unwrap_err().wire_code(), "cooldown");
    assert!(service.scratch(vip_plus.id).await.is_ok());
}

#[tokio::test]
async fn test_wheel_debits_bet_and_tracks_rescue() {
    let db = setup_db().await;
    let player = create_profile(&db, ProfileSeed { points: 50, ..Default::default() }).await;
    let poor = create_profile(&db, ProfileSeed { points: 5, ..Default::default() }).await;
    let service = EarningService::new(db.clone());

    for bet in [0, 101] {
        let err = service.wheel(player.id, bet).await.unwrap_err();
        assert_eq!(err.wire_code(), "invalid_payload");
    }

    let before = Utc::now();
    let resp = service.wheel(player.id, 10).await.unwrap();
    assert_eq!(resp.payout, 10 * resp.multiplier);
    assert_eq!(resp.new_points, 50 - 10 + resp.payout);
    assert_cooldown(resp.next_available_at, before, Duration::days(7));
    assert_eq!(resp.rescue_available, resp.multiplier == 0);
    let expected_rescue = (resp.multiplier == 0).then_some(10);
    assert_eq!(reload(&db, player.id).await.pending_rescue_bet, expected_rescue);

    assert_eq!(service.wheel(player.id, 10).await.unwrap_err().wire_code(), "cooldown");

    // 积分不足：整笔回滚，冷却未开始
    let err = service.wheel(poor.id, 10).await.unwrap_err();
    assert_eq!(err.wire_code(), "insufficient_points");
    let poor = reload(&db, poor.id).await;
    assert_eq!(poor.points, 5);
    assert!(poor.last_wheel_at.is_none());
}

#[tokio::test]
async fn test_wheel_rescue_credits_once() {
    let db = setup_db().await;
    let player = create_profile(&db, ProfileSeed::default()).await;
    let service = EarningService::new(db.clone());

    let err = service.rescue_wheel(player.id).await.unwrap_err();
    assert_eq!(err.wire_code(), "no_rescue_available");

    // 上一局输掉 40 分
    profiles::Entity::update_many()
        .col_expr(profiles::Column::PendingRescueBet, Expr::value(Some(40i64)))
        .filter(profiles::Column::Id.eq(player.id))
        .exec(&db)
        .await
        .unwrap();

    let resp = service.rescue_wheel(player.id).await.unwrap();
    assert_eq!(resp.points_recovered, 40);
    assert_eq!(resp.new_points, 40);

    let err = service.rescue_wheel(player.id).await.unwrap_err();
    assert_eq!(err.wire_code(), "no_rescue_available");
    assert_eq!(LedgerService::new(db.clone()).balance(player.id).await.unwrap(), 40);
    assert!(reload(&db, player.id).await.pending_rescue_bet.is_none());

    let credits = journal::Entity::find()
        .filter(journal::Column::UserId.eq(player.id))
        .filter(journal::Column::Kind.eq(LedgerEntryKind::MiniGame))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(credits, 1);
}

#[tokio::test]
async fn test_vip_slot_requires_vip() {
    let db = setup_db().await;
    let free = create_profile(&db, ProfileSeed::default()).await;
    let vip = create_profile(
        &db,
        ProfileSeed { vip_until: Some(Utc::now() + Duration::days(5)), ..Default::default() },
    )
    .await;
    let service = EarningService::new(db.clone());

    assert_eq!(service.vip_slot(free.id).await.unwrap_err().wire_code(), "not_vip");

    let before = Utc::now();
    let resp = service.vip_slot(vip.id).await.unwrap();
    assert!([0, 5, 20, 100, 250].contains(&resp.points_won));
    assert_eq!(resp.jackpot, resp.points_won == 250);
    assert_eq!(resp.new_points, resp.points_won);
    assert_cooldown(resp.next_available_at, before, Duration::days(1));
    assert_eq!(service.vip_slot(vip.id).await.unwrap_err().wire_code(), "cooldown");
}

#[tokio::test]
async fn test_update_points_rules() {
    let db = setup_db().await;
    let user = create_profile(&db, ProfileSeed { points: 5, ..Default::default() }).await;
    let service = EarningService::new(db.clone());
    let stamp = |key: &str| Some(HashMap::from([(key.to_string(), Utc::now())]));

    let err = service
        .update_points(user.id, UpdatePointsRequest { points_to_add: None, timestamps: None })
        .await
        .unwrap_err();
    assert_eq!(err.wire_code(), "invalid_payload");

    let err = service
        .update_points(
            user.id,
            UpdatePointsRequest { points_to_add: Some(1), timestamps: stamp("is_admin") },
        )
        .await
        .unwrap_err();
    assert_eq!(err.wire_code(), "invalid_payload");

    // 负数扣分不足时拒绝，时间戳也不写入
    let err = service
        .update_points(
            user.id,
            UpdatePointsRequest { points_to_add: Some(-10), timestamps: stamp("last_scratch_at") },
        )
        .await
        .unwrap_err();
    assert_eq!(err.wire_code(), "insufficient_points");
    let profile = reload(&db, user.id).await;
    assert_eq!(profile.points, 5);
    assert!(profile.last_scratch_at.is_none());

    // 单次最多加 250
    let resp = service
        .update_points(user.id, UpdatePointsRequest { points_to_add: Some(1000), timestamps: None })
        .await
        .unwrap();
    assert_eq!(resp.points, 255);

    let resp = service
        .update_points(
            user.id,
            UpdatePointsRequest { points_to_add: Some(-5), timestamps: stamp("last_scratch_at") },
        )
        .await
        .unwrap();
    assert_eq!(resp.points, 250);
    assert!(reload(&db, user.id).await.last_scratch_at.is_some());

    let err = service
        .update_points(
            user.id,
            UpdatePointsRequest { points_to_add: None, timestamps: stamp("last_scratch_at") },
        )
        .await
        .unwrap_err();
    assert_eq!(err.wire_code(), "cooldown");
}
