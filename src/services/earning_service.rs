//! Server-side earning: rewarded ads, mini-games and the legacy
//! `update-points` endpoint. Every outcome is rolled here, never on the client.

use crate::entities::{LedgerEntryKind, ad_view_entity as ad_views, profile_entity as profiles};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::LedgerService;
use crate::services::ledger_service::lock_profile;
use crate::utils::cooldown::*;
use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

pub const MIN_WHEEL_BET: i64 = 1;
pub const MAX_WHEEL_BET: i64 = 100;
/// update-points 单次最多加分
pub const MAX_CLIENT_CREDIT: i64 = 250;
pub const SLOT_JACKPOT: i64 = 250;

/// 刮刮卡：roll ∈ [0, 100)
pub fn scratch_outcome(roll: u32) -> i64 {
    match roll {
        0..65 => 0,
        65..90 => 1,
        _ => 2,
    }
}

/// 转盘倍数：roll ∈ [0, 100)
pub fn wheel_multiplier(roll: u32) -> i64 {
    match roll {
        0..50 => 0,
        50..80 => 1,
        80..95 => 2,
        _ => 3,
    }
}

/// VIP 老虎机：roll ∈ [0, 100)
pub fn slot_outcome(roll: u32) -> i64 {
    match roll {
        0 => SLOT_JACKPOT,
        1..6 => 100,
        6..21 => 20,
        21..41 => 5,
        _ => 0,
    }
}

fn roll_percent() -> u32 {
    rand::thread_rng().gen_range(0..100)
}

#[derive(Clone)]
pub struct EarningService {
    pool: DatabaseConnection,
}

impl EarningService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 激励广告奖励：每小时 5 次、每天 25 次，当天首次 +2
    pub async fn reward_ad_view(&self, user_id: Uuid) -> AppResult<AdViewResponse> {
        let txn = self.pool.begin().await?;
        lock_profile(&txn, user_id).await?;

        let now = Utc::now();
        for rule in &AD_VIEW_LIMITS {
            let used = ad_views::Entity::find()
                .filter(ad_views::Column::UserId.eq(user_id))
                .filter(ad_views::Column::CreatedAt.gte(rule.window.start(now)))
                .count(&txn)
                .await?;
            rule.check(used)?;
        }

        let views_today = ad_views::Entity::find()
            .filter(ad_views::Column::UserId.eq(user_id))
            .filter(ad_views::Column::CreatedAt.gte(start_of_day(now)))
            .count(&txn)
            .await?;
        let bonus_applied = views_today == 0;
        let (points, kind) = if bonus_applied {
            (AD_VIEW_FIRST_OF_DAY_POINTS, LedgerEntryKind::DailyBonus)
        } else {
            (AD_VIEW_POINTS, LedgerEntryKind::AdView)
        };

        ad_views::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            points_awarded: Set(points),
            bonus_applied: Set(bonus_applied),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let new_points =
            LedgerService::credit(&txn, user_id, points, kind, Some("Rewarded ad".to_string()))
                .await?;
        txn.commit().await?;

        Ok(AdViewResponse {
            new_points,
            bonus_applied,
            points_awarded: points,
        })
    }

    pub async fn scratch(&self, user_id: Uuid) -> AppResult<ScratchResponse> {
        let txn = self.pool.begin().await?;
        let profile = lock_profile(&txn, user_id).await?;
        let now = Utc::now();
        let tier = MembershipTier::of(&profile, now);
        ensure_ready(CooldownAction::Scratch, tier, profile.last_scratch_at, now)?;

        let points_won = scratch_outcome(roll_percent());
        stamp(&txn, user_id, profiles::Column::LastScratchAt, now).await?;
        let new_points = if points_won > 0 {
            LedgerService::credit(
                &txn,
                user_id,
                points_won,
                LedgerEntryKind::MiniGame,
                Some("Scratch".to_string()),
            )
            .await?
        } else {
            profile.points
        };
        txn.commit().await?;

        Ok(ScratchResponse {
            points_won,
            new_points,
            next_available_at: now + cooldown_for(CooldownAction::Scratch, tier),
        })
    }

    pub async fn wheel(&self, user_id: Uuid, bet: i64) -> AppResult<WheelResponse> {
        if !(MIN_WHEEL_BET..=MAX_WHEEL_BET).contains(&bet) {
            return Err(AppError::ValidationError(format!(
                "bet must be between {MIN_WHEEL_BET} and {MAX_WHEEL_BET}"
            )));
        }

        let txn = self.pool.begin().await?;
        let profile = lock_profile(&txn, user_id).await?;
        let now = Utc::now();
        let tier = MembershipTier::of(&profile, now);
        ensure_ready(CooldownAction::Wheel, tier, profile.last_wheel_at, now)?;

        let mut new_points = LedgerService::debit(
            &txn,
            user_id,
            bet,
            LedgerEntryKind::MiniGame,
            Some("Wheel bet".to_string()),
        )
        .await?;

        let multiplier = wheel_multiplier(roll_percent());
        let payout = bet * multiplier;
        if payout > 0 {
            new_points = LedgerService::credit(
                &txn,
                user_id,
                payout,
                LedgerEntryKind::MiniGame,
                Some(format!("Wheel x{multiplier}")),
            )
            .await?;
        }
        stamp(&txn, user_id, profiles::Column::LastWheelAt, now).await?;
        // 只有最近一次输掉的下注可以找回
        let rescue = (multiplier == 0).then_some(bet);
        profiles::Entity::update_many()
            .col_expr(profiles::Column::PendingRescueBet, Expr::value(rescue))
            .filter(profiles::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        Ok(WheelResponse {
            bet,
            multiplier,
            payout,
            new_points,
            rescue_available: rescue.is_some(),
            next_available_at: now + cooldown_for(CooldownAction::Wheel, tier),
        })
    }

    /// 看完激励广告后退还输掉的转盘下注，每次输局只能找回一次
    pub async fn rescue_wheel(&self, user_id: Uuid) -> AppResult<WheelRescueResponse> {
        let txn = self.pool.begin().await?;
        let profile = lock_profile(&txn, user_id).await?;
        let bet = profile
            .pending_rescue_bet
            .filter(|bet| *bet > 0)
            .ok_or(AppError::Rejected("no_rescue_available"))?;

        // 条件清空，并发请求只有一个能拿到
        let res = profiles::Entity::update_many()
            .col_expr(profiles::Column::PendingRescueBet, Expr::value(Option::<i64>::None))
            .col_expr(profiles::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(profiles::Column::Id.eq(user_id))
            .filter(profiles::Column::PendingRescueBet.eq(bet))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::Rejected("no_rescue_available"));
        }

        let new_points = LedgerService::credit(
            &txn,
            user_id,
            bet,
            LedgerEntryKind::MiniGame,
            Some("Wheel rescue".to_string()),
        )
        .await?;
        txn.commit().await?;

        log::info!("Wheel bet of {bet} rescued for user {user_id}");
        Ok(WheelRescueResponse {
            points_recovered: bet,
            new_points,
        })
    }

    pub async fn vip_slot(&self, user_id: Uuid) -> AppResult<SlotResponse> {
        let txn = self.pool.begin().await?;
        let profile = lock_profile(&txn, user_id).await?;
        let now = Utc::now();
        let tier = MembershipTier::of(&profile, now);
        if !tier.is_vip() {
            return Err(AppError::NotVip);
        }
        ensure_ready(CooldownAction::VipSlot, tier, profile.last_vip_slot_at, now)?;

        let points_won = slot_outcome(roll_percent());
        stamp(&txn, user_id, profiles::Column::LastVipSlotAt, now).await?;
        let new_points = if points_won > 0 {
            LedgerService::credit(
                &txn,
                user_id,
                points_won,
                LedgerEntryKind::MiniGame,
                Some("VIP slot".to_string()),
            )
            .await?
        } else {
            profile.points
        };
        txn.commit().await?;

        if points_won == SLOT_JACKPOT {
            log::info!("VIP slot jackpot for user {user_id}");
        }

        Ok(SlotResponse {
            points_won,
            jackpot: points_won == SLOT_JACKPOT,
            new_points,
            next_available_at: now + cooldown_for(CooldownAction::VipSlot, tier),
        })
    }

    /// 旧客户端的积分/冷却更新接口，服务端仍做全部校验
    pub async fn update_points(
        &self,
        user_id: Uuid,
        request: UpdatePointsRequest,
    ) -> AppResult<UpdatePointsResponse> {
        let delta = request.points_to_add.unwrap_or(0);
        let stamps = request.timestamps.unwrap_or_default();
        if delta == 0 && stamps.is_empty() {
            return Err(AppError::ValidationError(
                "pointsToAdd or timestamps is required".to_string(),
            ));
        }

        let mut columns = Vec::with_capacity(stamps.len());
        for key in stamps.keys() {
            let (column, action) = match key.as_str() {
                "last_scratch_at" => (profiles::Column::LastScratchAt, CooldownAction::Scratch),
                "last_wheel_at" => (profiles::Column::LastWheelAt, CooldownAction::Wheel),
                "last_vip_slot_at" => (profiles::Column::LastVipSlotAt, CooldownAction::VipSlot),
                other => {
                    return Err(AppError::ValidationError(format!(
                        "timestamp {other} is not allowed"
                    )));
                }
            };
            columns.push((column, action));
        }

        let txn = self.pool.begin().await?;
        let profile = lock_profile(&txn, user_id).await?;
        let now = Utc::now();
        let tier = MembershipTier::of(&profile, now);

        for (column, action) in &columns {
            let last = match action {
                CooldownAction::Scratch => profile.last_scratch_at,
                CooldownAction::Wheel => profile.last_wheel_at,
                CooldownAction::VipSlot => profile.last_vip_slot_at,
            };
            ensure_ready(*action, tier, last, now)?;
            // 使用服务端时间，客户端时间不可信
            stamp(&txn, user_id, *column, now).await?;
        }

        let points = match delta {
            d if d < 0 => {
                LedgerService::debit(
                    &txn,
                    user_id,
                    -d,
                    LedgerEntryKind::ClientUpdate,
                    Some("Client update".to_string()),
                )
                .await?
            }
            d if d > 0 => {
                LedgerService::credit(
                    &txn,
                    user_id,
                    d.min(MAX_CLIENT_CREDIT),
                    LedgerEntryKind::ClientUpdate,
                    Some("Client update".to_string()),
                )
                .await?
            }
            _ => profile.points,
        };
        txn.commit().await?;

        Ok(UpdatePointsResponse {
            success: true,
            points,
        })
    }
}

async fn stamp<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    column: profiles::Column,
    at: DateTime<Utc>,
) -> AppResult<()> {
    profiles::Entity::update_many()
        .col_expr(column, Expr::value(at))
        .col_expr(profiles::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(profiles::Column::Id.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distribution(f: fn(u32) -> i64) -> std::collections::BTreeMap<i64, u32> {
        let mut out = std::collections::BTreeMap::new();
        for roll in 0..100 {
            *out.entry(f(roll)).or_default() += 1;
        }
        out
    }

    #[test]
    fn test_scratch_odds() {
        let d = distribution(scratch_outcome);
        assert_eq!(d[&0], 65);
        assert_eq!(d[&1], 25);
        assert_eq!(d[&2], 10);
    }

    #[test]
    fn test_wheel_odds() {
        let d = distribution(wheel_multiplier);
        assert_eq!(d[&0], 50);
        assert_eq!(d[&1], 30);
        assert_eq!(d[&2], 15);
        assert_eq!(d[&3], 5);
    }

    #[test]
    fn test_slot_odds() {
        let d = distribution(slot_outcome);
        assert_eq!(d[&SLOT_JACKPOT], 1);
        assert_eq!(d[&100], 5);
        assert_eq!(d[&20], 15);
        assert_eq!(d[&5], 20);
        assert_eq!(d[&0], 59);
    }
}
