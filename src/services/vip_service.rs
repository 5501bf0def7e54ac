use crate::entities::{LedgerEntryKind, profile_entity as profiles};
use crate::error::{AppError, AppResult};
use crate::models::ClaimDailyResponse;
use crate::services::LedgerService;
use crate::services::ledger_service::lock_profile;
use crate::utils::cooldown::{MembershipTier, VIP_DAILY_CLAIM_POINTS, same_utc_day};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use uuid::Uuid;

#[derive(Clone)]
pub struct VipService {
    pool: DatabaseConnection,
}

impl VipService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// VIP 每日领取，UTC 自然日一次
    pub async fn claim_daily(&self, user_id: Uuid) -> AppResult<ClaimDailyResponse> {
        let txn = self.pool.begin().await?;
        let profile = lock_profile(&txn, user_id).await?;
        let now = Utc::now();

        if !MembershipTier::of(&profile, now).is_vip() {
            return Err(AppError::NotVip);
        }
        if let Some(last) = profile.last_claim_date
            && same_utc_day(last, now)
        {
            return Err(AppError::Conflict("already_claimed_today"));
        }

        profiles::Entity::update_many()
            .col_expr(profiles::Column::LastClaimDate, Expr::value(now))
            .filter(profiles::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;
        let new_points = LedgerService::credit(
            &txn,
            user_id,
            VIP_DAILY_CLAIM_POINTS,
            LedgerEntryKind::VipDailyClaim,
            Some("VIP daily bonus".to_string()),
        )
        .await?;
        txn.commit().await?;

        Ok(ClaimDailyResponse {
            success: true,
            tickets_granted: VIP_DAILY_CLAIM_POINTS,
            new_points,
            message: format!("{VIP_DAILY_CLAIM_POINTS} points ajoutés"),
        })
    }

    /// 清理已过期的会员标记，返回处理的用户数
    pub async fn expire_memberships(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let res = profiles::Entity::update_many()
            .col_expr(profiles::Column::IsVip, Expr::value(false))
            .col_expr(profiles::Column::IsVipPlus, Expr::value(false))
            .col_expr(profiles::Column::UpdatedAt, Expr::value(now))
            .filter(profiles::Column::VipUntil.lt(now))
            .filter(
                Condition::any()
                    .add(profiles::Column::IsVip.eq(true))
                    .add(profiles::Column::IsVipPlus.eq(true)),
            )
            .exec(&self.pool)
            .await?;

        if res.rows_affected > 0 {
            log::info!("Expired {} VIP memberships", res.rows_affected);
        }
        Ok(res.rows_affected)
    }
}
