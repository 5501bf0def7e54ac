use crate::entities::{LedgerEntryKind, profile_entity as profiles};
use crate::error::{AppError, AppResult};
use crate::models::ApplyReferralResponse;
use crate::services::LedgerService;
use crate::utils::normalize_referral_code;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};
use uuid::Uuid;

/// 推荐人奖励
pub const REFERRER_BONUS: i64 = 10;
/// 被推荐人奖励
pub const REFEREE_BONUS: i64 = 5;

#[derive(Clone)]
pub struct ReferralService {
    pool: DatabaseConnection,
}

impl ReferralService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 使用推荐码：双方加分并记录 referred_by，一个事务内完成
    pub async fn apply(&self, user_id: Uuid, raw_code: &str) -> AppResult<ApplyReferralResponse> {
        let txn = self.pool.begin().await?;
        let new_points = Self::apply_in(&txn, user_id, raw_code).await?;
        txn.commit().await?;

        Ok(ApplyReferralResponse {
            success: true,
            new_points,
        })
    }

    /// 在调用方事务中执行（注册时复用）
    pub async fn apply_in<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        raw_code: &str,
    ) -> AppResult<i64> {
        let code = normalize_referral_code(raw_code);
        if code.is_empty() {
            return Err(AppError::Rejected("invalid_code"));
        }

        // 锁定当前用户行，串行化同一用户的并发请求
        let profile = profiles::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(db)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        if profile.referred_by.is_some() {
            return Err(AppError::Conflict("already_referred"));
        }

        let referrer = profiles::Entity::find()
            .filter(profiles::Column::ReferralCode.eq(code.as_str()))
            .one(db)
            .await?
            .ok_or(AppError::Missing("invalid_code"))?;

        if referrer.id == user_id {
            return Err(AppError::Rejected("self_referral"));
        }

        let res = profiles::Entity::update_many()
            .col_expr(profiles::Column::ReferredBy, Expr::value(referrer.id))
            .col_expr(profiles::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(profiles::Column::Id.eq(user_id))
            .filter(profiles::Column::ReferredBy.is_null())
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::Conflict("already_referred"));
        }

        LedgerService::credit(
            db,
            referrer.id,
            REFERRER_BONUS,
            LedgerEntryKind::Referral,
            Some(format!("Referral of {}", profile.email)),
        )
        .await?;
        let new_points = LedgerService::credit(
            db,
            user_id,
            REFEREE_BONUS,
            LedgerEntryKind::Referral,
            Some(format!("Referral code {code}")),
        )
        .await?;

        log::info!("Referral applied: user={user_id} referrer={}", referrer.id);
        Ok(new_points)
    }
}
