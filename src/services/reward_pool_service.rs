use crate::entities::{
    LedgerEntryKind, RewardStatus, contribution_entity as contributions, reward_entity as rewards,
    reward_pool_entity as pools, reward_pool_view_entity as pool_views,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::LedgerService;
use crate::services::ledger_service::lock_profile;
use crate::utils::cooldown::{POOL_CONTRIBUTION_SPACING, POOL_WATCH_LIMIT};
use crate::utils::{require_text, reward_type_for};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

/// 每 10 次观看折算一张奖池票
const VIEWS_PER_TICKET: u64 = 10;
const DEFAULT_TICKET_COST: i64 = 10;

#[derive(Clone)]
pub struct RewardPoolService {
    pool: DatabaseConnection,
}

impl RewardPoolService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_pools(&self) -> AppResult<Vec<RewardPoolResponse>> {
        Ok(pools::Entity::find()
            .order_by_asc(pools::Column::CreatedAt)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// 为奖池观看一次广告
    pub async fn watch(&self, user_id: Uuid, pool_id: Uuid) -> AppResult<PoolWatchResponse> {
        let txn = self.pool.begin().await?;
        lock_profile(&txn, user_id).await?;
        find_pool(&txn, pool_id).await?;

        let now = Utc::now();
        let today = pool_views::Entity::find()
            .filter(pool_views::Column::UserId.eq(user_id))
            .filter(pool_views::Column::CreatedAt.gte(POOL_WATCH_LIMIT.window.start(now)))
            .count(&txn)
            .await?;
        POOL_WATCH_LIMIT.check(today)?;

        pool_views::ActiveModel {
            id: Set(Uuid::new_v4()),
            pool_id: Set(pool_id),
            user_id: Set(user_id),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        pools::Entity::update_many()
            .col_expr(
                pools::Column::CurrentVideos,
                Expr::col(pools::Column::CurrentVideos).add(1),
            )
            .filter(pools::Column::Id.eq(pool_id))
            .exec(&txn)
            .await?;

        let pool = find_pool(&txn, pool_id).await?;
        let user_views = pool_views::Entity::find()
            .filter(pool_views::Column::UserId.eq(user_id))
            .filter(pool_views::Column::PoolId.eq(pool_id))
            .count(&txn)
            .await?;
        txn.commit().await?;

        Ok(PoolWatchResponse {
            current_videos: pool.current_videos,
            target_videos: pool.target_videos,
            user_views,
            user_tickets: user_views / VIEWS_PER_TICKET,
        })
    }

    /// 用积分换奖池票
    pub async fn participate(
        &self,
        user_id: Uuid,
        pool_id: Uuid,
        tickets: i64,
    ) -> AppResult<PoolParticipateResponse> {
        if tickets < 1 {
            return Err(AppError::ValidationError(
                "tickets must be at least 1".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        lock_profile(&txn, user_id).await?;
        let pool = find_pool(&txn, pool_id).await?;

        let now = Utc::now();
        let recent = contributions::Entity::find()
            .filter(contributions::Column::UserId.eq(user_id))
            .filter(
                contributions::Column::CreatedAt.gte(POOL_CONTRIBUTION_SPACING.window.start(now)),
            )
            .count(&txn)
            .await?;
        POOL_CONTRIBUTION_SPACING.check(recent)?;

        let cost = tickets
            .checked_mul(pool.ticket_cost)
            .ok_or_else(|| AppError::ValidationError("tickets is too large".to_string()))?;
        let new_points = LedgerService::debit(
            &txn,
            user_id,
            cost,
            LedgerEntryKind::PoolContribution,
            Some(format!("{tickets} ticket(s) {}", pool.name)),
        )
        .await?;

        contributions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            pool_id: Set(pool_id),
            tickets_earned: Set(tickets),
            points_spent: Set(cost),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        pools::Entity::update_many()
            .col_expr(
                pools::Column::CurrentVideos,
                Expr::col(pools::Column::CurrentVideos).add(tickets),
            )
            .filter(pools::Column::Id.eq(pool_id))
            .exec(&txn)
            .await?;

        let pool = find_pool(&txn, pool_id).await?;
        txn.commit().await?;

        Ok(PoolParticipateResponse {
            new_points,
            current_videos: pool.current_videos,
            tickets,
        })
    }

    /// 直接兑换奖池奖励，生成待发放记录
    pub async fn purchase(&self, user_id: Uuid, pool_id: Uuid) -> AppResult<PoolPurchaseResponse> {
        let txn = self.pool.begin().await?;
        let pool = find_pool(&txn, pool_id).await?;

        let new_points = LedgerService::debit(
            &txn,
            user_id,
            pool.ticket_cost,
            LedgerEntryKind::PoolPurchase,
            Some(format!("Achat {}", pool.name)),
        )
        .await?;

        let reward_type = reward_type_for(&pool.name);
        rewards::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            reward_type: Set(reward_type.clone()),
            label: Set(Some(pool.name.clone())),
            status: Set(RewardStatus::Pending),
            created_at: Set(Utc::now()),
            sent_at: Set(None),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("Pool reward purchased: user={user_id} pool={pool_id} type={reward_type}");
        Ok(PoolPurchaseResponse {
            new_points,
            reward_type,
        })
    }

    // ---- 后台 ----

    pub async fn create_pool(&self, request: CreatePoolRequest) -> AppResult<RewardPoolResponse> {
        let name = require_text("name", &request.name)?;
        if request.target_videos <= 0 {
            return Err(AppError::ValidationError(
                "target_videos must be positive".to_string(),
            ));
        }
        let ticket_cost = request.ticket_cost.unwrap_or(DEFAULT_TICKET_COST);
        if ticket_cost <= 0 {
            return Err(AppError::ValidationError(
                "ticket_cost must be positive".to_string(),
            ));
        }

        let pool = pools::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            image_url: Set(request.image_url.filter(|u| !u.trim().is_empty())),
            target_videos: Set(request.target_videos),
            current_videos: Set(0),
            ticket_cost: Set(ticket_cost),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Rewards pool created: {} ({})", pool.name, pool.id);
        Ok(pool.into())
    }

    pub async fn delete_pool(&self, pool_id: Uuid) -> AppResult<()> {
        let txn = self.pool.begin().await?;
        pool_views::Entity::delete_many()
            .filter(pool_views::Column::PoolId.eq(pool_id))
            .exec(&txn)
            .await?;
        contributions::Entity::delete_many()
            .filter(contributions::Column::PoolId.eq(pool_id))
            .exec(&txn)
            .await?;
        let res = pools::Entity::delete_by_id(pool_id).exec(&txn).await?;
        if res.rows_affected == 0 {
            return Err(AppError::PoolNotFound);
        }
        txn.commit().await?;

        log::info!("Rewards pool deleted: {pool_id}");
        Ok(())
    }
}

async fn find_pool<C: ConnectionTrait>(db: &C, pool_id: Uuid) -> AppResult<pools::Model> {
    pools::Entity::find_by_id(pool_id)
        .one(db)
        .await?
        .ok_or(AppError::PoolNotFound)
}
