use crate::entities::{LedgerEntryKind, point_transaction_entity as journal, profile_entity as profiles};
use crate::error::{AppError, AppResult};
use crate::models::{LedgerEntryResponse, PaginatedResponse, PaginationParams};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

/// 积分账本：余额只通过单条条件 UPDATE 修改，并写入流水
///
/// `credit` / `debit` 接受任意连接（通常是调用方的事务），
/// 这样扣分与后续写入可以在同一事务里一起提交或回滚。
#[derive(Clone)]
pub struct LedgerService {
    pool: DatabaseConnection,
}

impl LedgerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn balance(&self, user_id: Uuid) -> AppResult<i64> {
        current_balance(&self.pool, user_id).await
    }

    /// 加分
    pub async fn credit<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        amount: i64,
        kind: LedgerEntryKind,
        description: Option<String>,
    ) -> AppResult<i64> {
        if amount <= 0 {
            return Err(AppError::ValidationError(
                "Credit amount must be positive".to_string(),
            ));
        }

        let res = profiles::Entity::update_many()
            .col_expr(
                profiles::Column::Points,
                Expr::col(profiles::Column::Points).add(amount),
            )
            .col_expr(profiles::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(profiles::Column::Id.eq(user_id))
            .exec(db)
            .await?;

        if res.rows_affected == 0 {
            return Err(AppError::ProfileNotFound);
        }

        let balance = current_balance(db, user_id).await?;
        record(db, user_id, kind, amount, balance, description).await?;
        Ok(balance)
    }

    /// 扣分：`points >= amount` 作为 UPDATE 条件，余额永不为负
    pub async fn debit<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        amount: i64,
        kind: LedgerEntryKind,
        description: Option<String>,
    ) -> AppResult<i64> {
        if amount <= 0 {
            return Err(AppError::ValidationError(
                "Debit amount must be positive".to_string(),
            ));
        }

        let res = profiles::Entity::update_many()
            .col_expr(
                profiles::Column::Points,
                Expr::col(profiles::Column::Points).sub(amount),
            )
            .col_expr(profiles::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(profiles::Column::Id.eq(user_id))
            .filter(profiles::Column::Points.gte(amount))
            .exec(db)
            .await?;

        if res.rows_affected == 0 {
            // 区分用户不存在与余额不足
            let available = current_balance(db, user_id).await?;
            return Err(AppError::InsufficientBalance {
                required: amount,
                available,
            });
        }

        let balance = current_balance(db, user_id).await?;
        record(db, user_id, kind, -amount, balance, description).await?;
        Ok(balance)
    }

    /// 管理员直接设定余额，流水记录差额
    pub async fn set_balance<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        value: i64,
        description: Option<String>,
    ) -> AppResult<i64> {
        if value < 0 {
            return Err(AppError::ValidationError(
                "Points cannot be negative".to_string(),
            ));
        }

        let before = current_balance(db, user_id).await?;
        profiles::Entity::update_many()
            .col_expr(profiles::Column::Points, Expr::value(value))
            .col_expr(profiles::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(profiles::Column::Id.eq(user_id))
            .exec(db)
            .await?;

        if value != before {
            record(
                db,
                user_id,
                LedgerEntryKind::AdminAdjustment,
                value - before,
                value,
                description,
            )
            .await?;
        }
        Ok(value)
    }

    /// 独立事务扣分
    pub async fn spend(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: LedgerEntryKind,
        description: Option<String>,
    ) -> AppResult<i64> {
        let txn = self.pool.begin().await?;
        let balance = Self::debit(&txn, user_id, amount, kind, description).await?;
        txn.commit().await?;
        Ok(balance)
    }

    /// 独立事务加分
    pub async fn grant(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: LedgerEntryKind,
        description: Option<String>,
    ) -> AppResult<i64> {
        let txn = self.pool.begin().await?;
        let balance = Self::credit(&txn, user_id, amount, kind, description).await?;
        txn.commit().await?;
        Ok(balance)
    }

    /// 积分流水（倒序分页）
    pub async fn history(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<LedgerEntryResponse>> {
        let paginator = journal::Entity::find()
            .filter(journal::Column::UserId.eq(user_id))
            .order_by_desc(journal::Column::CreatedAt)
            .paginate(&self.pool, params.page_size());

        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(PaginatedResponse::new(items, params, total))
    }
}

/// 锁定用户行，串行化同一用户的限频与冷却检查
pub(crate) async fn lock_profile<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> AppResult<profiles::Model> {
    profiles::Entity::find_by_id(user_id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or(AppError::ProfileNotFound)
}

pub(crate) async fn current_balance<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<i64> {
    profiles::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .map(|p| p.points)
        .ok_or(AppError::ProfileNotFound)
}

async fn record<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    kind: LedgerEntryKind,
    amount: i64,
    balance_after: i64,
    description: Option<String>,
) -> AppResult<()> {
    journal::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        kind: Set(kind),
        amount: Set(amount),
        balance_after: Set(balance_after),
        description: Set(description),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;
    Ok(())
}
