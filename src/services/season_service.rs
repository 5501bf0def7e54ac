use crate::entities::season_entity as seasons;
use crate::error::{AppError, AppResult};
use crate::models::{SeasonCheckResponse, SeasonResponse};
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

const DEFAULT_SEASON_DAYS: i64 = 30;

#[derive(Clone)]
pub struct SeasonService {
    pool: DatabaseConnection,
}

impl SeasonService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn active_season(&self) -> AppResult<Option<seasons::Model>> {
        Ok(seasons::Entity::find()
            .filter(seasons::Column::IsActive.eq(true))
            .order_by_desc(seasons::Column::StartDate)
            .one(&self.pool)
            .await?)
    }

    /// 赛季结束则自动重置，否则返回剩余时间
    pub async fn check_season(&self, now: DateTime<Utc>) -> AppResult<SeasonCheckResponse> {
        let season = self
            .active_season()
            .await?
            .ok_or(AppError::Missing("no_active_season"))?;

        if season.end_date > now {
            return Ok(SeasonCheckResponse {
                reset: false,
                remaining_seconds: (season.end_date - now).num_seconds(),
                season: season.into(),
            });
        }

        let next = self.reset_season(now).await?;
        Ok(SeasonCheckResponse {
            reset: true,
            remaining_seconds: (next.end_date - now).num_seconds(),
            season: next,
        })
    }

    /// 关闭当前赛季并开启下一赛季（时长不变），积分不清零
    pub async fn reset_season(&self, now: DateTime<Utc>) -> AppResult<SeasonResponse> {
        let txn = self.pool.begin().await?;

        let current = seasons::Entity::find()
            .filter(seasons::Column::IsActive.eq(true))
            .order_by_desc(seasons::Column::StartDate)
            .one(&txn)
            .await?;
        let length = current
            .as_ref()
            .map(|s| s.end_date - s.start_date)
            .filter(|d| *d > Duration::zero())
            .unwrap_or_else(|| Duration::days(DEFAULT_SEASON_DAYS));

        seasons::Entity::update_many()
            .col_expr(seasons::Column::IsActive, Expr::value(false))
            .filter(seasons::Column::IsActive.eq(true))
            .exec(&txn)
            .await?;

        let number = seasons::Entity::find().count(&txn).await? + 1;
        let next = seasons::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(format!("Saison {number}")),
            start_date: Set(now),
            end_date: Set(now + length),
            is_active: Set(true),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!(
            "Season reset: {} now active until {}",
            next.name,
            next.end_date
        );
        Ok(next.into())
    }
}
