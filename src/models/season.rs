use crate::entities::season_entity;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct SeasonResponse {
    pub id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
}

impl From<season_entity::Model> for SeasonResponse {
    fn from(m: season_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            start_date: m.start_date,
            end_date: m.end_date,
            is_active: m.is_active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeasonCheckResponse {
    /// 本次检查是否触发了赛季重置
    pub reset: bool,
    pub season: SeasonResponse,
    pub remaining_seconds: i64,
}
