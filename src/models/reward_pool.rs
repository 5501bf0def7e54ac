use crate::entities::reward_pool_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct RewardPoolResponse {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub target_videos: i64,
    pub current_videos: i64,
    pub ticket_cost: i64,
    pub created_at: DateTime<Utc>,
}

impl From<reward_pool_entity::Model> for RewardPoolResponse {
    fn from(m: reward_pool_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            image_url: m.image_url,
            target_videos: m.target_videos,
            current_videos: m.current_videos,
            ticket_cost: m.ticket_cost,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PoolIdRequest {
    pub pool_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PoolParticipateRequest {
    pub pool_id: Uuid,
    /// 小于 1 时按 1 处理
    pub tickets: Option<f64>,
}

impl PoolParticipateRequest {
    pub fn ticket_count(&self) -> i64 {
        self.tickets
            .filter(|t| t.is_finite())
            .map(|t| t.floor() as i64)
            .unwrap_or(1)
            .max(1)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PoolWatchResponse {
    pub current_videos: i64,
    pub target_videos: i64,
    pub user_views: u64,
    pub user_tickets: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PoolParticipateResponse {
    pub new_points: i64,
    pub current_videos: i64,
    pub tickets: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PoolPurchaseResponse {
    pub new_points: i64,
    pub reward_type: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePoolRequest {
    pub name: String,
    pub target_videos: i64,
    pub ticket_cost: Option<i64>,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_count_is_at_least_one() {
        let req = |t: Option<f64>| PoolParticipateRequest {
            pool_id: Uuid::nil(),
            tickets: t,
        };
        assert_eq!(req(None).ticket_count(), 1);
        assert_eq!(req(Some(0.0)).ticket_count(), 1);
        assert_eq!(req(Some(-3.0)).ticket_count(), 1);
        assert_eq!(req(Some(3.9)).ticket_count(), 3);
        assert_eq!(req(Some(f64::NAN)).ticket_count(), 1);
    }
}
