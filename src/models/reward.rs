use crate::entities::{RewardStatus, reward_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct RewardResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reward_type: String,
    pub label: Option<String>,
    pub status: RewardStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl From<reward_entity::Model> for RewardResponse {
    fn from(m: reward_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            reward_type: m.reward_type,
            label: m.label,
            status: m.status,
            created_at: m.created_at,
            sent_at: m.sent_at,
        }
    }
}

/// 后台待发放列表，附带用户信息
#[derive(Debug, Serialize, ToSchema)]
pub struct PendingRewardResponse {
    #[serde(flatten)]
    pub reward: RewardResponse,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkSentRequest {
    pub reward_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TestEmailRequest {
    /// 缺省发送到管理员通知邮箱
    pub to: Option<String>,
}
