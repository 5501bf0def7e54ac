use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// reward_ad_view / add_reward_points 返回
#[derive(Debug, Serialize, ToSchema)]
pub struct AdViewResponse {
    pub new_points: i64,
    pub bonus_applied: bool,
    pub points_awarded: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScratchResponse {
    pub points_won: i64,
    pub new_points: i64,
    pub next_available_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WheelRequest {
    pub bet: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WheelResponse {
    pub bet: i64,
    pub multiplier: i64,
    pub payout: i64,
    pub new_points: i64,
    /// 输掉时可看广告找回下注
    pub rescue_available: bool,
    pub next_available_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WheelRescueResponse {
    pub points_recovered: i64,
    pub new_points: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SlotResponse {
    pub points_won: i64,
    pub jackpot: bool,
    pub new_points: i64,
    pub next_available_at: DateTime<Utc>,
}

/// /api/user/update-points 兼容请求
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePointsRequest {
    pub points_to_add: Option<i64>,
    /// 仅允许 last_scratch_at / last_wheel_at / last_vip_slot_at
    pub timestamps: Option<HashMap<String, DateTime<Utc>>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdatePointsResponse {
    pub success: bool,
    pub points: i64,
}

/// claim_vip_bonus 返回
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimDailyResponse {
    pub success: bool,
    pub tickets_granted: i64,
    pub new_points: i64,
    pub message: String,
}
