use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitScoreRequest {
    pub score: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub display_name: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

/// 每周冠军（history_leaderboard）
#[derive(Debug, Serialize, ToSchema)]
pub struct WeeklyWinnerResponse {
    pub user_id: Uuid,
    pub display_name: String,
    pub score: i64,
    pub week_year: i32,
    pub week_number: i32,
    pub prize_type: String,
    pub prize_label: String,
    pub status: String,
}
