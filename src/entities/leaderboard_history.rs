use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 每周 Tap-Tap 冠军（history_leaderboard）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "history_leaderboard")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub score: i64,
    pub week_year: i32,
    pub week_number: i32,
    /// gift_card / points
    pub prize_type: String,
    pub prize_label: String,
    /// a_envoyer / attribue
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
