use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    #[sea_orm(string_value = "ad_view")]
    AdView,
    /// 当天首次观看广告
    #[sea_orm(string_value = "daily_bonus")]
    DailyBonus,
    #[sea_orm(string_value = "referral")]
    Referral,
    #[sea_orm(string_value = "vip_daily_claim")]
    VipDailyClaim,
    #[sea_orm(string_value = "mini_game")]
    MiniGame,
    #[sea_orm(string_value = "tap_tap_prize")]
    TapTapPrize,
    #[sea_orm(string_value = "prize_ticket")]
    PrizeTicket,
    #[sea_orm(string_value = "pool_contribution")]
    PoolContribution,
    #[sea_orm(string_value = "pool_purchase")]
    PoolPurchase,
    #[sea_orm(string_value = "client_update")]
    ClientUpdate,
    #[sea_orm(string_value = "admin_adjustment")]
    AdminAdjustment,
}

impl std::fmt::Display for LedgerEntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LedgerEntryKind::AdView => "ad_view",
            LedgerEntryKind::DailyBonus => "daily_bonus",
            LedgerEntryKind::Referral => "referral",
            LedgerEntryKind::VipDailyClaim => "vip_daily_claim",
            LedgerEntryKind::MiniGame => "mini_game",
            LedgerEntryKind::TapTapPrize => "tap_tap_prize",
            LedgerEntryKind::PrizeTicket => "prize_ticket",
            LedgerEntryKind::PoolContribution => "pool_contribution",
            LedgerEntryKind::PoolPurchase => "pool_purchase",
            LedgerEntryKind::ClientUpdate => "client_update",
            LedgerEntryKind::AdminAdjustment => "admin_adjustment",
        };
        write!(f, "{s}")
    }
}

/// 积分流水：amount 为带符号变动，balance_after 为变动后余额
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "point_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: LedgerEntryKind,
    pub amount: i64,
    pub balance_after: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
