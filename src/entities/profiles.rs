use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 用户资料：积分余额即 `points`，只能通过 LedgerService 修改
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub points: i64,
    pub is_admin: bool,
    pub is_vip: bool,
    pub is_vip_plus: bool,
    pub vip_until: Option<DateTime<Utc>>,
    pub vip_plan: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub last_claim_date: Option<DateTime<Utc>>,
    pub last_scratch_at: Option<DateTime<Utc>>,
    pub last_wheel_at: Option<DateTime<Utc>>,
    pub last_vip_slot_at: Option<DateTime<Utc>>,
    /// 转盘输掉、可通过激励广告找回的下注
    pub pending_rescue_bet: Option<i64>,
    #[sea_orm(unique)]
    pub referral_code: String,
    pub referred_by: Option<Uuid>,
    #[sea_orm(column_name = "adresse")]
    pub address: Option<String>,
    #[sea_orm(column_name = "code_postal")]
    pub postal_code: Option<String>,
    #[sea_orm(column_name = "ville")]
    pub city: Option<String>,
    pub password_reset_nonce: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// 展示名：名 + 姓首字母，缺省时退回邮箱前缀
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                let initial: String = last.chars().take(1).collect();
                format!("{first} {initial}.")
            }
            (Some(first), _) if !first.is_empty() => first.to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// 是否已填写完整收货地址
    pub fn has_shipping_address(&self) -> bool {
        [&self.address, &self.postal_code, &self.city]
            .iter()
            .all(|v| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
