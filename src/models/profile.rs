use crate::entities::{LedgerEntryKind, point_transaction_entity, profile_entity};
use crate::utils::cooldown::MembershipTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub points: i64,
    pub is_admin: bool,
    pub is_vip: bool,
    pub is_vip_plus: bool,
    pub vip_until: Option<DateTime<Utc>>,
    pub tier: MembershipTier,
    pub referral_code: String,
    pub referred_by: Option<Uuid>,
    pub adresse: Option<String>,
    pub code_postal: Option<String>,
    pub ville: Option<String>,
    pub last_claim_date: Option<DateTime<Utc>>,
    pub last_scratch_at: Option<DateTime<Utc>>,
    pub last_wheel_at: Option<DateTime<Utc>>,
    pub last_vip_slot_at: Option<DateTime<Utc>>,
    /// 可找回的转盘下注
    pub pending_rescue_bet: Option<i64>,
    /// 会员等级名称（按积分阈值）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    /// 已购买的奖品票总数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_count: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl From<profile_entity::Model> for ProfileResponse {
    fn from(m: profile_entity::Model) -> Self {
        let tier = MembershipTier::of(&m, Utc::now());
        Self {
            id: m.id,
            email: m.email,
            first_name: m.first_name,
            last_name: m.last_name,
            points: m.points,
            is_admin: m.is_admin,
            is_vip: m.is_vip,
            is_vip_plus: m.is_vip_plus,
            vip_until: m.vip_until,
            tier,
            referral_code: m.referral_code,
            referred_by: m.referred_by,
            adresse: m.address,
            code_postal: m.postal_code,
            ville: m.city,
            last_claim_date: m.last_claim_date,
            last_scratch_at: m.last_scratch_at,
            last_wheel_at: m.last_wheel_at,
            last_vip_slot_at: m.last_vip_slot_at,
            pending_rescue_bet: m.pending_rescue_bet,
            grade: None,
            ticket_count: None,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub adresse: Option<String>,
    pub code_postal: Option<String>,
    pub ville: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LedgerEntryResponse {
    pub id: Uuid,
    pub kind: LedgerEntryKind,
    pub amount: i64,
    pub balance_after: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<point_transaction_entity::Model> for LedgerEntryResponse {
    fn from(m: point_transaction_entity::Model) -> Self {
        Self {
            id: m.id,
            kind: m.kind,
            amount: m.amount,
            balance_after: m.balance_after,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub points: i64,
}
