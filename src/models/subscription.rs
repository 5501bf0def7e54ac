use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 订阅方案：weekly（7 天）/ monthly（30 天）/ vip_plus（30 天，VIP+）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    Weekly,
    Monthly,
    VipPlus,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Weekly => "weekly",
            SubscriptionPlan::Monthly => "monthly",
            SubscriptionPlan::VipPlus => "vip_plus",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "weekly" | "hebdo" => Some(SubscriptionPlan::Weekly),
            "monthly" | "mensuel" => Some(SubscriptionPlan::Monthly),
            "vip_plus" | "vip-plus" => Some(SubscriptionPlan::VipPlus),
            _ => None,
        }
    }

    pub fn duration_days(&self) -> i64 {
        match self {
            SubscriptionPlan::Weekly => 7,
            SubscriptionPlan::Monthly | SubscriptionPlan::VipPlus => 30,
        }
    }

    pub fn grants_vip_plus(&self) -> bool {
        matches!(self, SubscriptionPlan::VipPlus)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub plan: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_parsing_and_duration() {
        assert_eq!(SubscriptionPlan::parse("weekly"), Some(SubscriptionPlan::Weekly));
        assert_eq!(SubscriptionPlan::parse("mensuel"), Some(SubscriptionPlan::Monthly));
        assert_eq!(SubscriptionPlan::parse("vip_plus"), Some(SubscriptionPlan::VipPlus));
        assert_eq!(SubscriptionPlan::parse("yearly"), None);
        assert_eq!(SubscriptionPlan::Weekly.duration_days(), 7);
        assert_eq!(SubscriptionPlan::VipPlus.duration_days(), 30);
        assert!(SubscriptionPlan::VipPlus.grants_vip_plus());
        assert!(!SubscriptionPlan::Monthly.grants_vip_plus());
    }
}
