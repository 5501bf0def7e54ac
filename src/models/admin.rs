use crate::entities::profile_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub points: i64,
    pub is_admin: bool,
    pub is_vip: bool,
    pub is_vip_plus: bool,
    pub vip_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<profile_entity::Model> for AdminUserResponse {
    fn from(m: profile_entity::Model) -> Self {
        Self {
            display_name: m.display_name(),
            id: m.id,
            email: m.email,
            points: m.points,
            is_admin: m.is_admin,
            is_vip: m.is_vip,
            is_vip_plus: m.is_vip_plus,
            vip_until: m.vip_until,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    pub user_id: Uuid,
    pub payload: AdminUserPatch,
}

/// 仅以下字段可修改；vip_until 显式传 null 表示清空
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminUserPatch {
    pub points: Option<i64>,
    pub is_vip: Option<bool>,
    pub is_vip_plus: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_explicit_null")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub vip_until: Option<Option<DateTime<Utc>>>,
}

fn deserialize_explicit_null<'de, D>(d: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::deserialize(d)?))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrizeTicketCount {
    pub cadeau_id: Uuid,
    pub nom: String,
    pub tickets: u64,
    pub participants: u64,
}

/// get_ticket_statistics
#[derive(Debug, Serialize, ToSchema)]
pub struct TicketStatistics {
    pub total_tickets: u64,
    pub total_participants: u64,
    pub per_prize: Vec<PrizeTicketCount>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VipPlusCountResponse {
    pub count: u64,
}

/// 会员等级设置（app_settings）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GradeSettings {
    pub debutant_label: String,
    pub bronze_label: String,
    pub argent_label: String,
    pub or_label: String,
    pub debutant_max: i64,
    pub bronze_max: i64,
    pub argent_max: i64,
}

impl GradeSettings {
    /// points <= debutant_max -> 初级，依次类推，超过 argent_max 为 Or
    pub fn grade_for(&self, points: i64) -> &str {
        if points <= self.debutant_max {
            &self.debutant_label
        } else if points <= self.bronze_max {
            &self.bronze_label
        } else if points <= self.argent_max {
            &self.argent_label
        } else {
            &self.or_label
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrizeIdRequest {
    pub prize_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> GradeSettings {
        GradeSettings {
            debutant_label: "Débutant".into(),
            bronze_label: "Bronze".into(),
            argent_label: "Argent".into(),
            or_label: "Or".into(),
            debutant_max: 100,
            bronze_max: 500,
            argent_max: 1500,
        }
    }

    #[test]
    fn test_grade_thresholds() {
        let g = defaults();
        assert_eq!(g.grade_for(0), "Débutant");
        assert_eq!(g.grade_for(100), "Débutant");
        assert_eq!(g.grade_for(101), "Bronze");
        assert_eq!(g.grade_for(1500), "Argent");
        assert_eq!(g.grade_for(1501), "Or");
    }

    #[test]
    fn test_patch_distinguishes_null_from_missing() {
        let patch: AdminUserPatch = serde_json::from_str(r#"{"points": 5}"#).unwrap();
        assert!(patch.vip_until.is_none());

        let patch: AdminUserPatch = serde_json::from_str(r#"{"vip_until": null}"#).unwrap();
        assert_eq!(patch.vip_until, Some(None));
    }
}
