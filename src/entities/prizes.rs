use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 奖品状态：en_cours -> complet -> envoyé，不可回退
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum PrizeStatus {
    #[sea_orm(string_value = "en_cours")]
    #[serde(rename = "en_cours")]
    EnCours,
    #[sea_orm(string_value = "complet")]
    #[serde(rename = "complet")]
    Complet,
    #[sea_orm(string_value = "envoyé")]
    #[serde(rename = "envoyé")]
    Envoye,
}

impl std::fmt::Display for PrizeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrizeStatus::EnCours => write!(f, "en_cours"),
            PrizeStatus::Complet => write!(f, "complet"),
            PrizeStatus::Envoye => write!(f, "envoyé"),
        }
    }
}

/// 奖品（表名沿用 cadeaux，列名为法语）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "cadeaux")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_name = "nom")]
    pub name: String,
    pub image_url: Option<String>,
    #[sea_orm(column_name = "points_par_ticket")]
    pub points_per_ticket: i64,
    #[sea_orm(column_name = "objectif_tickets")]
    pub target_tickets: i64,
    #[sea_orm(column_name = "tickets_actuels")]
    pub current_tickets: i64,
    #[sea_orm(column_name = "statut")]
    pub status: PrizeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_open(&self) -> bool {
        self.status == PrizeStatus::EnCours
    }

    pub fn target_reached(&self) -> bool {
        self.current_tickets >= self.target_tickets
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
