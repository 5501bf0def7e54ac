use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 单行配置表，固定 id = 1
pub const SETTINGS_ROW_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "app_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub grade_debutant_label: String,
    pub grade_bronze_label: String,
    pub grade_argent_label: String,
    pub grade_or_label: String,
    pub grade_debutant_max: i64,
    pub grade_bronze_max: i64,
    pub grade_argent_max: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
