use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 中奖记录（gagnants），cadeau_id 唯一
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "gagnants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_name = "cadeau_id")]
    pub prize_id: Uuid,
    pub ticket_id: Uuid,
    pub ticket_number: i64,
    pub email: String,
    /// 开奖时参与的票数
    pub tickets_count: i64,
    /// 超出目标的票数
    pub carried_over_tickets: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
