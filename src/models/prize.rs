use crate::entities::{PrizeStatus, prize_entity, ticket_entity, winner_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// 字段名与前端保持一致（法语）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeResponse {
    pub id: Uuid,
    pub nom: String,
    pub image_url: Option<String>,
    pub points_par_ticket: i64,
    pub objectif_tickets: i64,
    pub tickets_actuels: i64,
    pub statut: PrizeStatus,
    /// 当前用户在该奖品下的票数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_tickets: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl From<prize_entity::Model> for PrizeResponse {
    fn from(m: prize_entity::Model) -> Self {
        Self {
            id: m.id,
            nom: m.name,
            image_url: m.image_url,
            points_par_ticket: m.points_per_ticket,
            objectif_tickets: m.target_tickets,
            tickets_actuels: m.current_tickets,
            statut: m.status,
            my_tickets: None,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketResponse {
    pub id: Uuid,
    pub cadeau_id: Uuid,
    pub ticket_number: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ticket_entity::Model> for TicketResponse {
    fn from(m: ticket_entity::Model) -> Self {
        Self {
            id: m.id,
            cadeau_id: m.prize_id,
            ticket_number: m.ticket_number,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipateResponse {
    pub new_points: i64,
    pub ticket: TicketResponse,
    pub cadeau: PrizeResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePrizeRequest {
    pub nom: String,
    pub image_url: Option<String>,
    pub points_par_ticket: i64,
    pub objectif_tickets: i64,
}

/// 开奖结果（兼容 pick_winner / launch_final_draw）
#[derive(Debug, Serialize, ToSchema)]
pub struct DrawResultResponse {
    pub success: bool,
    pub email: String,
    pub ticket_number: i64,
    pub cadeau_nom: String,
    pub gagnant_nom: Option<String>,
    pub gagnant_prenom: Option<String>,
    pub tickets_count: i64,
    pub carried_over_tickets: i64,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WinnerResponse {
    pub id: Uuid,
    pub cadeau_id: Uuid,
    pub cadeau_nom: String,
    pub image_url: Option<String>,
    pub display_name: String,
    pub ticket_number: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminPrizeResponse {
    #[serde(flatten)]
    pub prize: PrizeResponse,
    pub winner_email: Option<String>,
    pub winner_ticket_number: Option<i64>,
}

impl AdminPrizeResponse {
    pub fn new(prize: prize_entity::Model, winner: Option<winner_entity::Model>) -> Self {
        Self {
            prize: prize.into(),
            winner_email: winner.as_ref().map(|w| w.email.clone()),
            winner_ticket_number: winner.map(|w| w.ticket_number),
        }
    }
}
