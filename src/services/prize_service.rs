use crate::entities::{
    LedgerEntryKind, PrizeStatus, prize_entity as prizes, profile_entity as profiles,
    ticket_entity as tickets, winner_entity as winners,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::LedgerService;
use crate::utils::require_text;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct PrizeService {
    pool: DatabaseConnection,
}

impl PrizeService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 奖品列表（单票积分降序），登录用户附带自己的票数
    pub async fn list_prizes(&self, user_id: Option<Uuid>) -> AppResult<Vec<PrizeResponse>> {
        let list = prizes::Entity::find()
            .order_by_desc(prizes::Column::PointsPerTicket)
            .order_by_asc(prizes::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        if let Some(user_id) = user_id {
            let mine = tickets::Entity::find()
                .filter(tickets::Column::UserId.eq(user_id))
                .all(&self.pool)
                .await?;
            for t in mine {
                *counts.entry(t.prize_id).or_default() += 1;
            }
        }

        Ok(list
            .into_iter()
            .map(|p| {
                let mine = user_id.map(|_| counts.get(&p.id).copied().unwrap_or(0));
                let mut resp = PrizeResponse::from(p);
                resp.my_tickets = mine;
                resp
            })
            .collect())
    }

    /// 购买一张奖品票：扣分、计数、出票在同一事务内
    pub async fn participate(&self, user_id: Uuid, prize_id: Uuid) -> AppResult<ParticipateResponse> {
        let txn = self.pool.begin().await?;

        let profile = profiles::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AppError::ProfileNotFound)?;
        if !profile.has_shipping_address() {
            return Err(AppError::AddressRequired);
        }

        let prize = prizes::Entity::find_by_id(prize_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AppError::PrizeNotFound)?;
        if !prize.is_open() {
            return Err(AppError::Conflict("prize_closed"));
        }

        let new_points = LedgerService::debit(
            &txn,
            user_id,
            prize.points_per_ticket,
            LedgerEntryKind::PrizeTicket,
            Some(format!("Ticket {}", prize.name)),
        )
        .await?;

        let now = Utc::now();
        let res = prizes::Entity::update_many()
            .col_expr(
                prizes::Column::CurrentTickets,
                Expr::col(prizes::Column::CurrentTickets).add(1),
            )
            .col_expr(prizes::Column::UpdatedAt, Expr::value(now))
            .filter(prizes::Column::Id.eq(prize_id))
            .filter(prizes::Column::Status.eq(PrizeStatus::EnCours))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::Conflict("prize_closed"));
        }

        // 达到目标即关闭，状态与计数同事务提交
        prizes::Entity::update_many()
            .col_expr(prizes::Column::Status, Expr::value(PrizeStatus::Complet))
            .filter(prizes::Column::Id.eq(prize_id))
            .filter(
                Expr::col(prizes::Column::CurrentTickets)
                    .gte(Expr::col(prizes::Column::TargetTickets)),
            )
            .exec(&txn)
            .await?;

        let prize = prizes::Entity::find_by_id(prize_id)
            .one(&txn)
            .await?
            .ok_or(AppError::PrizeNotFound)?;

        let ticket = tickets::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            prize_id: Set(prize_id),
            ticket_number: Set(prize.current_tickets),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        if prize.status == PrizeStatus::Complet {
            log::info!("Prize {} reached its target ({} tickets)", prize.id, prize.current_tickets);
        }

        Ok(ParticipateResponse {
            new_points,
            ticket: ticket.into(),
            cadeau: prize.into(),
        })
    }

    pub async fn list_winners(&self) -> AppResult<Vec<WinnerResponse>> {
        let rows = winners::Entity::find()
            .order_by_desc(winners::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let prize_ids: Vec<Uuid> = rows.iter().map(|w| w.prize_id).collect();
        let user_ids: Vec<Uuid> = rows.iter().map(|w| w.user_id).collect();
        let prize_map: HashMap<Uuid, prizes::Model> = prizes::Entity::find()
            .filter(prizes::Column::Id.is_in(prize_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let user_map: HashMap<Uuid, profiles::Model> = profiles::Entity::find()
            .filter(profiles::Column::Id.is_in(user_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(rows
            .into_iter()
            .map(|w| {
                let prize = prize_map.get(&w.prize_id);
                WinnerResponse {
                    id: w.id,
                    cadeau_id: w.prize_id,
                    cadeau_nom: prize.map(|p| p.name.clone()).unwrap_or_default(),
                    image_url: prize.and_then(|p| p.image_url.clone()),
                    display_name: user_map
                        .get(&w.user_id)
                        .map(|u| u.display_name())
                        .unwrap_or_else(|| "Anonyme".to_string()),
                    ticket_number: w.ticket_number,
                    created_at: w.created_at,
                }
            })
            .collect())
    }

    // ---- 后台 ----

    pub async fn list_admin(&self) -> AppResult<Vec<AdminPrizeResponse>> {
        let rows = prizes::Entity::find()
            .order_by_desc(prizes::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        let mut winner_map: HashMap<Uuid, winners::Model> = winners::Entity::find()
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|w| (w.prize_id, w))
            .collect();

        Ok(rows
            .into_iter()
            .map(|prize| {
                let winner = winner_map.remove(&prize.id);
                AdminPrizeResponse::new(prize, winner)
            })
            .collect())
    }

    pub async fn create_prize(&self, request: CreatePrizeRequest) -> AppResult<PrizeResponse> {
        let name = require_text("nom", &request.nom)?;
        if request.points_par_ticket <= 0 {
            return Err(AppError::ValidationError(
                "points_par_ticket must be positive".to_string(),
            ));
        }
        if request.objectif_tickets <= 0 {
            return Err(AppError::ValidationError(
                "objectif_tickets must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let prize = prizes::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            image_url: Set(request.image_url.filter(|u| !u.trim().is_empty())),
            points_per_ticket: Set(request.points_par_ticket),
            target_tickets: Set(request.objectif_tickets),
            current_tickets: Set(0),
            status: Set(PrizeStatus::EnCours),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Prize created: {} ({})", prize.name, prize.id);
        Ok(prize.into())
    }

    /// 删除奖品及其票与中奖记录
    pub async fn delete_prize(&self, prize_id: Uuid) -> AppResult<()> {
        let txn = self.pool.begin().await?;
        tickets::Entity::delete_many()
            .filter(tickets::Column::PrizeId.eq(prize_id))
            .exec(&txn)
            .await?;
        winners::Entity::delete_many()
            .filter(winners::Column::PrizeId.eq(prize_id))
            .exec(&txn)
            .await?;
        let res = prizes::Entity::delete_by_id(prize_id).exec(&txn).await?;
        if res.rows_affected == 0 {
            return Err(AppError::PrizeNotFound);
        }
        txn.commit().await?;

        log::info!("Prize deleted: {prize_id}");
        Ok(())
    }

    /// complet -> envoyé；重复调用无副作用
    pub async fn mark_shipped(&self, prize_id: Uuid) -> AppResult<PrizeResponse> {
        let prize = prizes::Entity::find_by_id(prize_id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::PrizeNotFound)?;

        match prize.status {
            PrizeStatus::Envoye => Ok(prize.into()),
            PrizeStatus::EnCours => Err(AppError::Conflict("prize_not_complete")),
            PrizeStatus::Complet => {
                prizes::Entity::update_many()
                    .col_expr(prizes::Column::Status, Expr::value(PrizeStatus::Envoye))
                    .col_expr(prizes::Column::UpdatedAt, Expr::value(Utc::now()))
                    .filter(prizes::Column::Id.eq(prize_id))
                    .filter(prizes::Column::Status.eq(PrizeStatus::Complet))
                    .exec(&self.pool)
                    .await?;

                let prize = prizes::Entity::find_by_id(prize_id)
                    .one(&self.pool)
                    .await?
                    .ok_or(AppError::PrizeNotFound)?;
                log::info!("Prize marked as shipped: {prize_id}");
                Ok(prize.into())
            }
        }
    }
}
