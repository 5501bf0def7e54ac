use crate::database::is_unique_violation;
use crate::entities::{
    RewardStatus, prize_entity as prizes, profile_entity as profiles, reward_entity as rewards,
    ticket_entity as tickets, winner_entity as winners,
};
use crate::error::{AppError, AppResult};
use crate::external::AdminNotifier;
use crate::models::DrawResultResponse;
use crate::utils::reward_type_for;
use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

/// 开奖：每个奖品最多一条 gagnants 记录
#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
    notifier: AdminNotifier,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection, notifier: AdminNotifier) -> Self {
        Self { pool, notifier }
    }

    pub async fn draw_winner(&self, prize_id: Uuid) -> AppResult<DrawResultResponse> {
        let txn = self.pool.begin().await?;

        let prize = prizes::Entity::find_by_id(prize_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AppError::PrizeNotFound)?;

        let existing = winners::Entity::find()
            .filter(winners::Column::PrizeId.eq(prize_id))
            .count(&txn)
            .await?;
        if existing > 0 {
            return Err(AppError::Conflict("gagnant_already_exists"));
        }

        let total = tickets::Entity::find()
            .filter(tickets::Column::PrizeId.eq(prize_id))
            .count(&txn)
            .await?;
        if total == 0 {
            return Err(AppError::Rejected("no_tickets"));
        }
        if prize.current_tickets < prize.target_tickets {
            return Err(AppError::Rejected("not_enough_tickets"));
        }

        // 所有票等概率
        let offset = rand::thread_rng().gen_range(0..total);
        let ticket = tickets::Entity::find()
            .filter(tickets::Column::PrizeId.eq(prize_id))
            .order_by_asc(tickets::Column::TicketNumber)
            .offset(offset)
            .limit(1)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::InternalError("Drawn ticket disappeared".to_string()))?;

        let winner_profile = profiles::Entity::find_by_id(ticket.user_id)
            .one(&txn)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let now = Utc::now();
        let carried_over = (prize.current_tickets - prize.target_tickets).max(0);
        winners::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(winner_profile.id),
            prize_id: Set(prize_id),
            ticket_id: Set(ticket.id),
            ticket_number: Set(ticket.ticket_number),
            email: Set(winner_profile.email.clone()),
            tickets_count: Set(prize.current_tickets),
            carried_over_tickets: Set(carried_over),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(unique_winner)?;

        rewards::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(winner_profile.id),
            reward_type: Set(reward_type_for(&prize.name)),
            label: Set(Some(prize.name.clone())),
            status: Set(RewardStatus::Pending),
            created_at: Set(now),
            sent_at: Set(None),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        log::info!(
            "Winner drawn for prize {prize_id}: ticket #{} user {}",
            ticket.ticket_number,
            winner_profile.id
        );

        let subject = format!("Gagnant tiré pour {}", prize.name);
        let html = format!(
            "<p>Cadeau : <strong>{}</strong></p><p>Gagnant : {} ({})</p><p>Ticket n°{} sur {}</p>",
            prize.name,
            winner_profile.display_name(),
            winner_profile.email,
            ticket.ticket_number,
            prize.current_tickets
        );
        self.notifier.notify_admin(&subject, &html).await;

        Ok(DrawResultResponse {
            success: true,
            email: winner_profile.email,
            ticket_number: ticket.ticket_number,
            cadeau_nom: prize.name,
            gagnant_nom: winner_profile.last_name,
            gagnant_prenom: winner_profile.first_name,
            tickets_count: prize.current_tickets,
            carried_over_tickets: carried_over,
            message: "Gagnant sélectionné".to_string(),
        })
    }
}

/// 并发开奖时唯一索引兜底
fn unique_winner(err: DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict("gagnant_already_exists")
    } else {
        AppError::DatabaseError(err)
    }
}
