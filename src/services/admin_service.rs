use crate::entities::{
    RewardStatus, prize_entity as prizes, profile_entity as profiles, reward_entity as rewards,
    ticket_entity as tickets,
};
use crate::error::{AppError, AppResult};
use crate::external::AdminNotifier;
use crate::models::*;
use crate::services::LedgerService;
use crate::services::ledger_service::lock_profile;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// 管理权限判断
pub trait Authorizer: Send + Sync {
    fn is_admin(&self, profile: &profiles::Model) -> bool;
}

/// 以资料上的 is_admin 角色为准
pub struct RoleAuthorizer;

impl Authorizer for RoleAuthorizer {
    fn is_admin(&self, profile: &profiles::Model) -> bool {
        profile.is_admin
    }
}

#[derive(Clone)]
pub struct AdminService {
    pool: DatabaseConnection,
    authorizer: Arc<dyn Authorizer>,
    notifier: AdminNotifier,
}

impl AdminService {
    pub fn new(
        pool: DatabaseConnection,
        authorizer: Arc<dyn Authorizer>,
        notifier: AdminNotifier,
    ) -> Self {
        Self {
            pool,
            authorizer,
            notifier,
        }
    }

    /// 非管理员返回 Forbidden
    pub async fn require_admin(&self, user_id: Uuid) -> AppResult<profiles::Model> {
        let profile = profiles::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::Forbidden)?;
        if !self.authorizer.is_admin(&profile) {
            return Err(AppError::Forbidden);
        }
        Ok(profile)
    }

    /// 启动时把配置中的邮箱提升为管理员
    pub async fn bootstrap_admins(&self, emails: &[String]) -> AppResult<u64> {
        if emails.is_empty() {
            return Ok(0);
        }
        let res = profiles::Entity::update_many()
            .col_expr(profiles::Column::IsAdmin, Expr::value(true))
            .filter(profiles::Column::Email.is_in(emails.iter().cloned()))
            .filter(profiles::Column::IsAdmin.eq(false))
            .exec(&self.pool)
            .await?;
        if res.rows_affected > 0 {
            log::info!("Promoted {} profile(s) to admin", res.rows_affected);
        }
        Ok(res.rows_affected)
    }

    // ---- 用户 ----

    pub async fn list_users(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<AdminUserResponse>> {
        let paginator = profiles::Entity::find()
            .order_by_desc(profiles::Column::CreatedAt)
            .paginate(&self.pool, params.page_size());
        let total = paginator.num_items().await?;
        let data = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(PaginatedResponse::new(data, params, total))
    }

    pub async fn update_user(
        &self,
        admin_id: Uuid,
        request: AdminUpdateUserRequest,
    ) -> AppResult<AdminUserResponse> {
        let patch = request.payload;
        let user_id = request.user_id;

        let txn = self.pool.begin().await?;
        let profile = lock_profile(&txn, user_id).await?;

        if let Some(points) = patch.points {
            LedgerService::set_balance(
                &txn,
                user_id,
                points,
                Some(format!("Admin adjustment by {admin_id}")),
            )
            .await?;
        }

        if patch.is_vip.is_some() || patch.is_vip_plus.is_some() || patch.vip_until.is_some() {
            // 重新读取，保留 set_balance 写入的积分
            let fresh = profiles::Entity::find_by_id(user_id)
                .one(&txn)
                .await?
                .unwrap_or(profile);
            let mut active = fresh.into_active_model();
            if let Some(v) = patch.is_vip {
                active.is_vip = Set(v);
            }
            if let Some(v) = patch.is_vip_plus {
                active.is_vip_plus = Set(v);
            }
            if let Some(v) = patch.vip_until {
                active.vip_until = Set(v);
            }
            active.updated_at = Set(Utc::now());
            active.update(&txn).await?;
        }

        let updated = profiles::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(AppError::ProfileNotFound)?;
        txn.commit().await?;

        log::info!("Admin {admin_id} updated profile {user_id}");
        Ok(updated.into())
    }

    // ---- 奖励发放 ----

    pub async fn pending_rewards(&self) -> AppResult<Vec<PendingRewardResponse>> {
        let rows = rewards::Entity::find()
            .filter(rewards::Column::Status.eq(RewardStatus::Pending))
            .order_by_asc(rewards::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.user_id).collect();
        let users: HashMap<Uuid, profiles::Model> = profiles::Entity::find()
            .filter(profiles::Column::Id.is_in(ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(rows
            .into_iter()
            .map(|r| {
                let user = users.get(&r.user_id);
                PendingRewardResponse {
                    display_name: user.map(|u| u.display_name()).unwrap_or_default(),
                    email: user.map(|u| u.email.clone()).unwrap_or_default(),
                    reward: r.into(),
                }
            })
            .collect())
    }

    /// pending -> sent，重复标记不改变 sent_at
    pub async fn mark_reward_sent(&self, reward_id: Uuid) -> AppResult<RewardResponse> {
        let res = rewards::Entity::update_many()
            .col_expr(rewards::Column::Status, Expr::value(RewardStatus::Sent))
            .col_expr(rewards::Column::SentAt, Expr::value(Utc::now()))
            .filter(rewards::Column::Id.eq(reward_id))
            .filter(rewards::Column::Status.eq(RewardStatus::Pending))
            .exec(&self.pool)
            .await?;

        let reward = rewards::Entity::find_by_id(reward_id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::RewardNotFound)?;
        if res.rows_affected > 0 {
            log::info!("Reward {reward_id} marked as sent");
        }
        Ok(reward.into())
    }

    pub async fn send_test_email(&self, to: Option<String>) -> AppResult<String> {
        let to = to
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.notifier.admin_email().map(str::to_string))
            .ok_or_else(|| {
                AppError::ValidationError("No recipient and no admin email configured".into())
            })?;

        self.notifier
            .send(
                &to,
                "BK'reward : email de test",
                "<p>La configuration des emails fonctionne.</p>",
            )
            .await?;
        Ok(to)
    }

    // ---- 统计 ----

    pub async fn ticket_statistics(&self) -> AppResult<TicketStatistics> {
        let all = tickets::Entity::find().all(&self.pool).await?;
        let prize_list = prizes::Entity::find()
            .order_by_desc(prizes::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let mut per_prize: HashMap<Uuid, (u64, HashSet<Uuid>)> = HashMap::new();
        let mut participants = HashSet::new();
        for t in &all {
            let entry = per_prize.entry(t.prize_id).or_default();
            entry.0 += 1;
            entry.1.insert(t.user_id);
            participants.insert(t.user_id);
        }

        Ok(TicketStatistics {
            total_tickets: all.len() as u64,
            total_participants: participants.len() as u64,
            per_prize: prize_list
                .into_iter()
                .map(|p| {
                    let (count, users) = per_prize.remove(&p.id).unwrap_or_default();
                    PrizeTicketCount {
                        cadeau_id: p.id,
                        nom: p.name,
                        tickets: count,
                        participants: users.len() as u64,
                    }
                })
                .collect(),
        })
    }

    pub async fn vip_plus_count(&self) -> AppResult<VipPlusCountResponse> {
        let count = profiles::Entity::find()
            .filter(profiles::Column::IsVipPlus.eq(true))
            .count(&self.pool)
            .await?;
        Ok(VipPlusCountResponse { count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_authorizer_uses_profile_flag() {
        let now = Utc::now();
        let mut profile = profiles::Model {
            id: Uuid::new_v4(),
            email: "someone@bkreward.fr".into(),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            points: 0,
            is_admin: false,
            is_vip: false,
            is_vip_plus: false,
            vip_until: None,
            vip_plan: None,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            last_claim_date: None,
            last_scratch_at: None,
            last_wheel_at: None,
            last_vip_slot_at: None,
            pending_rescue_bet: None,
            referral_code: "ABCDEFGH".into(),
            referred_by: None,
            address: None,
            postal_code: None,
            city: None,
            password_reset_nonce: None,
            created_at: now,
            updated_at: now,
        };
        assert!(!RoleAuthorizer.is_admin(&profile));
        profile.is_admin = true;
        assert!(RoleAuthorizer.is_admin(&profile));
    }
}
