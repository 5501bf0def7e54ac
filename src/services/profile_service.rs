use crate::entities::{profile_entity as profiles, reward_entity as rewards, ticket_entity as tickets};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::settings_service::load_grades;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileService {
    pool: DatabaseConnection,
}

impl ProfileService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: Uuid) -> AppResult<profiles::Model> {
        profiles::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::ProfileNotFound)
    }

    /// 当前用户资料，附带会员等级与票数
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<ProfileResponse> {
        let profile = self.find(user_id).await?;
        let grades = load_grades(&self.pool).await?;
        let grade = grades.grade_for(profile.points).to_string();
        let ticket_count = tickets::Entity::find()
            .filter(tickets::Column::UserId.eq(user_id))
            .count(&self.pool)
            .await?;

        let mut resp = ProfileResponse::from(profile);
        resp.grade = Some(grade);
        resp.ticket_count = Some(ticket_count);
        Ok(resp)
    }

    /// 只允许修改姓名与收货地址；积分、会员状态不在此处
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> AppResult<ProfileResponse> {
        let profile = self.find(user_id).await?;
        let mut active = profile.into_active_model();

        if let Some(v) = request.first_name {
            active.first_name = Set(non_empty(v));
        }
        if let Some(v) = request.last_name {
            active.last_name = Set(non_empty(v));
        }
        if let Some(v) = request.adresse {
            active.address = Set(non_empty(v));
        }
        if let Some(v) = request.code_postal {
            active.postal_code = Set(non_empty(v));
        }
        if let Some(v) = request.ville {
            active.city = Set(non_empty(v));
        }
        active.updated_at = Set(Utc::now());
        active.update(&self.pool).await?;

        self.get_profile(user_id).await
    }

    pub async fn my_tickets(&self, user_id: Uuid) -> AppResult<Vec<TicketResponse>> {
        Ok(tickets::Entity::find()
            .filter(tickets::Column::UserId.eq(user_id))
            .order_by_desc(tickets::Column::CreatedAt)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub async fn my_rewards(&self, user_id: Uuid) -> AppResult<Vec<RewardResponse>> {
        Ok(rewards::Entity::find()
            .filter(rewards::Column::UserId.eq(user_id))
            .order_by_desc(rewards::Column::CreatedAt)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

fn non_empty(v: String) -> Option<String> {
    let v = v.trim();
    (!v.is_empty()).then(|| v.to_string())
}
