use crate::database::is_unique_violation;
use crate::entities::{profile_entity as profiles, stripe_event_entity as stripe_events};
use crate::error::{AppError, AppResult};
use crate::external::{CheckoutParams, StripeService};
use crate::models::{CheckoutResponse, SubscriptionPlan};
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use stripe::{Event, EventObject, EventType, Expandable, InvoiceBillingReason};
use uuid::Uuid;

/// 订阅与 VIP 激活
#[derive(Clone)]
pub struct SubscriptionService {
    pool: DatabaseConnection,
    stripe: StripeService,
    site_url: String,
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection, stripe: StripeService, site_url: String) -> Self {
        Self {
            pool,
            stripe,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn create_checkout(&self, user_id: Uuid, plan: &str) -> AppResult<CheckoutResponse> {
        let plan = SubscriptionPlan::parse(plan)
            .ok_or_else(|| AppError::ValidationError(format!("Unknown plan: {plan}")))?;
        let profile = profiles::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let user_id = user_id.to_string();
        let success_url = format!("{}/profile?subscription=success", self.site_url);
        let cancel_url = format!("{}/profile?subscription=canceled", self.site_url);
        let url = self
            .stripe
            .create_checkout_session(CheckoutParams {
                user_id: &user_id,
                email: &profile.email,
                plan,
                customer_id: profile.stripe_customer_id.as_deref(),
                success_url: &success_url,
                cancel_url: &cancel_url,
            })
            .await?;

        log::info!("Checkout session created: user={user_id} plan={}", plan.as_str());
        Ok(CheckoutResponse { url })
    }

    pub async fn create_portal(&self, user_id: Uuid) -> AppResult<CheckoutResponse> {
        let profile = profiles::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::ProfileNotFound)?;
        let customer = profile
            .stripe_customer_id
            .filter(|c| !c.is_empty())
            .ok_or(AppError::Missing("stripe_customer_not_found"))?;

        let return_url = format!("{}/dashboard", self.site_url);
        let url = self.stripe.create_portal_session(&customer, &return_url).await?;
        Ok(CheckoutResponse { url })
    }

    /// 校验签名并解析事件
    pub fn verify_event(&self, payload: &str, signature: &str) -> AppResult<Event> {
        self.stripe.construct_event(payload, signature)
    }

    /// 处理 webhook 事件；同一事件 id 只处理一次，返回是否实际处理
    pub async fn handle_event(&self, event: Event) -> AppResult<bool> {
        let event_id = event.id.to_string();
        let txn = self.pool.begin().await?;
        if !record_event(&txn, &event_id, &event.type_.to_string()).await? {
            log::info!("Stripe event {event_id} already processed, skipping");
            return Ok(false);
        }

        let now = Utc::now();
        match (event.type_, event.data.object) {
            (EventType::CheckoutSessionCompleted, EventObject::CheckoutSession(session)) => {
                let metadata = session.metadata.unwrap_or_default();
                let user_id = session
                    .client_reference_id
                    .as_deref()
                    .or_else(|| metadata.get("user_id").map(String::as_str))
                    .and_then(|v| Uuid::parse_str(v).ok())
                    .ok_or_else(|| {
                        AppError::ValidationError("Missing user_id on checkout session".into())
                    })?;
                let plan = metadata
                    .get("plan")
                    .and_then(|p| SubscriptionPlan::parse(p))
                    .ok_or_else(|| AppError::ValidationError("Missing plan metadata".into()))?;
                let customer_id = session.customer.as_ref().map(|c| c.id().to_string());
                let subscription_id = session.subscription.as_ref().map(|s| s.id().to_string());

                activate_in(
                    &txn,
                    user_id,
                    plan,
                    customer_id,
                    subscription_id,
                    now,
                )
                .await?;
            }
            (EventType::InvoicePaymentSucceeded, EventObject::Invoice(invoice)) => {
                // 首期发票由 checkout.session.completed 处理
                if invoice.billing_reason == Some(InvoiceBillingReason::SubscriptionCreate) {
                    log::info!("Skipping initial subscription invoice {}", invoice.id);
                } else if let Some(sub) = invoice.subscription.as_ref() {
                    let sub_id = match sub {
                        Expandable::Id(id) => id.to_string(),
                        Expandable::Object(obj) => obj.id.to_string(),
                    };
                    renew_in(&txn, &sub_id, now).await?;
                }
            }
            (EventType::CustomerSubscriptionDeleted, EventObject::Subscription(sub)) => {
                cancel_in(&txn, &sub.id.to_string(), now).await?;
            }
            (other, _) => {
                log::info!("Unhandled Stripe event type: {other}");
            }
        }

        txn.commit().await?;
        Ok(true)
    }

    /// 激活会员（独立事务）
    pub async fn activate(
        &self,
        user_id: Uuid,
        plan: SubscriptionPlan,
        customer_id: Option<String>,
        subscription_id: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<profiles::Model> {
        let txn = self.pool.begin().await?;
        let profile = activate_in(&txn, user_id, plan, customer_id, subscription_id, now).await?;
        txn.commit().await?;
        Ok(profile)
    }

    pub async fn renew(&self, subscription_id: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let txn = self.pool.begin().await?;
        let renewed = renew_in(&txn, subscription_id, now).await?;
        txn.commit().await?;
        Ok(renewed)
    }

    pub async fn cancel(&self, subscription_id: &str, now: DateTime<Utc>) -> AppResult<u64> {
        cancel_in(&self.pool, subscription_id, now).await
    }
}

/// 会员到期时间：未过期则顺延，已过期从现在算起
pub fn extend_until(
    current: Option<DateTime<Utc>>,
    plan: SubscriptionPlan,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let base = current.filter(|until| *until > now).unwrap_or(now);
    base + Duration::days(plan.duration_days())
}

/// 写入已处理事件；重复返回 false
pub async fn record_event<C: ConnectionTrait>(
    db: &C,
    event_id: &str,
    event_type: &str,
) -> AppResult<bool> {
    let res = stripe_events::ActiveModel {
        id: Set(event_id.to_string()),
        event_type: Set(event_type.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await;

    match res {
        Ok(_) => Ok(true),
        Err(err) if is_unique_violation(&err) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

async fn activate_in<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    plan: SubscriptionPlan,
    customer_id: Option<String>,
    subscription_id: Option<String>,
    now: DateTime<Utc>,
) -> AppResult<profiles::Model> {
    let profile = profiles::Entity::find_by_id(user_id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or(AppError::ProfileNotFound)?;

    let until = extend_until(profile.vip_until, plan, now);
    let mut active = profile.into_active_model();
    active.is_vip = Set(true);
    if plan.grants_vip_plus() {
        active.is_vip_plus = Set(true);
    }
    active.vip_until = Set(Some(until));
    active.vip_plan = Set(Some(plan.as_str().to_string()));
    if customer_id.is_some() {
        active.stripe_customer_id = Set(customer_id);
    }
    if subscription_id.is_some() {
        active.stripe_subscription_id = Set(subscription_id);
    }
    active.updated_at = Set(now);
    let profile = active.update(db).await?;

    log::info!(
        "VIP activated: user={user_id} plan={} until={until}",
        plan.as_str()
    );
    Ok(profile)
}

/// 续费：按已保存的方案顺延
async fn renew_in<C: ConnectionTrait>(
    db: &C,
    subscription_id: &str,
    now: DateTime<Utc>,
) -> AppResult<bool> {
    let Some(profile) = profiles::Entity::find()
        .filter(profiles::Column::StripeSubscriptionId.eq(subscription_id))
        .lock_exclusive()
        .one(db)
        .await?
    else {
        log::warn!("Renewal for unknown subscription {subscription_id}");
        return Ok(false);
    };

    let plan = profile
        .vip_plan
        .as_deref()
        .and_then(SubscriptionPlan::parse)
        .unwrap_or(SubscriptionPlan::Monthly);
    let user_id = profile.id;
    let until = extend_until(profile.vip_until, plan, now);

    let mut active = profile.into_active_model();
    active.is_vip = Set(true);
    if plan.grants_vip_plus() {
        active.is_vip_plus = Set(true);
    }
    active.vip_until = Set(Some(until));
    active.updated_at = Set(now);
    active.update(db).await?;

    log::info!("VIP renewed: user={user_id} until={until}");
    Ok(true)
}

async fn cancel_in<C: ConnectionTrait>(
    db: &C,
    subscription_id: &str,
    now: DateTime<Utc>,
) -> AppResult<u64> {
    let res = profiles::Entity::update_many()
        .col_expr(profiles::Column::IsVip, Expr::value(false))
        .col_expr(profiles::Column::IsVipPlus, Expr::value(false))
        .col_expr(
            profiles::Column::StripeSubscriptionId,
            Expr::value(Option::<String>::None),
        )
        .col_expr(profiles::Column::UpdatedAt, Expr::value(now))
        .filter(profiles::Column::StripeSubscriptionId.eq(subscription_id))
        .exec(db)
        .await?;

    log::info!(
        "Subscription {subscription_id} deleted, {} profile(s) downgraded",
        res.rows_affected
    );
    Ok(res.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_extend_until() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(
            extend_until(None, SubscriptionPlan::Weekly, now),
            now + Duration::days(7)
        );
        // 未过期：在原到期时间上顺延
        let future = now + Duration::days(3);
        assert_eq!(
            extend_until(Some(future), SubscriptionPlan::Monthly, now),
            future + Duration::days(30)
        );
        // 已过期：从现在算起
        let past = now - Duration::days(3);
        assert_eq!(
            extend_until(Some(past), SubscriptionPlan::Weekly, now),
            now + Duration::days(7)
        );
    }
}
