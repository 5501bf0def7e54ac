use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};
use crate::models::SubscriptionPlan;
use std::collections::HashMap;
use stripe::{
    BillingPortalSession, CheckoutSession, CheckoutSessionMode, Client, CreateBillingPortalSession,
    CreateCheckoutSession, CreateCheckoutSessionLineItems, CreateCheckoutSessionSubscriptionData,
    CustomerId, Event, Webhook,
};

/// Checkout 所需的业务参数
pub struct CheckoutParams<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
    pub plan: SubscriptionPlan,
    pub customer_id: Option<&'a str>,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
}

/// async-stripe 的薄封装
#[derive(Clone)]
pub struct StripeService {
    client: Client,
    config: StripeConfig,
}

impl StripeService {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(config.secret_key.clone()),
            config,
        }
    }

    pub fn price_id(&self, plan: SubscriptionPlan) -> AppResult<&str> {
        let price = match plan {
            SubscriptionPlan::Weekly => self.config.price_id_weekly.as_deref(),
            SubscriptionPlan::Monthly => self.config.price_id_monthly.as_deref(),
            SubscriptionPlan::VipPlus => self.config.price_id_vip_plus.as_deref(),
        };
        price.filter(|p| !p.is_empty()).ok_or_else(|| {
            AppError::ConfigError(format!("Stripe price id missing for plan {}", plan.as_str()))
        })
    }

    /// 创建订阅模式的 Checkout Session，返回跳转 URL
    pub async fn create_checkout_session(&self, params: CheckoutParams<'_>) -> AppResult<String> {
        let price_id = self.price_id(params.plan)?.to_string();

        let metadata: HashMap<String, String> = HashMap::from([
            ("user_id".to_string(), params.user_id.to_string()),
            ("plan".to_string(), params.plan.as_str().to_string()),
            ("price_id".to_string(), price_id.clone()),
        ]);

        let mut create = CreateCheckoutSession::new();
        create.mode = Some(CheckoutSessionMode::Subscription);
        create.success_url = Some(params.success_url);
        create.cancel_url = Some(params.cancel_url);
        create.client_reference_id = Some(params.user_id);
        match params.customer_id {
            Some(customer) => {
                let customer: CustomerId = customer
                    .parse()
                    .map_err(|_| AppError::InternalError("Invalid Stripe customer id".into()))?;
                create.customer = Some(customer);
            }
            None => create.customer_email = Some(params.email),
        }
        create.line_items = Some(vec![CreateCheckoutSessionLineItems {
            price: Some(price_id),
            quantity: Some(1),
            ..Default::default()
        }]);
        create.metadata = Some(metadata.clone());
        create.subscription_data = Some(CreateCheckoutSessionSubscriptionData {
            metadata: Some(metadata),
            ..Default::default()
        });

        let session = CheckoutSession::create(&self.client, create).await?;
        session
            .url
            .ok_or_else(|| AppError::ExternalApiError("Checkout session has no URL".to_string()))
    }

    /// 客户自助管理订阅
    pub async fn create_portal_session(&self, customer_id: &str, return_url: &str) -> AppResult<String> {
        let customer: CustomerId = customer_id
            .parse()
            .map_err(|_| AppError::InternalError("Invalid Stripe customer id".into()))?;
        let mut create = CreateBillingPortalSession::new(customer);
        create.return_url = Some(return_url);

        let session = BillingPortalSession::create(&self.client, create).await?;
        Ok(session.url)
    }

    /// 校验 Stripe-Signature 并解析事件
    pub fn construct_event(&self, payload: &str, signature: &str) -> AppResult<Event> {
        if self.config.webhook_secret.is_empty() {
            return Err(AppError::ConfigError(
                "STRIPE_WEBHOOK_SECRET is not configured".to_string(),
            ));
        }
        Webhook::construct_event(payload, signature, &self.config.webhook_secret)
            .map_err(|e| AppError::AuthError(format!("Invalid webhook signature: {e}")))
    }
}
