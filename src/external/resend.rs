use crate::config::ResendConfig;
use crate::error::{AppError, AppResult};
use crate::external::notifier::NotificationSink;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Resend 邮件发送
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    api_key: String,
    from_email: String,
}

impl ResendMailer {
    /// 未配置 api_key 时返回 None
    pub fn from_config(config: &ResendConfig) -> Option<Self> {
        let api_key = config.api_key.clone().filter(|k| !k.is_empty())?;
        Some(Self {
            client: Client::new(),
            api_key,
            from_email: config.from_email.clone(),
        })
    }
}

#[async_trait]
impl NotificationSink for ResendMailer {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        let body = SendEmailRequest {
            from: &self.from_email,
            to: vec![to],
            subject,
            html,
        };

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            let sent: SendEmailResponse = response.json().await?;
            log::info!("Email sent via Resend: id={} to={to}", sent.id);
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            Err(AppError::ExternalApiError(format!(
                "Resend rejected email: {error_text}"
            )))
        }
    }
}
