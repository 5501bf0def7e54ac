use crate::error::AppResult;
use async_trait::async_trait;
use std::sync::Arc;

/// 邮件通知出口，按需注入到各服务
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> AppResult<()>;
}

/// 未配置邮件服务时只写日志
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn send_email(&self, to: &str, subject: &str, _html: &str) -> AppResult<()> {
        log::info!("Email not sent (no provider configured): to={to} subject={subject}");
        Ok(())
    }
}

/// 管理员通知：失败只记录日志，不影响业务结果
#[derive(Clone)]
pub struct AdminNotifier {
    sink: Arc<dyn NotificationSink>,
    admin_email: Option<String>,
}

impl AdminNotifier {
    pub fn new(sink: Arc<dyn NotificationSink>, admin_email: Option<String>) -> Self {
        Self { sink, admin_email }
    }

    pub fn admin_email(&self) -> Option<&str> {
        self.admin_email.as_deref()
    }

    pub async fn notify_admin(&self, subject: &str, html: &str) {
        let Some(to) = self.admin_email.as_deref() else {
            log::warn!("Admin notification skipped, no admin email configured: {subject}");
            return;
        };
        if let Err(e) = self.sink.send_email(to, subject, html).await {
            log::error!("Failed to notify admin ({subject}): {e}");
        }
    }

    /// 直接发送（测试邮件需要把错误返回给调用方）
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        self.sink.send_email(to, subject, html).await
    }
}
