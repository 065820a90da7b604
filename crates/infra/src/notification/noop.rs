//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! 通知を無効化した環境（`NOTIFICATION_BACKEND=noop`）で使用する。

use async_trait::async_trait;
use chrono::Utc;
use policy_notify_domain::notification::{ComposedMessage, NotificationError, SendReceipt};

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
#[derive(Debug, Clone, Default)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &ComposedMessage) -> Result<SendReceipt, NotificationError> {
        tracing::info!(
            to = %email.to,
            cc = ?email.cc,
            subject = %email.subject,
            "Noop: メール送信をスキップ"
        );
        Ok(SendReceipt::new(None, Utc::now()))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
