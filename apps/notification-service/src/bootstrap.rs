//! # 依存の組み立て
//!
//! 設定からトレーシング・送信実装・ディスパッチサービスを構築する。
//! ホストプロセスは起動時に [`init_observability`] → [`build_service`] の順に呼ぶ。

use std::sync::Arc;

use policy_notify_domain::notification::NotificationError;
use policy_notify_infra::notification::{
    NoopNotificationSender,
    NotificationSender,
    SmtpNotificationSender,
};
use policy_notify_shared::observability::init_tracing;

use crate::{
    config::{NotificationBackend, NotificationConfig},
    usecase::notification::{NotificationService, TemplateRenderer},
};

/// 設定のログ形式でトレーシングを初期化する
///
/// 既に subscriber が登録済みなら何もせず `false` を返す。
pub fn init_observability(config: &NotificationConfig) -> bool {
    init_tracing(&config.tracing_config())
}

/// 設定に応じた送信実装を作成する
///
/// SMTP の接続プールがバックグラウンドタスクを起動するため、Tokio ランタイム上で呼び出すこと。
pub fn build_sender(
    config: &NotificationConfig,
) -> Result<Arc<dyn NotificationSender>, NotificationError> {
    let sender: Arc<dyn NotificationSender> = match (config.backend, &config.smtp) {
        (NotificationBackend::Smtp, Some(smtp)) => Arc::new(SmtpNotificationSender::new(smtp)?),
        (NotificationBackend::Smtp, None) => {
            return Err(NotificationError::TransportSetup(
                "SMTP バックエンドに接続設定がありません".to_string(),
            ));
        }
        (NotificationBackend::Noop, _) => Arc::new(NoopNotificationSender),
    };

    tracing::info!(
        backend = %config.backend,
        sender = sender.name(),
        max_in_flight = config.max_in_flight,
        "通知送信を初期化しました"
    );

    Ok(sender)
}

/// 設定から既定テンプレートのディスパッチサービスを作成する
pub fn build_service(config: &NotificationConfig) -> Result<NotificationService, NotificationError> {
    let sender = build_sender(config)?;
    Ok(NotificationService::new(
        sender,
        TemplateRenderer::new(),
        config.dispatch_settings(),
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn noop_config() -> NotificationConfig {
        NotificationConfig::from_lookup(|key| {
            let value = match key {
                "NOTIFICATION_BACKEND" => "noop",
                "NOTIFICATION_SENDER_ADDRESS" => "noreply@x.com",
                "NOTIFICATION_SUPPORT_ADDRESS" => "support@x.com",
                "PUBLISHER_PANEL_URL" => "https://panel.example",
                _ => return None,
            };
            Some(value.to_string())
        })
        .unwrap()
    }

    #[test]
    fn noopバックエンドではnoop送信を作成する() {
        let sender = build_sender(&noop_config()).unwrap();
        assert_eq!(sender.name(), "noop");
    }

    #[tokio::test]
    async fn smtpバックエンドではsmtp送信を作成する() {
        let config = NotificationConfig::from_lookup(|key| {
            let value = match key {
                "SMTP_HOST" => "smtp.example.com",
                "SMTP_USERNAME" => "mailer",
                "SMTP_PASSWORD" => "secret",
                "NOTIFICATION_SENDER_ADDRESS" => "noreply@x.com",
                "NOTIFICATION_SUPPORT_ADDRESS" => "support@x.com",
                "PUBLISHER_PANEL_URL" => "https://panel.example",
                _ => return None,
            };
            Some(value.to_string())
        })
        .unwrap();

        let sender = build_sender(&config).unwrap();
        assert_eq!(sender.name(), "smtp");
    }

    #[test]
    fn smtp設定が欠けていれば送信失敗ではなく初期化失敗になる() {
        let mut config = noop_config();
        config.backend = NotificationBackend::Smtp;

        assert!(matches!(
            build_sender(&config),
            Err(NotificationError::TransportSetup(_))
        ));
    }

    #[test]
    fn init_observabilityは二回目の呼び出しでは登録しない() {
        let config = noop_config();

        init_observability(&config);

        assert!(!init_observability(&config));
    }

    #[tokio::test]
    async fn build_serviceでディスパッチできるサービスを作成する() {
        use policy_notify_domain::{policy_request::NotificationRequest, user::UserId};

        let service = build_service(&noop_config()).unwrap();
        let outcome = service.dispatch(&NotificationRequest::new(UserId::new())).await;

        // 申請者が未登録なので中止される
        assert!(!outcome.is_success());
        assert_eq!(outcome.sent(), 0);
    }
}
