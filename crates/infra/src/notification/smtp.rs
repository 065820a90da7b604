//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! STARTTLS 必須・ログイン必須で SMTP リレーに接続し、接続はプールして再利用する。

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, header::ContentType},
    transport::smtp::{PoolConfig, authentication::Credentials},
};
use policy_notify_domain::notification::{ComposedMessage, NotificationError, SendReceipt};

use super::NotificationSender;

/// SMTP 接続設定
///
/// 値の検証は設定読み込み側で済ませてから渡すこと。
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP サーバーのホスト名
    pub host: String,
    /// SMTP サーバーのポート番号（STARTTLS なので通常 587）
    pub port: u16,
    /// ログインユーザー名
    pub username: String,
    /// ログインパスワード
    pub password: String,
    /// 接続・コマンド応答のタイムアウト
    pub connect_timeout: Duration,
    /// プール内のアイドル接続を閉じるまでの時間
    pub idle_timeout: Duration,
    /// プールする接続数の上限
    pub pool_max_size: u32,
    /// CC アドレスの不備を許容するか
    ///
    /// `true` なら解釈できない CC を警告付きで除外して送信を続ける。
    /// `false` ならそのメール全体を失敗にする。To は常に厳格に扱う。
    pub allow_recipient_errors: bool,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("connect_timeout", &self.connect_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("pool_max_size", &self.pool_max_size)
            .field("allow_recipient_errors", &self.allow_recipient_errors)
            .finish()
    }
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
/// トランスポートは内部に接続プールを持ち、並行する送信で共有される。
pub struct SmtpNotificationSender {
    transport:              AsyncSmtpTransport<Tokio1Executor>,
    allow_recipient_errors: bool,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// この時点では接続しない。最初の送信時にプールが接続を張る。
    /// プールがバックグラウンドタスクを起動するため、Tokio ランタイム上で呼び出すこと。
    pub fn new(config: &SmtpConfig) -> Result<Self, NotificationError> {
        let pool = PoolConfig::new()
            .max_size(config.pool_max_size)
            .idle_timeout(config.idle_timeout);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotificationError::TransportSetup(format!("SMTP リレーの作成に失敗: {e}")))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.connect_timeout))
            .pool_config(pool)
            .build();

        tracing::debug!(
            host = %config.host,
            port = config.port,
            pool_max_size = config.pool_max_size,
            "SMTP トランスポートを作成しました"
        );

        Ok(Self {
            transport,
            allow_recipient_errors: config.allow_recipient_errors,
        })
    }
}

/// 通知メールを lettre のメッセージに変換する
fn build_message(
    email: &ComposedMessage,
    allow_recipient_errors: bool,
) -> Result<Message, NotificationError> {
    let from: Mailbox = email.from.parse().map_err(|e| {
        NotificationError::InvalidAddress(format!("送信元アドレス不正 {}: {e}", email.from))
    })?;
    let to: Mailbox = email.to.parse().map_err(|e| {
        NotificationError::InvalidAddress(format!("宛先アドレス不正 {}: {e}", email.to))
    })?;

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(&email.subject);

    for cc in &email.cc {
        match cc.parse::<Mailbox>() {
            Ok(mailbox) => builder = builder.cc(mailbox),
            Err(e) if allow_recipient_errors => {
                tracing::warn!(
                    cc = %cc,
                    error = %e,
                    "CC アドレスが不正なため除外して送信します"
                );
            }
            Err(e) => {
                return Err(NotificationError::InvalidAddress(format!(
                    "CC アドレス不正 {cc}: {e}"
                )));
            }
        }
    }

    builder
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &ComposedMessage) -> Result<SendReceipt, NotificationError> {
        let message = build_message(email, self.allow_recipient_errors)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        let message_id = response.message().next().map(str::to_string);

        Ok(SendReceipt::new(message_id, Utc::now()))
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: "secret".to_string(),
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(10),
            pool_max_size: 10,
            allow_recipient_errors: true,
        }
    }

    fn make_email(cc: Vec<&str>) -> ComposedMessage {
        ComposedMessage {
            from:    "noreply@x.com".to_string(),
            to:      "p@x.com".to_string(),
            cc:      cc.into_iter().map(String::from).collect(),
            subject: "Request for policy for cat123".to_string(),
            body:    "本文".to_string(),
        }
    }

    fn envelope_recipients(message: &Message) -> Vec<String> {
        message
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmtpNotificationSender>();
    }

    #[tokio::test]
    async fn newは接続せずにインスタンスを作成できる() {
        let sender = SmtpNotificationSender::new(&make_config()).unwrap();
        assert_eq!(sender.name(), "smtp");
    }

    #[test]
    fn debug出力でパスワードを隠す() {
        let output = format!("{:?}", make_config());
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("secret"));
    }

    #[test]
    fn 宛先はtoの後にccが指定順で並ぶ() {
        let message =
            build_message(&make_email(vec!["support@x.com", "d@x.com"]), false).unwrap();

        assert_eq!(
            envelope_recipients(&message),
            vec!["p@x.com", "support@x.com", "d@x.com"]
        );
    }

    #[test]
    fn 不正なccは許容設定なら除外して続行する() {
        let message =
            build_message(&make_email(vec!["support@x.com", "not-an-email"]), true).unwrap();

        assert_eq!(
            envelope_recipients(&message),
            vec!["p@x.com", "support@x.com"]
        );
    }

    #[test]
    fn 不正なccは許容しない設定ならエラーになる() {
        let result = build_message(&make_email(vec!["not-an-email"]), false);
        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[test]
    fn 不正なtoは許容設定でもエラーになる() {
        let mut email = make_email(vec![]);
        email.to = "not-an-email".to_string();

        let result = build_message(&email, true);
        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[test]
    fn 件名と本文がメッセージに含まれる() {
        let message = build_message(&make_email(vec![]), false).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("Subject: Request for policy for cat123"));
    }
}
