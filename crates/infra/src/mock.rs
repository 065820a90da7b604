//! # テスト用モック送信
//!
//! ディスパッチのテストで使用するインメモリの送信実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! policy-notify-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::HashSet,
    sync::{
        Arc,
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use policy_notify_domain::notification::{ComposedMessage, NotificationError, SendReceipt};

use crate::notification::NotificationSender;

// ===== MockNotificationSender =====

/// 送信されたメールを記録するモック
///
/// - `fail_for` で指定した宛先（To）への送信は `SendFailed` を返す
/// - `with_delay` を指定すると送信ごとに待機し、同時実行数の計測に使える
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    submitted:          Arc<Mutex<Vec<ComposedMessage>>>,
    failing_recipients: Arc<Mutex<HashSet<String>>>,
    delay:              Option<Duration>,
    in_flight:          Arc<AtomicUsize>,
    max_in_flight:      Arc<AtomicUsize>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 送信 1 回ごとの待機時間を設定する
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 指定した宛先への送信を失敗させる
    pub fn fail_for(self, recipient: impl Into<String>) -> Self {
        self.failing_recipients
            .lock()
            .unwrap()
            .insert(recipient.into());
        self
    }

    /// 送信を試みたメール（成否を問わず、呼び出し順）
    pub fn submitted(&self) -> Vec<ComposedMessage> {
        self.submitted.lock().unwrap().clone()
    }

    /// 観測された最大同時送信数
    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &ComposedMessage) -> Result<SendReceipt, NotificationError> {
        let sequence = {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(email.clone());
            submitted.len()
        };

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let should_fail = self.failing_recipients.lock().unwrap().contains(&email.to);
        if should_fail {
            return Err(NotificationError::SendFailed(format!(
                "550 mailbox unavailable: {}",
                email.to
            )));
        }

        Ok(SendReceipt::new(Some(format!("mock-{sequence}")), Utc::now()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
