//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（本番・開発）、Noop（通知無効化時）
//! - **共有前提**: 1 つのインスタンスを `Arc` で全ディスパッチが共有する。
//!   SMTP 実装は内部に接続プールを持つ

mod noop;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopNotificationSender;
use policy_notify_domain::notification::{ComposedMessage, NotificationError, SendReceipt};
pub use smtp::{SmtpConfig, SmtpNotificationSender};

/// メール送信トレイト
///
/// 通知基盤の中核。1 回の呼び出しで 1 通を送り、受理されたかどうかを返す。
/// 同時に複数回呼ばれることを前提とする（`&self` で並行に送れること）。
/// リトライはしない。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &ComposedMessage) -> Result<SendReceipt, NotificationError>;

    /// ログ出力用の実装名
    fn name(&self) -> &'static str;
}
