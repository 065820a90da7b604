//! # PolicyNotify 通知サービス
//!
//! 利用者がデータアクセスポリシーを申請したときに、対象リソースの提供者
//! （所有者と代理人）へ承認依頼メールを送る。
//!
//! ## 処理の流れ
//!
//! ```text
//! NotificationRequest
//!   → 申請者の表示名・アドレスを引く
//!   → リソースごとに 宛先解決 → 本文レンダリング → 送信（並行）
//!   → DispatchOutcome に集約
//! ```
//!
//! ## モジュール構成
//!
//! - [`config`] - 環境変数からの設定読み込みと検証
//! - [`bootstrap`] - 設定から送信実装とサービスを組み立てる
//! - [`usecase`] - 通知ディスパッチのユースケース
//!
//! ## 使用例
//!
//! ```rust,no_run
//! use policy_notify_domain::{policy_request::NotificationRequest, user::UserId};
//! use policy_notify_service::{bootstrap, config::NotificationConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = NotificationConfig::from_env()?;
//! bootstrap::init_observability(&config);
//! let service = bootstrap::build_service(&config)?;
//!
//! let request = NotificationRequest::new(UserId::new());
//! let sent = service.dispatch(&request).await.into_result()?;
//! tracing::info!(sent, "通知を送信しました");
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod config;
pub mod usecase;
