//! # PolicyNotify インフラ層
//!
//! 外部システム（SMTP サーバー）との通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! ドメイン層で定義されたメッセージ型を受け取り、実際の送信手段へ橋渡しする。
//! 送信手段の詳細（lettre、接続プール、TLS）はこのクレートの中に閉じ込める。
//!
//! ## 依存関係
//!
//! ```text
//! service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`notification`] - メール送信トレイトと SMTP / Noop 実装
//! - `mock` - テスト用の記録付き送信（`test-utils` feature）

pub mod notification;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
