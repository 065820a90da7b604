//! # PolicyNotify ドメイン層
//!
//! ポリシー申請通知の中核となるドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: 識別子を持たない不変オブジェクト（例: [`user::Email`]）
//! - **ドメインエラー**: ルール違反と送信失敗をそれぞれ型で表現する
//! - **I/O を持たない**: SMTP やユーザー検索には一切依存しない
//!
//! ## 依存関係の方向
//!
//! ```text
//! service → infra → domain
//!    ↘________________↗
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - 値オブジェクト生成時のエラー
//! - [`user`] - ユーザー ID・メールアドレス・ユーザー情報
//! - [`policy_request`] - 通知リクエストと申請対象リソース
//! - [`notification`] - 通知メール・送信結果・ディスパッチ結果
//!
//! ## 使用例
//!
//! ```rust
//! use policy_notify_domain::{
//!     policy_request::{NotificationRequest, ResourceItem},
//!     user::UserId,
//! };
//!
//! let owner = UserId::new();
//! let request = NotificationRequest::new(UserId::new())
//!     .with_item(ResourceItem::new("cat123", owner));
//! assert_eq!(request.items.len(), 1);
//! ```

#[macro_use]
mod macros;

pub mod error;
pub mod notification;
pub mod policy_request;
pub mod user;

pub use error::DomainError;
