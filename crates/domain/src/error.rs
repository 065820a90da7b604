//! # ドメイン層エラー定義
//!
//! 値オブジェクトの生成時に発生するルール違反を表現するエラー型。
//!
//! 通知の送信処理で発生するエラーは [`crate::notification::NotificationError`] が担う。
//! こちらは「そもそも値として成立しない」入力（空のメールアドレス等）専用。
//!
//! ## 使用例
//!
//! ```rust
//! use policy_notify_domain::DomainError;
//!
//! fn validate_name(name: &str) -> Result<(), DomainError> {
//!     if name.is_empty() {
//!         return Err(DomainError::Validation("名前は必須です".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_name("").is_err());
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がルールに違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - 必須フィールドが未入力
    /// - 文字数制限の超過
    /// - 不正なフォーマット
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
