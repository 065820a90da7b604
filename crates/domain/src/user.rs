//! # ユーザー
//!
//! 通知の宛先解決に使うユーザー情報と値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`UserId`] | ユーザー ID | 利用者・提供者・代理人を区別しない共通の識別子 |
//! | [`UserInfo`] | ユーザー情報 | 氏名とメールアドレス。ID 管理サービスから事前に取得済みのもの |
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: UserId は UUID をラップし、型安全性を確保
//! - **バリデーション**: [`Email`] は生成時に形式を検証する
//! - **ルックアップしない**: このクレートは ID 管理サービスを呼ばない。
//!   呼び出し側が [`crate::policy_request::NotificationRequest`] に詰めて渡す
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use policy_notify_domain::user::{Email, UserInfo};
//!
//! let user = UserInfo::new("Jane", "Doe", Email::new("jane@x.com")?);
//! assert_eq!(user.full_name(), "Jane Doe");
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::DomainError;

define_uuid_id! {
    /// ユーザー ID（一意識別子）
    ///
    /// 利用者（consumer）、提供者（provider / owner）、代理人（delegate）の
    /// いずれもこの型で表す。
    pub struct UserId;
}

/// メールアドレス（値オブジェクト）
///
/// 生成時にバリデーションを実行し、不正な値の作成を防ぐ。
/// 配送可能かどうか（MX の存在など）までは検証しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 前後の空白は除去する
    /// - 空文字列ではない
    /// - `local@domain` の形式（`@` はちょうど 1 つ、両側が空でない）
    /// - 空白を含まない
    /// - 最大 255 文字
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(format!(
                "メールアドレスの形式が不正です: {value}"
            )));
        };

        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || value.chars().any(char::is_whitespace)
        {
            return Err(DomainError::Validation(format!(
                "メールアドレスの形式が不正です: {value}"
            )));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "メールアドレスは255文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ユーザー情報
///
/// ユーザーディレクトリ（ID → 情報）の値。
/// 利用者の表示名と、提供者・代理人の宛先アドレスの両方に使う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub first_name: String,
    pub last_name:  String,
    pub email:      Email,
}

impl UserInfo {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, email: Email) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email,
        }
    }

    /// 姓名を半角スペース 1 つで連結した表示名
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("user@example.com")]
    #[case("first.last+tag@sub.example.co.jp")]
    #[case("  padded@example.com  ")]
    fn test_正しい形式のメールアドレスを受け付ける(#[case] input: &str) {
        let email = Email::new(input).unwrap();
        assert_eq!(email.as_str(), input.trim());
    }

    #[rstest]
    #[case("", "空文字列")]
    #[case("   ", "空白のみ")]
    #[case("no-at-sign", "@ なし")]
    #[case("@example.com", "ローカル部なし")]
    #[case("user@", "ドメイン部なし")]
    #[case("a@b@c", "@ が複数")]
    #[case("us er@example.com", "空白を含む")]
    fn test_不正なメールアドレスを拒否する(
        #[case] input: &str,
        #[case] _description: &str,
    ) {
        assert!(Email::new(input).is_err());
    }

    #[test]
    fn test_255文字を超えるメールアドレスを拒否する() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(Email::new(long).is_err());
    }

    #[test]
    fn test_full_nameは姓名を半角スペースで連結する() {
        let user = UserInfo::new("Jane", "Doe", Email::new("jane@x.com").unwrap());
        assert_eq!(user.full_name(), "Jane Doe");
    }

    #[test]
    fn test_user_infoをjsonから復元するときにメールアドレスを検証する() {
        let ok: Result<UserInfo, _> = serde_json::from_str(
            r#"{"first_name":"Jane","last_name":"Doe","email":"jane@x.com"}"#,
        );
        assert_eq!(ok.unwrap().email.as_str(), "jane@x.com");

        let ng: Result<UserInfo, _> = serde_json::from_str(
            r#"{"first_name":"Jane","last_name":"Doe","email":"not-an-email"}"#,
        );
        assert!(ng.is_err());
    }

    #[test]
    fn test_user_idはjson上で素のuuid文字列になる() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
