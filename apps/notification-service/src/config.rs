//! # 通知サービス設定
//!
//! 環境変数から通知ディスパッチの設定を読み込み、検証する。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `NOTIFICATION_BACKEND` | No | `smtp`（デフォルト）/ `noop` |
//! | `SMTP_HOST` | smtp 時 **Yes** | SMTP サーバーのホスト名 |
//! | `SMTP_PORT` | No | ポート番号（デフォルト: `587`） |
//! | `SMTP_USERNAME` | smtp 時 **Yes** | ログインユーザー名 |
//! | `SMTP_PASSWORD` | smtp 時 **Yes** | ログインパスワード |
//! | `SMTP_CONNECT_TIMEOUT_MS` | No | 接続タイムアウト（デフォルト: `5000`） |
//! | `SMTP_IDLE_TIMEOUT_SECS` | No | プールのアイドルタイムアウト（デフォルト: `10`） |
//! | `SMTP_POOL_MAX_SIZE` | No | プール接続数の上限（デフォルト: `10`） |
//! | `SMTP_ALLOW_RECIPIENT_ERRORS` | No | 不正な CC を除外して送るか（デフォルト: `true`） |
//! | `NOTIFICATION_SENDER_ADDRESS` | **Yes** | 送信元アドレス |
//! | `NOTIFICATION_SUPPORT_ADDRESS` | **Yes** | 全メールの CC に入るサポート窓口 |
//! | `PUBLISHER_PANEL_URL` | **Yes** | 承認・却下を行う提供者パネルの URL |
//! | `NOTIFICATION_MAX_IN_FLIGHT` | No | 1 ディスパッチ内の同時送信数（デフォルト: `32`） |
//! | `LOG_FORMAT` | No | `pretty`（デフォルト）/ `json` |

use std::{env, fmt::Display, str::FromStr, time::Duration};

use policy_notify_domain::user::Email;
use policy_notify_infra::notification::SmtpConfig;
use policy_notify_shared::observability::{LogFormat, TracingConfig};
use thiserror::Error;

use crate::usecase::notification::DispatchSettings;

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_MAX_IN_FLIGHT: usize = 32;
const SERVICE_NAME: &str = "policy-notify";

/// 設定の読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値が不正
    #[error("{key} の値が不正です: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// 送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationBackend {
    /// SMTP サーバー経由で送信
    Smtp,
    /// 送信しない（ログ出力のみ）
    Noop,
}

/// 通知機能の設定
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// 送信バックエンド
    pub backend:             NotificationBackend,
    /// SMTP 接続設定（`backend` が `Smtp` のときのみ `Some`）
    pub smtp:                Option<SmtpConfig>,
    /// 送信元メールアドレス
    pub sender_address:      Email,
    /// サポート窓口のメールアドレス
    pub support_address:     Email,
    /// 提供者パネルの URL（本文に埋め込む）
    pub publisher_panel_url: String,
    /// 1 ディスパッチ内の同時送信数の上限
    pub max_in_flight:       usize,
    /// ログ出力形式
    pub log_format:          LogFormat,
}

impl NotificationConfig {
    /// `.env` を読み込んだうえで環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー検索関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = Source { lookup };

        let backend = source.parse_or("NOTIFICATION_BACKEND", NotificationBackend::Smtp)?;

        let smtp = match backend {
            NotificationBackend::Smtp => Some(SmtpConfig {
                host: source.required("SMTP_HOST")?,
                port: source.parse_or("SMTP_PORT", DEFAULT_SMTP_PORT)?,
                username: source.required("SMTP_USERNAME")?,
                password: source.required("SMTP_PASSWORD")?,
                connect_timeout: Duration::from_millis(
                    source.parse_or("SMTP_CONNECT_TIMEOUT_MS", DEFAULT_CONNECT_TIMEOUT_MS)?,
                ),
                idle_timeout: Duration::from_secs(
                    source.parse_or("SMTP_IDLE_TIMEOUT_SECS", DEFAULT_IDLE_TIMEOUT_SECS)?,
                ),
                pool_max_size: source.positive_or("SMTP_POOL_MAX_SIZE", DEFAULT_POOL_MAX_SIZE)?,
                allow_recipient_errors: source.flag_or("SMTP_ALLOW_RECIPIENT_ERRORS", true)?,
            }),
            NotificationBackend::Noop => None,
        };

        Ok(Self {
            backend,
            smtp,
            sender_address: source.email("NOTIFICATION_SENDER_ADDRESS")?,
            support_address: source.email("NOTIFICATION_SUPPORT_ADDRESS")?,
            publisher_panel_url: source.url("PUBLISHER_PANEL_URL")?,
            max_in_flight: source.positive_or("NOTIFICATION_MAX_IN_FLIGHT", DEFAULT_MAX_IN_FLIGHT)?,
            log_format: source.parse_or("LOG_FORMAT", LogFormat::default())?,
        })
    }

    /// トレーシング初期化の設定を取り出す
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig::new(SERVICE_NAME, self.log_format)
    }

    /// ディスパッチ処理に渡す設定を取り出す
    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            from_address:        self.sender_address.as_str().to_string(),
            support_address:     self.support_address.as_str().to_string(),
            publisher_panel_url: self.publisher_panel_url.clone(),
            max_in_flight:       self.max_in_flight,
        }
    }
}

/// キー検索と値の変換をまとめたヘルパー
struct Source<F> {
    lookup: F,
}

impl<F> Source<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parse_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: format!("{raw:?}: {e}"),
            }),
        }
    }

    fn positive_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + PartialOrd + Default,
        T::Err: Display,
    {
        let value = self.parse_or(key, default)?;
        if value <= T::default() {
            return Err(ConfigError::Invalid {
                key,
                reason: "1 以上である必要があります".to_string(),
            });
        }
        Ok(value)
    }

    fn flag_or(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key).as_deref() {
            None => Ok(default),
            Some("true" | "1") => Ok(true),
            Some("false" | "0") => Ok(false),
            Some(other) => Err(ConfigError::Invalid {
                key,
                reason: format!("{other:?} は true / false / 1 / 0 のいずれかである必要があります"),
            }),
        }
    }

    fn email(&self, key: &'static str) -> Result<Email, ConfigError> {
        Email::new(self.required(key)?).map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
    }

    /// URL として解釈できることだけを確認し、値は入力のまま保持する
    fn url(&self, key: &'static str) -> Result<String, ConfigError> {
        let raw = self.required(key)?;
        let parsed = url::Url::parse(&raw).map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key,
                reason: format!("http / https 以外のスキーム: {}", parsed.scheme()),
            });
        }
        Ok(raw)
    }
}
