//! # Observability 基盤
//!
//! 通知ディスパッチを組み込むプロセス向けのトレーシング初期化。
//!
//! ## 設計方針
//!
//! - **設定値は呼び出し側が渡す**: `LOG_FORMAT` の読み取りと検証は service の設定読み込みで行い、
//!   ここでは環境変数を直接読まない（`RUST_LOG` のみ例外）
//! - **二重初期化を許容する**: ホストアプリが先に subscriber を登録していればそれを優先する
//!
//! subscriber の構築は `observability` feature を有効にしたときのみコンパイルされる。

use std::{fmt, str::FromStr};

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_ENV_FILTER: &str = "info,policy_notify=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 行 1 イベントの JSON（本番環境向け）
    Json,
    /// 人間が読みやすい形式（開発環境向け）
    #[default]
    Pretty,
}

/// 未知のログ形式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLogFormat(pub String);

impl fmt::Display for UnknownLogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "未知のログ形式 {:?}（json / pretty）", self.0)
    }
}

impl std::error::Error for UnknownLogFormat {}

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(UnknownLogFormat(other.to_string())),
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// 起動ログに出すサービス名
    pub service_name:   String,
    pub log_format:     LogFormat,
    /// `RUST_LOG` が無いときに使うフィルタ
    pub default_filter: String,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
            default_filter: DEFAULT_ENV_FILTER.to_string(),
        }
    }

    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }
}

/// グローバル subscriber を登録する
///
/// この呼び出しで登録できた場合に `true`。既に登録済みなら何もせず `false` を返す。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) -> bool {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_ENV_FILTER));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            service = %config.service_name,
            log_format = ?config.log_format,
            filter = %config.default_filter,
            "トレーシングを初期化しました"
        );
    }
    installed
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_ログ形式は小文字の名前だけを受け付ける() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert_eq!(
            "JSON".parse::<LogFormat>(),
            Err(UnknownLogFormat("JSON".to_string()))
        );
    }

    #[test]
    fn test_既定フィルタは上書きできる() {
        let config = TracingConfig::new("policy-notify", LogFormat::Json);
        assert_eq!(config.default_filter, DEFAULT_ENV_FILTER);

        let config = config.with_default_filter("warn");
        assert_eq!(config.default_filter, "warn");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[cfg(feature = "observability")]
    #[test]
    fn test_二回目の初期化は登録せずfalseを返す() {
        let config = TracingConfig::new("test", LogFormat::Pretty);
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
