//! # テンプレートレンダラー
//!
//! 通知メール本文のテンプレートに `${NAME}` 形式のプレースホルダーを埋め込む。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: 既定テンプレートはバイナリに埋め込まれる
//! - **1 パス置換**: 置換後の値を再走査しない。値に `${...}` が含まれていても展開されない
//! - **未知のトークンはそのまま残す**: テンプレート側が任意のトークンを持てるようにする

use std::{collections::HashMap, sync::LazyLock};

use policy_notify_domain::notification::NotificationError;
use regex::{Captures, Regex};

const DEFAULT_TEMPLATE: &str = include_str!("../../../templates/policy_request.txt");

/// 本文テンプレートで使うプレースホルダー名
pub mod placeholder {
    /// 申請者のフルネーム（名と姓を半角スペース 1 つで連結）
    pub const CONSUMER_NAME: &str = "CONSUMER_NAME";
    /// 申請者のメールアドレス
    pub const CONSUMER_EMAIL: &str = "CONSUMER_EMAIL";
    /// 申請対象のカタログ ID
    pub const REQUESTED_CAT_ID: &str = "REQUESTED_CAT_ID";
    /// 提供者パネルの URL
    pub const PUBLISHER_PANEL_URL: &str = "PUBLISHER_PANEL_URL";
}

/// `${NAME}` 形式のトークン。`NAME` は英数字とアンダースコアからなる 1 文字以上の文字列
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("プレースホルダーの正規表現は固定値")
});

/// テンプレート中のプレースホルダーを置換する
///
/// 形式に合わない `${` や閉じ括弧の無い `${` は文字どおりに残す。
pub fn render(template: &str, placeholders: &HashMap<&str, &str>) -> String {
    TOKEN
        .replace_all(template, |caps: &Captures<'_>| {
            placeholders
                .get(&caps[1])
                .map_or_else(|| caps[0].to_string(), |value| (*value).to_string())
        })
        .into_owned()
}

/// ポリシー申請メール 1 通分の埋め込み値
#[derive(Debug, Clone, Copy)]
pub struct PolicyRequestPlaceholders<'a> {
    pub consumer_name:       &'a str,
    pub consumer_email:      &'a str,
    pub catalog_id:          &'a str,
    pub publisher_panel_url: &'a str,
}

/// テンプレートレンダラー
///
/// ポリシー申請メールの本文テンプレートを保持し、1 通ごとに埋め込みを行う。
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    body_template: String,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// 埋め込み済みの既定テンプレートでレンダラーを作成
    pub fn new() -> Self {
        Self {
            body_template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// 任意のテンプレートでレンダラーを作成
    ///
    /// 空のテンプレートは `TemplateFailed` になる。
    pub fn with_template(template: impl Into<String>) -> Result<Self, NotificationError> {
        let body_template = template.into();
        if body_template.trim().is_empty() {
            return Err(NotificationError::TemplateFailed(
                "本文テンプレートが空です".to_string(),
            ));
        }
        Ok(Self { body_template })
    }

    /// ポリシー申請メールの本文を生成する
    pub fn render_body(&self, values: &PolicyRequestPlaceholders<'_>) -> String {
        let placeholders = HashMap::from([
            (placeholder::CONSUMER_NAME, values.consumer_name),
            (placeholder::CONSUMER_EMAIL, values.consumer_email),
            (placeholder::REQUESTED_CAT_ID, values.catalog_id),
            (placeholder::PUBLISHER_PANEL_URL, values.publisher_panel_url),
        ]);
        render(&self.body_template, &placeholders)
    }
}
