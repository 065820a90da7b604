//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! 通知ディスパッチの結果を `jq` で追えるよう、ログフィールドの命名規約と
//! ヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## エラーコンテキスト
//!
//! `tracing::error!` / `tracing::warn!` に `error.category` + `error.kind` を直接追加する。
//! 定数は [`error`] モジュールで提供。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用する。JSON 出力ではフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` を付与し、`tracing::info!` レベルで出力する。
/// 呼び出し側のクレートは `tracing` に依存している必要がある。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: [`event::category`] の定数
/// - `event.action`: [`event::action`] の定数
/// - `event.result`: [`event::result`] の定数
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベントアクション
    pub mod action {
        /// 1 通のメールがトランスポートに受理された
        pub const NOTIFICATION_SENT: &str = "notification.sent";
        /// 1 通のメールが送信できなかった（宛先解決失敗を含む）
        pub const NOTIFICATION_FAILED: &str = "notification.failed";
        /// 1 回のディスパッチが完了した（集約結果）
        pub const NOTIFICATION_DISPATCHED: &str = "notification.dispatched";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const POLICY_REQUEST: &str = "policy_request";
        pub const EMAIL_MESSAGE: &str = "email_message";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 設定・入力データの不備
        pub const INPUT: &str = "input";
        /// 外部サービス呼び出し（SMTP サーバー）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const USER_LOOKUP: &str = "user_lookup";
        pub const ADDRESS: &str = "address";
        pub const TEMPLATE: &str = "template";
        pub const TRANSPORT: &str = "transport";
        /// 送信トランスポートの構築（起動時の設定不備）
        pub const TRANSPORT_SETUP: &str = "transport_setup";
    }
}
