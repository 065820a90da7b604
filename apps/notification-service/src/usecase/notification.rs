//! # 通知ユースケース
//!
//! ポリシー申請に伴うメール通知の宛先解決・本文生成・送信・集約を統合する。
//!
//! ## モジュール構成
//!
//! - [`recipient_resolver`] - リソースごとの To / CC の決定
//! - [`template_renderer`] - `${NAME}` プレースホルダーによる本文生成
//! - [`service`] - 宛先解決 + レンダリング + 並行送信 + 集約の統合サービス

pub mod recipient_resolver;
pub mod service;
pub mod template_renderer;

pub use recipient_resolver::{Recipients, resolve_recipients};
pub use service::{DispatchSettings, NotificationService};
pub use template_renderer::{PolicyRequestPlaceholders, TemplateRenderer};
