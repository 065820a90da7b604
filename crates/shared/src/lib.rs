//! # PolicyNotify 共有ユーティリティ
//!
//! ポリシー申請通知の各クレートから使われる共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - service クレートと、通知ディスパッチを組み込むホストプロセスから使われる
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は feature で必要な分だけ有効化する

pub mod event_log;
pub mod observability;
