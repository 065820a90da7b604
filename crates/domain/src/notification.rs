//! # 通知
//!
//! ポリシー申請通知メールと、その送信結果に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`ComposedMessage`] | 通知メール | リソース 1 件・提供者 1 人あたり 1 通 |
//! | [`SendReceipt`] | 受理記録 | トランスポートがメールを受け付けた証跡 |
//! | [`MessageDelivery`] | 送信結果 | 1 通ごとの成否 |
//! | [`DispatchOutcome`] | ディスパッチ結果 | 1 回のディスパッチにつき 1 つだけ決まる集約結果 |
//!
//! ## 設計方針
//!
//! - **集約は畳み込みで決める**: 送信完了のたびに共有の結果オブジェクトを書き換えるのではなく、
//!   全送信の結果を集めてから [`DispatchOutcome::aggregate`] で一度だけ決定する。
//!   二重完了という状態がそもそも存在しない
//! - **最初の失敗を返す**: 失敗が複数あっても、呼び出し側に見せる理由は
//!   リソース順で最初のもの。残りはログにのみ出す

use chrono::{DateTime, Utc};
use strum::IntoStaticStr;
use thiserror::Error;

use crate::user::UserId;

/// 件名の接頭辞。後ろにカタログ ID が続く
pub const SUBJECT_PREFIX: &str = "Request for policy for ";

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// ユーザーディレクトリに ID が存在しない
    #[error("ユーザー情報が見つかりません: {0}")]
    UnknownUser(UserId),

    /// メールアドレスをメールボックスとして解釈できない
    #[error("メールアドレスが不正: {0}")]
    InvalidAddress(String),

    /// メール送信に失敗（トランスポートが返した原因を保持する）
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートの構築に失敗
    #[error("テンプレートの構築に失敗: {0}")]
    TemplateFailed(String),

    /// 送信トランスポートを構築できない（設定の不備など。送信は試みていない）
    #[error("送信トランスポートの初期化に失敗: {0}")]
    TransportSetup(String),
}

/// 送信結果の種別
///
/// ログの `notification.status` フィールドに出力する値。
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryStatus {
    /// トランスポートに受理された
    Sent,
    /// 宛先解決またはトランスポートで失敗した
    Failed,
}

/// 通知メール
///
/// ディスパッチ 1 回の中で作られ、送信後に捨てられる。永続化はしない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    /// 送信元メールアドレス
    pub from:    String,
    /// 送信先（提供者）メールアドレス
    pub to:      String,
    /// CC（サポート窓口が先頭、続いて代理人）
    pub cc:      Vec<String>,
    /// 件名
    pub subject: String,
    /// プレーンテキスト本文
    pub body:    String,
}

impl ComposedMessage {
    /// カタログ ID から件名を組み立てる
    pub fn subject_for(catalog_id: &str) -> String {
        format!("{SUBJECT_PREFIX}{catalog_id}")
    }
}

/// 受理記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// SMTP サーバーが応答に含めたメッセージ ID 等（無い場合もある）
    pub message_id:  Option<String>,
    /// 受理された日時
    pub accepted_at: DateTime<Utc>,
}

impl SendReceipt {
    pub fn new(message_id: Option<String>, accepted_at: DateTime<Utc>) -> Self {
        Self {
            message_id,
            accepted_at,
        }
    }
}

/// リソース 1 件分の送信結果
#[derive(Debug)]
pub struct MessageDelivery {
    /// 対象リソースのカタログ ID
    pub catalog_id: String,
    /// 送信先。宛先解決前に失敗した場合は `None`
    pub recipient:  Option<String>,
    /// 成否
    pub result:     Result<SendReceipt, NotificationError>,
}

impl MessageDelivery {
    pub fn status(&self) -> DeliveryStatus {
        match self.result {
            Ok(_) => DeliveryStatus::Sent,
            Err(_) => DeliveryStatus::Failed,
        }
    }
}

/// ディスパッチ結果
///
/// ディスパッチ 1 回につきちょうど 1 つ作られる。
#[derive(Debug)]
pub enum DispatchOutcome {
    /// すべてのメールが受理された（リソースが 0 件の場合も含む）
    Delivered { receipts: Vec<SendReceipt> },
    /// 1 通以上が失敗した、またはディスパッチ自体を開始できなかった
    Failed {
        /// 最初に見つかった失敗の理由
        reason: NotificationError,
        /// 受理された通数
        sent:   usize,
        /// 失敗した通数
        failed: usize,
    },
}

impl DispatchOutcome {
    /// メールを 1 通も送らずに失敗した結果
    pub fn aborted(reason: NotificationError) -> Self {
        Self::Failed {
            reason,
            sent: 0,
            failed: 0,
        }
    }

    /// 送信結果の集合から集約結果を決定する
    ///
    /// `deliveries` の並び順（= リソース順）で最初の失敗を理由にする。
    /// 完了順には依存しない。
    pub fn aggregate(deliveries: Vec<MessageDelivery>) -> Self {
        let mut receipts = Vec::with_capacity(deliveries.len());
        let mut first_error = None;
        let mut failed = 0;

        for delivery in deliveries {
            match delivery.result {
                Ok(receipt) => receipts.push(receipt),
                Err(e) => {
                    failed += 1;
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            None => Self::Delivered { receipts },
            Some(reason) => Self::Failed {
                reason,
                sent: receipts.len(),
                failed,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// 受理された通数
    pub fn sent(&self) -> usize {
        match self {
            Self::Delivered { receipts } => receipts.len(),
            Self::Failed { sent, .. } => *sent,
        }
    }

    /// 失敗理由（成功時は `None`）
    pub fn failure_reason(&self) -> Option<&NotificationError> {
        match self {
            Self::Delivered { .. } => None,
            Self::Failed { reason, .. } => Some(reason),
        }
    }

    /// `?` で扱いたい呼び出し側向けに、送信通数か最初の失敗理由へ変換する
    pub fn into_result(self) -> Result<usize, NotificationError> {
        match self {
            Self::Delivered { receipts } => Ok(receipts.len()),
            Self::Failed { reason, .. } => Err(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn delivered(catalog_id: &str) -> MessageDelivery {
        MessageDelivery {
            catalog_id: catalog_id.to_string(),
            recipient:  Some("p@x.com".to_string()),
            result:     Ok(SendReceipt::new(Some(format!("id-{catalog_id}")), Utc::now())),
        }
    }

    fn failed(catalog_id: &str, cause: &str) -> MessageDelivery {
        MessageDelivery {
            catalog_id: catalog_id.to_string(),
            recipient:  Some("p@x.com".to_string()),
            result:     Err(NotificationError::SendFailed(cause.to_string())),
        }
    }

    #[test]
    fn test_件名はカタログidを接尾に持つ() {
        assert_eq!(
            ComposedMessage::subject_for("cat123"),
            "Request for policy for cat123"
        );
    }

    #[test]
    fn test_全件成功ならdeliveredになる() {
        let outcome = DispatchOutcome::aggregate(vec![delivered("a"), delivered("b")]);

        assert!(outcome.is_success());
        assert_eq!(outcome.sent(), 2);
        assert!(outcome.failure_reason().is_none());
        assert_eq!(outcome.into_result().unwrap(), 2);
    }

    #[test]
    fn test_リソース0件はdeliveredになる() {
        let outcome = DispatchOutcome::aggregate(vec![]);
        assert!(outcome.is_success());
        assert_eq!(outcome.sent(), 0);
    }

    #[test]
    fn test_複数失敗しても結果は1つで理由は最初の失敗になる() {
        let outcome = DispatchOutcome::aggregate(vec![
            delivered("a"),
            failed("b", "first"),
            failed("c", "second"),
        ]);

        let DispatchOutcome::Failed {
            reason,
            sent,
            failed,
        } = outcome
        else {
            panic!("Failed になるはず");
        };
        assert_eq!(sent, 1);
        assert_eq!(failed, 2);
        assert_eq!(reason.to_string(), "メール送信に失敗: first");
    }

    #[test]
    fn test_abortedは送信数0で失敗になる() {
        let id = UserId::new();
        let outcome = DispatchOutcome::aborted(NotificationError::UnknownUser(id.clone()));

        assert!(!outcome.is_success());
        assert_eq!(outcome.sent(), 0);
        assert!(matches!(
            outcome.into_result(),
            Err(NotificationError::UnknownUser(actual)) if actual == id
        ));
    }

    #[test]
    fn test_delivery_statusの文字列表現() {
        assert_eq!(delivered("a").status().to_string(), "sent");
        let status: &str = failed("a", "x").status().into();
        assert_eq!(status, "failed");
    }
}
