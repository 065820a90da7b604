//! # 通知ディスパッチサービス
//!
//! 宛先解決 → 本文レンダリング → メール送信 → 集約を統合するサービス。
//!
//! ## 設計方針
//!
//! - **並行送信**: リソースごとのメールは順に組み立てて順に送信を開始し、
//!   最大 `max_in_flight` 通まで応答を待たずに並行させる。1 通完了するごとに次を開始する
//! - **集約は 1 回だけ**: 送信結果は完了順に集め、リソース順に並べ直してから
//!   [`DispatchOutcome::aggregate`] で決定する。完了順には依存しない
//! - **失敗はリソース単位**: 宛先解決や送信の失敗はそのリソースのメールだけを止め、
//!   他のリソースの送信は続ける。申請者が見つからない場合のみ全体を中止する
//! - **依存性注入**: `NotificationSender` は trait で抽象化

use std::sync::Arc;

use futures::{StreamExt, stream};
use policy_notify_domain::{
    notification::{ComposedMessage, DispatchOutcome, MessageDelivery, NotificationError},
    policy_request::{NotificationRequest, ResourceItem},
};
use policy_notify_infra::notification::NotificationSender;
use policy_notify_shared::{
    event_log::{error, event},
    log_business_event,
};

use super::{
    recipient_resolver::{lookup_user, resolve_recipients},
    template_renderer::{PolicyRequestPlaceholders, TemplateRenderer},
};

/// ディスパッチ時に使う固定値
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// 送信元メールアドレス
    pub from_address:        String,
    /// 全メールの CC 先頭に入るサポート窓口
    pub support_address:     String,
    /// 本文に埋め込む提供者パネルの URL
    pub publisher_panel_url: String,
    /// 同時に応答待ちにするメールの上限
    pub max_in_flight:       usize,
}

/// 通知ディスパッチサービス
///
/// 1 つのインスタンスを複数のディスパッチで共有してよい。
/// 送信トランスポート（と接続プール）は `sender` を通じて共有される。
pub struct NotificationService {
    sender:            Arc<dyn NotificationSender>,
    template_renderer: TemplateRenderer,
    settings:          DispatchSettings,
}

/// 申請者の表示情報（ディスパッチ 1 回につき 1 度だけ引く）
struct Consumer<'a> {
    name:  String,
    email: &'a str,
}

impl NotificationService {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        template_renderer: TemplateRenderer,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            sender,
            template_renderer,
            settings,
        }
    }

    /// 通知リクエスト 1 件分のメールを送信し、集約結果を返す
    ///
    /// 申請者がディレクトリに無ければ 1 通も送らずに失敗する。
    /// それ以外の失敗はすべて戻り値の [`DispatchOutcome`] で表し、パニックも `Err` も返さない。
    #[tracing::instrument(
        name = "notification.dispatch",
        skip_all,
        fields(consumer_id = %request.consumer_id, item_count = request.items.len())
    )]
    pub async fn dispatch(&self, request: &NotificationRequest) -> DispatchOutcome {
        let consumer = match lookup_user(&request.user_directory, &request.consumer_id) {
            Ok(info) => Consumer {
                name:  info.full_name(),
                email: info.email.as_str(),
            },
            Err(e) => {
                tracing::error!(
                    error.category = error::category::INPUT,
                    error.kind = error::kind::USER_LOOKUP,
                    error = %e,
                    "申請者が見つからないためディスパッチを中止"
                );
                let outcome = DispatchOutcome::aborted(e);
                log_dispatched(request, &outcome);
                return outcome;
            }
        };

        let mut indexed: Vec<(usize, MessageDelivery)> =
            stream::iter(request.items.iter().enumerate())
                .map(|(index, item)| {
                    let composed = self.compose(item, request, &consumer);
                    let delivery = self.deliver(item, composed);
                    async move { (index, delivery.await) }
                })
                .buffer_unordered(self.settings.max_in_flight.max(1))
                .collect()
                .await;
        indexed.sort_unstable_by_key(|(index, _)| *index);
        let deliveries = indexed.into_iter().map(|(_, delivery)| delivery).collect();

        let outcome = DispatchOutcome::aggregate(deliveries);
        log_dispatched(request, &outcome);
        outcome
    }

    /// リソース 1 件分のメールを組み立てる
    fn compose(
        &self,
        item: &ResourceItem,
        request: &NotificationRequest,
        consumer: &Consumer<'_>,
    ) -> Result<ComposedMessage, NotificationError> {
        let recipients = resolve_recipients(
            item,
            &request.owner_to_delegates,
            &request.user_directory,
            &self.settings.support_address,
        )?;

        let body = self.template_renderer.render_body(&PolicyRequestPlaceholders {
            consumer_name:       &consumer.name,
            consumer_email:      consumer.email,
            catalog_id:          &item.catalog_id,
            publisher_panel_url: &self.settings.publisher_panel_url,
        });

        Ok(ComposedMessage {
            from: self.settings.from_address.clone(),
            to: recipients.to,
            cc: recipients.cc,
            subject: ComposedMessage::subject_for(&item.catalog_id),
            body,
        })
    }

    /// 組み立て済みのメールを送信し、結果をログに残す
    async fn deliver(
        &self,
        item: &ResourceItem,
        composed: Result<ComposedMessage, NotificationError>,
    ) -> MessageDelivery {
        let (recipient, result) = match composed {
            Ok(email) => {
                let result = self.sender.send_email(&email).await;
                (Some(email.to), result)
            }
            Err(e) => (None, Err(e)),
        };

        let delivery = MessageDelivery {
            catalog_id: item.catalog_id.clone(),
            recipient,
            result,
        };
        let status: &str = delivery.status().into();
        let recipient = delivery.recipient.as_deref().unwrap_or("-");

        match &delivery.result {
            Ok(receipt) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.entity_type = event::entity_type::EMAIL_MESSAGE,
                    event.entity_id = %item.catalog_id,
                    event.result = event::result::SUCCESS,
                    notification.status = status,
                    notification.recipient = recipient,
                    notification.sender = self.sender.name(),
                    notification.message_id = receipt.message_id.as_deref().unwrap_or("-"),
                    "通知メール送信成功"
                );
            }
            Err(e) => {
                let (category, kind) = error_context(e);
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.entity_type = event::entity_type::EMAIL_MESSAGE,
                    event.entity_id = %item.catalog_id,
                    event.result = event::result::FAILURE,
                    notification.status = status,
                    notification.recipient = recipient,
                    notification.sender = self.sender.name(),
                    error.category = category,
                    error.kind = kind,
                    error = %e,
                    "通知メール送信失敗"
                );
            }
        }

        delivery
    }
}

/// 送信エラーをログの `error.category` / `error.kind` に対応付ける
fn error_context(e: &NotificationError) -> (&'static str, &'static str) {
    match e {
        NotificationError::UnknownUser(_) => (error::category::INPUT, error::kind::USER_LOOKUP),
        NotificationError::InvalidAddress(_) => (error::category::INPUT, error::kind::ADDRESS),
        NotificationError::TemplateFailed(_) => (error::category::INPUT, error::kind::TEMPLATE),
        NotificationError::SendFailed(_) => {
            (error::category::EXTERNAL_SERVICE, error::kind::TRANSPORT)
        }
        NotificationError::TransportSetup(_) => {
            (error::category::INPUT, error::kind::TRANSPORT_SETUP)
        }
    }
}

fn log_dispatched(request: &NotificationRequest, outcome: &DispatchOutcome) {
    let (result, failed) = match outcome {
        DispatchOutcome::Delivered { .. } => (event::result::SUCCESS, 0),
        DispatchOutcome::Failed { failed, .. } => (event::result::FAILURE, *failed),
    };
    let reason = outcome.failure_reason().map(ToString::to_string);

    log_business_event!(
        event.category = event::category::NOTIFICATION,
        event.action = event::action::NOTIFICATION_DISPATCHED,
        event.entity_type = event::entity_type::POLICY_REQUEST,
        event.entity_id = %request.consumer_id,
        event.result = result,
        notification.sent = outcome.sent(),
        notification.failed = failed,
        error = reason.as_deref().unwrap_or("-"),
        "通知ディスパッチ完了"
    );
}
