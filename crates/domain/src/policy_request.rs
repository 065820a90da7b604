//! # ポリシー申請通知リクエスト
//!
//! 利用者がデータアクセスポリシーを申請したときに、ポリシー管理ワークフローから
//! 通知ディスパッチへ渡される入力をまとめる。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`NotificationRequest`] | 通知リクエスト | 1 回のディスパッチの入力一式 |
//! | [`ResourceItem`] | 申請対象リソース | カタログ ID と所有者（提供者）の組 |
//!
//! ## 設計方針
//!
//! - **順序を持つコレクション**: `items` は `Vec`、代理人リストも `Vec`。
//!   送信順と CC の並びがテストで決定的になる
//! - **構築後は不変**: ディスパッチ中に書き換えることはない
//! - **ユーザー検索は済んでいる前提**: `user_directory` は呼び出し側が埋める

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::user::{UserId, UserInfo};

/// 申請対象リソース
///
/// 利用者がアクセスを求めているリソース 1 件。1 件につき 1 通のメールを送る。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceItem {
    /// カタログ上のリソース ID（件名と本文に埋め込まれる）
    pub catalog_id: String,
    /// リソースの所有者（提供者）
    pub owner_id:   UserId,
}

impl ResourceItem {
    pub fn new(catalog_id: impl Into<String>, owner_id: UserId) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            owner_id,
        }
    }
}

/// 通知リクエスト
///
/// # 不変条件（呼び出し側の責務）
///
/// - `consumer_id` と、全 `items` の `owner_id`、および
///   `owner_to_delegates` に現れる全代理人 ID が `user_directory` に存在する
///
/// 満たされない場合はディスパッチ時に `NotificationError::UnknownUser` になる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// ポリシーを申請した利用者
    pub consumer_id:        UserId,
    /// 申請対象リソース（この順に送信する）
    pub items:              Vec<ResourceItem>,
    /// ID → ユーザー情報
    #[serde(default)]
    pub user_directory:     HashMap<UserId, UserInfo>,
    /// 所有者 ID → 代理人 ID（CC に並べる順）
    #[serde(default)]
    pub owner_to_delegates: HashMap<UserId, Vec<UserId>>,
}

impl NotificationRequest {
    /// 空のリクエストを作成する
    ///
    /// 対象リソースやユーザー情報は `with_*` で追加する。
    pub fn new(consumer_id: UserId) -> Self {
        Self {
            consumer_id,
            items: Vec::new(),
            user_directory: HashMap::new(),
            owner_to_delegates: HashMap::new(),
        }
    }

    pub fn with_item(mut self, item: ResourceItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_user(mut self, id: UserId, info: UserInfo) -> Self {
        self.user_directory.insert(id, info);
        self
    }

    /// 所有者の代理人リストを設定する（既存の設定は置き換える）
    pub fn with_delegates(mut self, owner_id: UserId, delegates: Vec<UserId>) -> Self {
        self.owner_to_delegates.insert(owner_id, delegates);
        self
    }
}
