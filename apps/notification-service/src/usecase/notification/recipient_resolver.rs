//! # 宛先解決
//!
//! 申請対象リソース 1 件について、To（所有者）と CC（サポート窓口 + 代理人）を決める。
//! 入力だけから決まる純粋関数で、ユーザー検索は呼び出し側が済ませたディレクトリを引くだけ。

use std::collections::HashMap;

use policy_notify_domain::{
    notification::NotificationError,
    policy_request::ResourceItem,
    user::{UserId, UserInfo},
};

/// 解決済みの宛先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients {
    /// 所有者（提供者）のメールアドレス
    pub to: String,
    /// サポート窓口が先頭、続いて代理人を登録順に並べる
    pub cc: Vec<String>,
}

/// ユーザーディレクトリから ID を引く。無ければ `UnknownUser`
pub fn lookup_user<'a>(
    user_directory: &'a HashMap<UserId, UserInfo>,
    id: &UserId,
) -> Result<&'a UserInfo, NotificationError> {
    user_directory
        .get(id)
        .ok_or_else(|| NotificationError::UnknownUser(id.clone()))
}

/// リソース 1 件の宛先を解決する
///
/// 所有者または代理人のいずれかがディレクトリに無ければ `UnknownUser` を返す。
/// 代理人が重複していてもそのまま並べる。
pub fn resolve_recipients(
    item: &ResourceItem,
    owner_to_delegates: &HashMap<UserId, Vec<UserId>>,
    user_directory: &HashMap<UserId, UserInfo>,
    support_address: &str,
) -> Result<Recipients, NotificationError> {
    let owner = lookup_user(user_directory, &item.owner_id)?;

    let delegates = owner_to_delegates
        .get(&item.owner_id)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut cc = Vec::with_capacity(delegates.len() + 1);
    cc.push(support_address.to_string());
    for delegate_id in delegates {
        let delegate = lookup_user(user_directory, delegate_id)?;
        cc.push(delegate.email.as_str().to_string());
    }

    Ok(Recipients {
        to: owner.email.as_str().to_string(),
        cc,
    })
}

#[cfg(test)]
mod tests {
    use maplit::hashmap;
    use policy_notify_domain::user::Email;
    use pretty_assertions::assert_eq;

    use super::*;

    fn user(first: &str, email: &str) -> UserInfo {
        UserInfo::new(first, "Test", Email::new(email).unwrap())
    }

    #[test]
    fn test_toは所有者でccはサポート窓口と代理人の順() {
        let owner = UserId::new();
        let d1 = UserId::new();
        let d2 = UserId::new();
        let directory = hashmap! {
            owner.clone() => user("Pat", "p@x.com"),
            d1.clone() => user("Dan", "d1@x.com"),
            d2.clone() => user("Dee", "d2@x.com"),
        };
        let delegates = hashmap! { owner.clone() => vec![d2, d1] };

        let recipients = resolve_recipients(
            &ResourceItem::new("cat123", owner),
            &delegates,
            &directory,
            "support@x.com",
        )
        .unwrap();

        assert_eq!(
            recipients,
            Recipients {
                to: "p@x.com".to_string(),
                cc: vec![
                    "support@x.com".to_string(),
                    "d2@x.com".to_string(),
                    "d1@x.com".to_string(),
                ],
            }
        );
    }

    #[test]
    fn test_代理人がいなければccはサポート窓口のみ() {
        let owner = UserId::new();
        let directory = hashmap! { owner.clone() => user("Pat", "p@x.com") };

        let recipients = resolve_recipients(
            &ResourceItem::new("cat123", owner),
            &HashMap::new(),
            &directory,
            "support@x.com",
        )
        .unwrap();

        assert_eq!(recipients.cc, vec!["support@x.com"]);
    }

    #[test]
    fn test_重複した代理人はそのまま並ぶ() {
        let owner = UserId::new();
        let d = UserId::new();
        let directory = hashmap! {
            owner.clone() => user("Pat", "p@x.com"),
            d.clone() => user("Dan", "d@x.com"),
        };
        let delegates = hashmap! { owner.clone() => vec![d.clone(), d] };

        let recipients = resolve_recipients(
            &ResourceItem::new("cat123", owner),
            &delegates,
            &directory,
            "support@x.com",
        )
        .unwrap();

        assert_eq!(recipients.cc, vec!["support@x.com", "d@x.com", "d@x.com"]);
    }

    #[test]
    fn test_所有者が未登録ならunknown_user() {
        let owner = UserId::new();

        let result = resolve_recipients(
            &ResourceItem::new("cat123", owner.clone()),
            &HashMap::new(),
            &HashMap::new(),
            "support@x.com",
        );

        assert!(matches!(
            result,
            Err(NotificationError::UnknownUser(id)) if id == owner
        ));
    }

    #[test]
    fn test_代理人が未登録ならunknown_user() {
        let owner = UserId::new();
        let missing = UserId::new();
        let directory = hashmap! { owner.clone() => user("Pat", "p@x.com") };
        let delegates = hashmap! { owner.clone() => vec![missing.clone()] };

        let result = resolve_recipients(
            &ResourceItem::new("cat123", owner),
            &delegates,
            &directory,
            "support@x.com",
        );

        assert!(matches!(
            result,
            Err(NotificationError::UnknownUser(id)) if id == missing
        ));
    }

    #[test]
    fn test_他の所有者の代理人はccに入らない() {
        let owner = UserId::new();
        let other = UserId::new();
        let d = UserId::new();
        let directory = hashmap! {
            owner.clone() => user("Pat", "p@x.com"),
            d.clone() => user("Dan", "d@x.com"),
        };
        let delegates = hashmap! { other => vec![d] };

        let recipients = resolve_recipients(
            &ResourceItem::new("cat123", owner),
            &delegates,
            &directory,
            "support@x.com",
        )
        .unwrap();

        assert_eq!(recipients.cc, vec!["support@x.com"]);
    }
}
