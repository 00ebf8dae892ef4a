//! # 配信メッセージ
//!
//! キャンペーンが参照する件名・本文のペア。
//!
//! キャンペーンから参照された後も編集可能であり、編集は未配信の
//! キャンペーンに伝播する（参照時点でのスナップショットは取らない）。
//! 本文のテンプレート展開は行わない（スコープ外）。

use serde::{Deserialize, Serialize};

use crate::user::UserId;

define_uuid_id! {
    /// メッセージ ID
    pub struct MessageId;
}

define_validated_string! {
    /// 件名
    pub struct SubjectLine {
        label: "件名",
        max_length: 255,
    }
}

/// 配信メッセージエンティティ
///
/// 本文は任意のテキスト。リスティングキャッシュに JSON として
/// 保存されるため serde を導出する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id:       MessageId,
    owner_id: UserId,
    subject:  SubjectLine,
    body:     String,
}

/// メッセージの新規作成パラメータ
pub struct NewMessage {
    pub id:       MessageId,
    pub owner_id: UserId,
    pub subject:  SubjectLine,
    pub body:     String,
}

impl Message {
    /// 新しいメッセージを作成する
    pub fn new(params: NewMessage) -> Self {
        Self {
            id:       params.id,
            owner_id: params.owner_id,
            subject:  params.subject,
            body:     params.body,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn subject(&self) -> &SubjectLine {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn メッセージを作成すると件名と本文が保持される() {
        let message = Message::new(NewMessage {
            id:       MessageId::new(),
            owner_id: UserId::new(),
            subject:  SubjectLine::new("8月のお知らせ").unwrap(),
            body:     "いつもご利用ありがとうございます。".to_string(),
        });

        assert_eq!(message.subject().as_str(), "8月のお知らせ");
        assert_eq!(message.body(), "いつもご利用ありがとうございます。");
    }

    #[test]
    fn 件名は空文字列を拒否する() {
        assert!(SubjectLine::new("").is_err());
    }

    #[test]
    fn 件名は前後の空白を除去する() {
        let subject = SubjectLine::new("  お知らせ  ").unwrap();
        assert_eq!(subject.as_str(), "お知らせ");
    }
}
