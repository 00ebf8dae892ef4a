//! # 受信者
//!
//! 配信の宛先となる受信者エンティティとメールアドレス値オブジェクトを定義する。
//!
//! ## 不変条件
//!
//! - メールアドレスは受信者全体で一意（DB のユニーク制約で強制）
//! - 受信者の削除は所属するキャンペーンの受信者集合からの除外に連鎖する

use serde::{Deserialize, Serialize};

use crate::{DomainError, user::UserId};

define_uuid_id! {
    /// 受信者 ID
    pub struct RecipientId;
}

define_validated_string! {
    /// 受信者の表示名
    pub struct FullName {
        label: "表示名",
        max_length: 255,
    }
}

/// メールアドレス（値オブジェクト）
///
/// 生成時に構造検証を実行し、不正な値の作成を防ぐ。
/// SMTP サーバーによる宛先拒否はここでは検出せず、配信試行の失敗として
/// 記録される（トランスポートは再検証しない）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `local@domain` の形式であること
    /// - 最大 255 文字
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        // 基本的な構造検証: local@domain の形式であること
        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        };

        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "メールアドレスは255文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 受信者エンティティ
///
/// ユーザー操作で作成され、所有者または管理者のみが変更できる
/// （権限チェックは呼び出し側の責務）。
/// リスティングキャッシュに JSON として保存されるため serde を導出する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    id:        RecipientId,
    owner_id:  UserId,
    email:     Email,
    full_name: FullName,
    comment:   Option<String>,
}

/// 受信者の新規作成パラメータ
pub struct NewRecipient {
    pub id:        RecipientId,
    pub owner_id:  UserId,
    pub email:     Email,
    pub full_name: FullName,
    pub comment:   Option<String>,
}

impl Recipient {
    /// 新しい受信者を作成する
    pub fn new(params: NewRecipient) -> Self {
        Self {
            id:        params.id,
            owner_id:  params.owner_id,
            email:     params.email,
            full_name: params.full_name,
            comment:   params.comment,
        }
    }

    pub fn id(&self) -> &RecipientId {
        &self.id
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    // ===== Email のテスト =====

    #[test]
    fn 正しい形式のメールアドレスを作成できる() {
        let email = Email::new("user@example.com").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign")]
    #[case("@example.com")]
    #[case("user@")]
    fn 不正な形式のメールアドレスは拒否される(#[case] input: &str) {
        assert!(Email::new(input).is_err());
    }

    #[test]
    fn メールアドレスは255文字を超えると拒否される() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(Email::new(long).is_err());
    }

    // ===== Recipient のテスト =====

    #[test]
    fn 受信者を作成するとフィールドが保持される() {
        let recipient = Recipient::new(NewRecipient {
            id:        RecipientId::new(),
            owner_id:  UserId::new(),
            email:     Email::new("tanaka@example.com").unwrap(),
            full_name: FullName::new("田中太郎").unwrap(),
            comment:   Some("重要顧客".to_string()),
        });

        assert_eq!(recipient.email().as_str(), "tanaka@example.com");
        assert_eq!(recipient.full_name().as_str(), "田中太郎");
        assert_eq!(recipient.comment(), Some("重要顧客"));
    }

    #[test]
    fn 表示名は空文字列を拒否する() {
        assert!(FullName::new("   ").is_err());
    }
}
