//! # 配信試行
//!
//! キャンペーンのメッセージを 1 人の受信者へ送信した結果の不変レコード。
//!
//! ## 不変条件
//!
//! - 追記専用: コアは作成のみを行い、更新・削除は存在しない
//! - `attempted_at` はレコード生成時に確定し、以後変更されない
//! - `failed` の試行は必ず空でない診断テキストを持つ
//! - `success` の試行は診断テキストを持たない
//!
//! ディスパッチエンジンは受信者 1 人につきちょうど 1 件の試行を作成する。
//! 試行はキャンペーンに所有され、受信者はメールアドレスのスナップショットで
//! 文脈として記録される（受信者削除後も試行履歴は残る）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, campaign::CampaignId, recipient::Email};

define_uuid_id! {
    /// 配信試行 ID
    pub struct AttemptId;
}

/// 配信試行ステータス
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "snake_case")]
pub enum AttemptStatus {
    /// 送信成功
    Success,
    /// 送信失敗
    Failed,
}

/// 配信試行レコード
///
/// 下流の集計ビュー（スコープ外）がキャンペーン所有者とステータスで
/// フィルタして成功・失敗カウンタを算出する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    id:              AttemptId,
    campaign_id:     CampaignId,
    recipient_email: Email,
    status:          AttemptStatus,
    server_response: Option<String>,
    attempted_at:    DateTime<Utc>,
}

impl Attempt {
    /// 成功した配信試行を作成する
    ///
    /// 診断テキストは持たない（成功時は空のまま）。
    pub fn success(
        campaign_id: CampaignId,
        recipient_email: Email,
        attempted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AttemptId::new(),
            campaign_id,
            recipient_email,
            status: AttemptStatus::Success,
            server_response: None,
            attempted_at,
        }
    }

    /// 失敗した配信試行を作成する
    ///
    /// # エラー
    ///
    /// 診断テキストが空の場合は `DomainError::Validation` を返す。
    /// SMTP トランスポートは常に空でない診断テキストを生成するため、
    /// このエラーは誤用に対するガードとして機能する。
    pub fn failure(
        campaign_id: CampaignId,
        recipient_email: Email,
        diagnostic: impl Into<String>,
        attempted_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let diagnostic = diagnostic.into();
        if diagnostic.is_empty() {
            return Err(DomainError::Validation(
                "失敗した配信試行には診断テキストが必要です".to_string(),
            ));
        }

        Ok(Self {
            id: AttemptId::new(),
            campaign_id,
            recipient_email,
            status: AttemptStatus::Failed,
            server_response: Some(diagnostic),
            attempted_at,
        })
    }

    pub fn id(&self) -> &AttemptId {
        &self.id
    }

    pub fn campaign_id(&self) -> &CampaignId {
        &self.campaign_id
    }

    pub fn recipient_email(&self) -> &Email {
        &self.recipient_email
    }

    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    /// 失敗時のサーバー応答（診断テキスト）
    pub fn server_response(&self) -> Option<&str> {
        self.server_response.as_deref()
    }

    pub fn attempted_at(&self) -> DateTime<Utc> {
        self.attempted_at
    }
}
