//! # キャンペーン（一斉配信）
//!
//! 1 つのメッセージを受信者集合へ配信するスケジュール単位。
//! 3 状態のライフサイクルを持つ。
//!
//! ## ステータス遷移
//!
//! ```text
//! created → started → completed
//! ```
//!
//! - ディスパッチ経路ではステータスは前方にのみ進む
//! - `completed` からの遷移は存在しない（再ディスパッチは no-op）
//! - 受信者単位の失敗はキャンペーンレベルのステータスに影響しない
//!   （`failed` / `partially-failed` といったステータスは存在せず、
//!   失敗は配信試行レコードにのみ記録される）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, message::MessageId, user::UserId};

define_uuid_id! {
    /// キャンペーン ID
    pub struct CampaignId;
}

/// キャンペーンステータス
///
/// DB の `status` カラムに snake_case で格納される。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "snake_case")]
pub enum CampaignStatus {
    /// 作成済み（未配信）
    Created,
    /// 配信開始済み
    Started,
    /// 配信完了
    Completed,
}

impl std::str::FromStr for CampaignStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::Validation(format!(
                "不正なキャンペーンステータス: {}",
                s
            ))),
        }
    }
}

/// キャンペーンエンティティ
///
/// メッセージへの参照（ちょうど 1 つ）と受信者集合（多対多、結合テーブル）
/// を持つ。受信者集合はエンティティには保持せず、ディスパッチ開始時点の
/// スナップショットとしてリポジトリから読み出す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    id:         CampaignId,
    owner_id:   UserId,
    message_id: MessageId,
    start_time: DateTime<Utc>,
    end_time:   DateTime<Utc>,
    status:     CampaignStatus,
}

/// キャンペーンの新規作成パラメータ
pub struct NewCampaign {
    pub id:         CampaignId,
    pub owner_id:   UserId,
    pub message_id: MessageId,
    pub start_time: DateTime<Utc>,
    pub end_time:   DateTime<Utc>,
}

impl Campaign {
    /// 新しいキャンペーンを `created` ステータスで作成する
    ///
    /// # エラー
    ///
    /// 終了時刻が開始時刻より前の場合は `DomainError::Validation` を返す。
    pub fn new(params: NewCampaign) -> Result<Self, DomainError> {
        if params.end_time < params.start_time {
            return Err(DomainError::Validation(
                "終了時刻は開始時刻以降である必要があります".to_string(),
            ));
        }

        Ok(Self {
            id:         params.id,
            owner_id:   params.owner_id,
            message_id: params.message_id,
            start_time: params.start_time,
            end_time:   params.end_time,
            status:     CampaignStatus::Created,
        })
    }

    /// DB のフラットな行からキャンペーンを復元する
    pub fn from_record(
        id: CampaignId,
        owner_id: UserId,
        message_id: MessageId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        status: CampaignStatus,
    ) -> Self {
        Self {
            id,
            owner_id,
            message_id,
            start_time,
            end_time,
            status,
        }
    }

    pub fn id(&self) -> &CampaignId {
        &self.id
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn status(&self) -> CampaignStatus {
        self.status
    }

    /// 配信が完了しているか
    pub fn is_completed(&self) -> bool {
        self.status == CampaignStatus::Completed
    }

    /// 配信を開始する（`created` / `started` → `started`）
    ///
    /// クラッシュ後の再ディスパッチで `started` のまま残ったキャンペーンも
    /// 再開できるよう、`started` → `started` は許可する。
    ///
    /// # エラー
    ///
    /// `completed` からの開始は `DomainError::Conflict` を返す。
    /// ディスパッチエンジンは事前に `is_completed()` を確認して no-op とする
    /// ため、このエラーは防御的な最終チェックとして機能する。
    pub fn start(&mut self) -> Result<(), DomainError> {
        match self.status {
            CampaignStatus::Created | CampaignStatus::Started => {
                self.status = CampaignStatus::Started;
                Ok(())
            }
            CampaignStatus::Completed => Err(DomainError::Conflict(format!(
                "完了済みキャンペーンは再開できません: {}",
                self.id
            ))),
        }
    }

    /// 配信を完了する（`started` → `completed`）
    ///
    /// 受信者単位の成否に関わらず、全受信者の処理後に呼び出される。
    ///
    /// # エラー
    ///
    /// `started` 以外からの完了は `DomainError::Conflict` を返す。
    pub fn complete(&mut self) -> Result<(), DomainError> {
        match self.status {
            CampaignStatus::Started => {
                self.status = CampaignStatus::Completed;
                Ok(())
            }
            _ => Err(DomainError::Conflict(format!(
                "開始されていないキャンペーンは完了できません: {} (status={})",
                self.id, self.status
            ))),
        }
    }
}
