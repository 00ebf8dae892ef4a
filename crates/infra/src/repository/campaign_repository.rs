//! # CampaignRepository
//!
//! キャンペーンの読み出しとステータス更新を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - ディスパッチエンジンは常にライブデータを読む（キャッシュを経由しない）
//! - `update_status` は単独でコミットされる: `started` への遷移は最初の
//!   送信より前に永続化され、クラッシュ時にも観測可能でなければならない
//! - CRUD（作成・編集・削除）は外部のデータ入力層の責務であり、
//!   コアが必要とする操作のみを公開する

use std::str::FromStr as _;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mailcast_domain::{
    campaign::{Campaign, CampaignId, CampaignStatus},
    message::MessageId,
    user::UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// キャンペーンリポジトリトレイト
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// ID でキャンペーンを取得する
    async fn find_by_id(&self, id: &CampaignId) -> Result<Option<Campaign>, InfraError>;

    /// ステータスが `created` のキャンペーン ID を列挙する
    ///
    /// 定期スケジューラの選択条件。`started` / `completed` は対象外
    /// （`started` のまま残ったキャンペーンは対話的な再実行でのみ再開される）。
    async fn find_created_ids(&self) -> Result<Vec<CampaignId>, InfraError>;

    /// キャンペーンのステータスを更新する
    ///
    /// 条件なしの単純な書き込み。同一キャンペーンに対する同時ディスパッチの
    /// 排他は行わない（既知の設計ギャップ、DESIGN.md 参照）。
    async fn update_status(
        &self,
        id: &CampaignId,
        status: CampaignStatus,
    ) -> Result<(), InfraError>;
}

#[derive(sqlx::FromRow)]
struct CampaignRow {
    id:         Uuid,
    owner_id:   Uuid,
    message_id: Uuid,
    start_time: DateTime<Utc>,
    end_time:   DateTime<Utc>,
    status:     String,
}

impl CampaignRow {
    fn into_campaign(self) -> Result<Campaign, InfraError> {
        let status = CampaignStatus::from_str(&self.status)
            .map_err(|e| InfraError::unexpected(e.to_string()))?;

        Ok(Campaign::from_record(
            CampaignId::from_uuid(self.id),
            UserId::from_uuid(self.owner_id),
            MessageId::from_uuid(self.message_id),
            self.start_time,
            self.end_time,
            status,
        ))
    }
}

/// PostgreSQL 実装の CampaignRepository
#[derive(Debug, Clone)]
pub struct PostgresCampaignRepository {
    pool: PgPool,
}

impl PostgresCampaignRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for PostgresCampaignRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_by_id(&self, id: &CampaignId) -> Result<Option<Campaign>, InfraError> {
        let row: Option<CampaignRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, message_id, start_time, end_time, status
            FROM campaigns
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CampaignRow::into_campaign).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_created_ids(&self) -> Result<Vec<CampaignId>, InfraError> {
        let ids: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id
            FROM campaigns
            WHERE status = 'created'
            ORDER BY start_time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids
            .into_iter()
            .map(|(id,)| CampaignId::from_uuid(id))
            .collect())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn update_status(
        &self,
        id: &CampaignId,
        status: CampaignStatus,
    ) -> Result<(), InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET status = $2
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::conflict("Campaign", id.to_string()));
        }

        Ok(())
    }
}
