//! # RecipientRepository
//!
//! 受信者の読み出しを担当するリポジトリ。
//!
//! `find_by_campaign` はディスパッチ開始時点の受信者集合のスナップショットを
//! 返す。ディスパッチ中に追加された受信者が含まれる保証はない。

use async_trait::async_trait;
use mailcast_domain::{
    campaign::CampaignId,
    recipient::{Email, FullName, NewRecipient, Recipient, RecipientId},
    user::UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// 受信者リポジトリトレイト
#[async_trait]
pub trait RecipientRepository: Send + Sync {
    /// キャンペーンに紐づく受信者集合を取得する
    async fn find_by_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<Recipient>, InfraError>;

    /// 全受信者を列挙する（一覧ビュー向け、キャッシュ経由で利用される）
    async fn list_all(&self) -> Result<Vec<Recipient>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct RecipientRow {
    id:        Uuid,
    owner_id:  Uuid,
    email:     String,
    full_name: String,
    comment:   Option<String>,
}

impl RecipientRow {
    fn into_recipient(self) -> Result<Recipient, InfraError> {
        let email =
            Email::new(self.email).map_err(|e| InfraError::unexpected(e.to_string()))?;
        let full_name =
            FullName::new(self.full_name).map_err(|e| InfraError::unexpected(e.to_string()))?;

        Ok(Recipient::new(NewRecipient {
            id: RecipientId::from_uuid(self.id),
            owner_id: UserId::from_uuid(self.owner_id),
            email,
            full_name,
            comment: self.comment,
        }))
    }
}

/// PostgreSQL 実装の RecipientRepository
#[derive(Debug, Clone)]
pub struct PostgresRecipientRepository {
    pool: PgPool,
}

impl PostgresRecipientRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientRepository for PostgresRecipientRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_by_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<Recipient>, InfraError> {
        let rows: Vec<RecipientRow> = sqlx::query_as(
            r#"
            SELECT r.id, r.owner_id, r.email, r.full_name, r.comment
            FROM recipients r
            JOIN campaign_recipients cr ON cr.recipient_id = r.id
            WHERE cr.campaign_id = $1
            ORDER BY r.email
            "#,
        )
        .bind(campaign_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RecipientRow::into_recipient).collect()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn list_all(&self) -> Result<Vec<Recipient>, InfraError> {
        let rows: Vec<RecipientRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, email, full_name, comment
            FROM recipients
            ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RecipientRow::into_recipient).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresRecipientRepository>();
    }
}
