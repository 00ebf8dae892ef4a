//! # MessageRepository
//!
//! 配信メッセージの読み出しを担当するリポジトリ。
//!
//! ディスパッチエンジンは送信のたびにライブなメッセージを読む:
//! キャンペーン参照後の編集は未配信のキャンペーンに伝播する。

use async_trait::async_trait;
use mailcast_domain::{
    message::{Message, MessageId, NewMessage, SubjectLine},
    user::UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// メッセージリポジトリトレイト
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// ID でメッセージを取得する
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, InfraError>;

    /// 全メッセージを列挙する（一覧ビュー向け、キャッシュ経由で利用される）
    async fn list_all(&self) -> Result<Vec<Message>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id:       Uuid,
    owner_id: Uuid,
    subject:  String,
    body:     String,
}

impl MessageRow {
    fn into_message(self) -> Result<Message, InfraError> {
        let subject =
            SubjectLine::new(self.subject).map_err(|e| InfraError::unexpected(e.to_string()))?;

        Ok(Message::new(NewMessage {
            id: MessageId::from_uuid(self.id),
            owner_id: UserId::from_uuid(self.owner_id),
            subject,
            body: self.body,
        }))
    }
}

/// PostgreSQL 実装の MessageRepository
#[derive(Debug, Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, InfraError> {
        let row: Option<MessageRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, subject, body
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageRow::into_message).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn list_all(&self) -> Result<Vec<Message>, InfraError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, subject, body
            FROM messages
            ORDER BY subject
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MessageRow::into_message).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresMessageRepository>();
    }
}
