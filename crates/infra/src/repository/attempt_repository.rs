//! # AttemptRepository
//!
//! 配信試行の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **追記専用**: `insert` のみを公開し、更新・削除の操作は存在しない
//! - **成功・失敗の両方を記録**: 受信者 1 人につきちょうど 1 件
//! - **下流集計**: キャンペーン所有者別の成功・失敗カウンタを提供する
//!   （スコープ外のレポートビューが利用する読み出し専用クエリ）

use async_trait::async_trait;
use mailcast_domain::{
    attempt::{Attempt, AttemptId},
    campaign::CampaignId,
    user::UserId,
};
use sqlx::PgPool;

use crate::error::InfraError;

/// 所有者別の配信試行集計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttemptStats {
    /// 成功した試行数
    pub successful: i64,
    /// 失敗した試行数
    pub failed:     i64,
}

impl AttemptStats {
    /// 試行の総数
    pub fn total(&self) -> i64 {
        self.successful + self.failed
    }
}

/// 配信試行リポジトリトレイト
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// 配信試行を追記し、作成されたレコードの ID を返す
    async fn insert(&self, attempt: &Attempt) -> Result<AttemptId, InfraError>;

    /// キャンペーンに紐づく試行数を数える
    async fn count_by_campaign(&self, campaign_id: &CampaignId) -> Result<i64, InfraError>;

    /// キャンペーン所有者別の成功・失敗カウンタを集計する
    async fn stats_by_owner(&self, owner_id: &UserId) -> Result<AttemptStats, InfraError>;
}

/// PostgreSQL 実装の AttemptRepository
#[derive(Debug, Clone)]
pub struct PostgresAttemptRepository {
    pool: PgPool,
}

impl PostgresAttemptRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptRepository for PostgresAttemptRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(&self, attempt: &Attempt) -> Result<AttemptId, InfraError> {
        sqlx::query(
            r#"
            INSERT INTO attempts (
                id, campaign_id, recipient_email, status, server_response, attempted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(attempt.id().as_uuid())
        .bind(attempt.campaign_id().as_uuid())
        .bind(attempt.recipient_email().as_str())
        .bind(attempt.status().to_string())
        .bind(attempt.server_response())
        .bind(attempt.attempted_at())
        .execute(&self.pool)
        .await?;

        Ok(attempt.id().clone())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn count_by_campaign(&self, campaign_id: &CampaignId) -> Result<i64, InfraError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM attempts
            WHERE campaign_id = $1
            "#,
        )
        .bind(campaign_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn stats_by_owner(&self, owner_id: &UserId) -> Result<AttemptStats, InfraError> {
        let (successful, failed): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE a.status = 'success'),
                COUNT(*) FILTER (WHERE a.status = 'failed')
            FROM attempts a
            JOIN campaigns c ON c.id = a.campaign_id
            WHERE c.owner_id = $1
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(AttemptStats { successful, failed })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresAttemptRepository>();
    }

    #[test]
    fn 集計のtotalは成功と失敗の合計を返す() {
        let stats = AttemptStats {
            successful: 7,
            failed:     3,
        };
        assert_eq!(stats.total(), 10);
    }
}
