//! # リスティングキャッシュ
//!
//! 読み出しの多い一覧系ビューを高速化するベストエフォートなキャッシュ層。
//!
//! ## 設計方針
//!
//! - **ベストエフォート**: Redis の障害・未接続・無効化はすべて透過的に
//!   ローダー（DB 直接読み出し）へのフォールバックに変換される
//! - **権威性なし**: キャッシュは真実の源ではない。ディスパッチエンジンは
//!   この層を一切参照せず、常にライブな受信者・メッセージデータを読む
//! - **プロセス全体の有効化フラグ**: 設定（`CACHE_ENABLED`）で無効化すると
//!   すべての呼び出しがローダー直接実行に退化する

use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::InfraError;

/// キャッシュ値の有効期限（秒）
const LISTING_TTL_SECONDS: u64 = 300;

/// リスティングキャッシュ
///
/// 値は JSON 文字列として Redis に保存される。
/// 接続がない場合（`conn: None`）や無効化されている場合は、
/// すべての操作がローダーの直接呼び出しに退化する。
#[derive(Clone)]
pub struct ListingCache {
    conn:    Option<ConnectionManager>,
    enabled: bool,
}

impl ListingCache {
    /// キャッシュを作成する
    ///
    /// `enabled` が false、または `conn` が `None` の場合、
    /// `get_or_populate` は常にローダーを直接実行する。
    pub fn new(conn: Option<ConnectionManager>, enabled: bool) -> Self {
        Self { conn, enabled }
    }

    /// 無効化されたキャッシュを作成する（テスト・キャッシュ未使用構成向け）
    pub fn disabled() -> Self {
        Self {
            conn:    None,
            enabled: false,
        }
    }

    /// キャッシュから値を取得し、なければローダーで取得してキャッシュに書き込む
    ///
    /// # フォールバック
    ///
    /// - キャッシュ無効時・未接続時: ローダーを直接実行
    /// - Redis の読み出し失敗・デシリアライズ失敗: 警告ログの上ローダーを実行
    /// - Redis への書き込み失敗: 警告ログのみ（取得結果はそのまま返す）
    ///
    /// ローダー自体の失敗（DB エラー等）のみが呼び出し元にエラーとして返る。
    pub async fn get_or_populate<T, F, Fut>(&self, key: &str, loader: F) -> Result<T, InfraError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, InfraError>>,
    {
        let Some(conn) = self.connection() else {
            return loader().await;
        };

        let mut conn = conn.clone();

        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(key, error = %e, "キャッシュ値のデシリアライズに失敗、DB から再取得");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key, error = %e, "キャッシュ読み出しに失敗、DB から再取得");
            }
        }

        let value = loader().await?;

        // 書き込みはベストエフォート
        match serde_json::to_string(&value) {
            Ok(json) => {
                if let Err(e) = conn
                    .set_ex::<_, _, ()>(key, json, LISTING_TTL_SECONDS)
                    .await
                {
                    tracing::warn!(key, error = %e, "キャッシュ書き込みに失敗");
                }
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "キャッシュ値のシリアライズに失敗");
            }
        }

        Ok(value)
    }

    fn connection(&self) -> Option<&ConnectionManager> {
        if !self.enabled {
            return None;
        }
        self.conn.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn 無効化されたキャッシュはローダーを直接実行する() {
        let cache = ListingCache::disabled();
        let calls = AtomicUsize::new(0);

        let value: Vec<String> = cache
            .get_or_populate("recipient_list", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec!["tanaka@example.com".to_string()])
            })
            .await
            .unwrap();

        assert_eq!(value, vec!["tanaka@example.com".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn 無効化されたキャッシュは毎回ローダーを実行する() {
        let cache = ListingCache::disabled();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let _: Vec<String> = cache
                .get_or_populate("message_list", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Vec::new())
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn ローダーの失敗はそのまま呼び出し元に返る() {
        let cache = ListingCache::disabled();

        let result: Result<Vec<String>, _> = cache
            .get_or_populate("recipient_list", || async {
                Err(InfraError::unexpected("DB 接続失敗"))
            })
            .await;

        assert!(result.is_err());
    }
}
