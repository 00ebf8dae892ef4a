//! # ディスパッチャ設定
//!
//! 環境変数からディスパッチャの設定を読み込む。

use std::env;

/// ディスパッチャの設定
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// データベース接続 URL
    pub database_url: String,
    /// リスティングキャッシュ設定
    pub cache:        CacheConfig,
    /// トランスポート設定
    pub transport:    TransportConfig,
}

/// リスティングキャッシュの設定
///
/// `CACHE_ENABLED` はプロセス全体のフラグ。無効化するとキャッシュ層の
/// すべての呼び出しが DB 直接読み出しに退化する。
/// ディスパッチエンジンはこのフラグを一切参照しない。
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// キャッシュ有効化フラグ
    pub enabled:   bool,
    /// Redis 接続 URL
    pub redis_url: String,
}

/// メールトランスポートの設定
///
/// `TRANSPORT_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `smtp`: Mailpit（開発）/ SMTP サーバー経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// 送信バックエンド（"smtp" | "noop"）
    pub backend:      String,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:    String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:    u16,
    /// 送信元メールアドレス
    pub from_address: String,
}

impl DispatcherConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            cache:        CacheConfig::from_env(),
            transport:    TransportConfig::from_env(),
        })
    }
}

impl CacheConfig {
    fn from_env() -> Self {
        Self {
            enabled:   env::var("CACHE_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        }
    }
}

impl TransportConfig {
    fn from_env() -> Self {
        Self {
            backend:      env::var("TRANSPORT_BACKEND").unwrap_or_else(|_| "noop".to_string()),
            smtp_host:    env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port:    env::var("SMTP_PORT")
                .unwrap_or_else(|_| "1025".to_string())
                .parse()
                .expect("SMTP_PORT は有効なポート番号である必要があります"),
            from_address: env::var("MAILCAST_FROM_ADDRESS")
                .unwrap_or_else(|_| "noreply@mailcast.example.com".to_string()),
        }
    }
}
