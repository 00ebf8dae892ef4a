//! # mailcast ディスパッチャ
//!
//! 配信待ちキャンペーンを実行するバッチプロセス。
//!
//! ## 役割
//!
//! - **スケジューラ実行**（引数なし）: ステータスが `created` の全キャンペーン
//!   を順番にディスパッチする。cron 等から定期起動されることを想定
//! - **単発実行**（キャンペーン ID を引数に指定）: 指定キャンペーンのみを
//!   ディスパッチする。運用時の再実行・検証向け
//! - **一覧表示**（`list-recipients` / `list-messages`）: 登録済みの受信者・
//!   メッセージをリスティングキャッシュ経由で表示する。運用時の確認向け
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `TRANSPORT_BACKEND` | No | `smtp` \| `noop`（デフォルト: `noop`） |
//! | `SMTP_HOST` | No | SMTP ホスト（デフォルト: `localhost`） |
//! | `SMTP_PORT` | No | SMTP ポート（デフォルト: `1025`） |
//! | `MAILCAST_FROM_ADDRESS` | No | 送信元アドレス |
//! | `CACHE_ENABLED` | No | リスティングキャッシュ有効化（デフォルト: 無効） |
//! | `REDIS_URL` | No | Redis 接続 URL（デフォルト: `redis://localhost:6379`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # スケジューラ実行（created の全キャンペーン）
//! cargo run -p mailcast-dispatcher
//!
//! # 単発実行
//! cargo run -p mailcast-dispatcher -- 0192c3a1-7b4e-7c8d-9e0f-1a2b3c4d5e6f
//!
//! # 一覧表示
//! cargo run -p mailcast-dispatcher -- list-recipients
//! ```

use std::sync::Arc;

use anyhow::Context;
use mailcast_dispatcher::{
    config::DispatcherConfig,
    usecase::{CatalogService, DispatchService},
};
use mailcast_domain::{campaign::CampaignId, clock::SystemClock};
use mailcast_infra::{
    cache::ListingCache,
    db,
    redis,
    repository::{
        PostgresAttemptRepository,
        PostgresCampaignRepository,
        PostgresMessageRepository,
        PostgresRecipientRepository,
    },
    transport::{MailTransport, NoopMailTransport, SmtpMailTransport},
};
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化（ErrorLayer は InfraError の SpanTrace 捕捉に必要）
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mailcast=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .init();

    let config = DispatcherConfig::from_env().context("設定の読み込みに失敗しました")?;

    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    db::run_migrations(&pool)
        .await
        .context("マイグレーションの適用に失敗しました")?;
    tracing::info!("データベースに接続しました");

    let transport: Arc<dyn MailTransport> = match config.transport.backend.as_str() {
        "smtp" => {
            tracing::info!(
                host = %config.transport.smtp_host,
                port = config.transport.smtp_port,
                "SMTP トランスポートを使用します"
            );
            Arc::new(SmtpMailTransport::new(
                &config.transport.smtp_host,
                config.transport.smtp_port,
                config.transport.from_address.clone(),
            ))
        }
        "noop" => {
            tracing::info!("Noop トランスポートを使用します（送信なし）");
            Arc::new(NoopMailTransport)
        }
        other => anyhow::bail!("不明な TRANSPORT_BACKEND: {other}（smtp | noop）"),
    };

    // リスティングキャッシュ（無効時・接続失敗時は DB 直接読み出しに退化）
    let cache = if config.cache.enabled {
        match redis::create_connection_manager(&config.cache.redis_url).await {
            Ok(conn) => {
                tracing::info!("Redis に接続しました");
                ListingCache::new(Some(conn), true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis 接続に失敗、キャッシュなしで続行");
                ListingCache::disabled()
            }
        }
    } else {
        ListingCache::disabled()
    };

    let service = DispatchService::new(
        Arc::new(PostgresCampaignRepository::new(pool.clone())),
        Arc::new(PostgresRecipientRepository::new(pool.clone())),
        Arc::new(PostgresMessageRepository::new(pool.clone())),
        Arc::new(PostgresAttemptRepository::new(pool.clone())),
        transport,
        Arc::new(SystemClock),
    );
    let catalog = CatalogService::new(
        Arc::new(PostgresRecipientRepository::new(pool.clone())),
        Arc::new(PostgresMessageRepository::new(pool.clone())),
        Arc::new(PostgresAttemptRepository::new(pool.clone())),
        cache,
    );

    match std::env::args().nth(1).as_deref() {
        // 一覧表示: リスティングキャッシュ経由の読み出し
        Some("list-recipients") => {
            let recipients = catalog.list_recipients().await?;
            for recipient in &recipients {
                println!("{}\t{}", recipient.email(), recipient.full_name());
            }
            tracing::info!(count = recipients.len(), "受信者一覧を表示しました");
        }
        Some("list-messages") => {
            let messages = catalog.list_messages().await?;
            for message in &messages {
                println!("{}\t{}", message.id(), message.subject());
            }
            tracing::info!(count = messages.len(), "メッセージ一覧を表示しました");
        }
        // 単発実行: 指定キャンペーンのみディスパッチする
        Some(raw_id) => {
            let uuid = Uuid::parse_str(raw_id)
                .with_context(|| format!("キャンペーン ID のパースに失敗しました: {raw_id}"))?;
            let campaign_id = CampaignId::from_uuid(uuid);

            let outcome = service.dispatch(&campaign_id).await?;
            tracing::info!(campaign_id = %campaign_id, ?outcome, "ディスパッチ完了");
        }
        // スケジューラ実行: created の全キャンペーンをディスパッチする
        None => {
            let summary = service.run_pending().await?;
            tracing::info!(
                dispatched = summary.dispatched,
                failed = summary.failed,
                "スケジューラ実行完了"
            );
        }
    }

    Ok(())
}
