//! # リポジトリ実装
//!
//! 各集約の永続化トレイトと PostgreSQL 実装を提供する。
//!
//! ## 設計方針
//!
//! - **依存性逆転**: ディスパッチャはトレイト経由でリポジトリを利用する
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化
//! - **テスタビリティ**: トレイト経由でモック可能な設計（[`crate::mock`]）
//!
//! クエリはランタイム検証（`sqlx::query` / `query_as`）を使用する。
//! ビルドに DATABASE_URL やプリペア済みクエリキャッシュを必要としない。

pub mod attempt_repository;
pub mod campaign_repository;
pub mod message_repository;
pub mod recipient_repository;

pub use attempt_repository::{AttemptRepository, AttemptStats, PostgresAttemptRepository};
pub use campaign_repository::{CampaignRepository, PostgresCampaignRepository};
pub use message_repository::{MessageRepository, PostgresMessageRepository};
pub use recipient_repository::{PostgresRecipientRepository, RecipientRepository};
