//! # mailcast インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートはリポジトリトレイトとメールトランスポートの具体的な実装を
//! 提供する。外部システムの詳細をカプセル化し、ドメイン層をインフラの
//! 変更から保護する。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理
//! - **リポジトリ実装**: キャンペーン・受信者・メッセージ・配信試行の永続化
//! - **メールトランスポート**: SMTP（lettre）による単一メッセージ送信
//! - **リスティングキャッシュ**: Redis によるベストエフォートの読み出し高速化
//!
//! ## 依存関係
//!
//! ```text
//! dispatcher → infra → domain
//! ```
//!
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`redis`] - Redis 接続管理
//! - [`cache`] - リスティングキャッシュ（ディスパッチ経路からは参照されない）
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリ実装
//! - [`transport`] - メールトランスポート実装

pub mod cache;
pub mod db;
pub mod error;
pub mod redis;
pub mod repository;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::InfraError;
