//! # ユースケース
//!
//! ディスパッチャのビジネスロジックを実装する。
//!
//! ## モジュール構成
//!
//! - [`dispatch`] - ディスパッチエンジン（キャンペーン実行の中核）
//! - [`catalog`] - 読み出し系サービス（キャッシュ経由の一覧・所有者別集計）

pub mod catalog;
pub mod dispatch;

pub use catalog::CatalogService;
pub use dispatch::{DispatchError, DispatchOutcome, DispatchService, DispatchSummary, RunSummary};
