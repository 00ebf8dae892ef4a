//! # mailcast 共有ユーティリティ
//!
//! 全クレートから利用される横断的な定義を提供する。
//!
//! ## モジュール構成
//!
//! - [`event_log`] - ビジネスイベントログの構造化ヘルパー

pub mod event_log;
