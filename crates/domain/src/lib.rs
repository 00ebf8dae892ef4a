//! # mailcast ドメイン層
//!
//! 一斉配信スケジューラの中核となるドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! このクレートは DDD（ドメイン駆動設計）の原則に従い、以下を提供する:
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（例: Campaign,
//!   Recipient）
//! - **値オブジェクト**: 識別子を持たない不変オブジェクト（例: Email,
//!   CampaignStatus）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! dispatcher → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、SMTP、Redis）に一切依存しない。
//! これにより、キャンペーンのステータス遷移や配信試行の不変条件といった
//! ビジネスロジックの純粋性が保たれる。
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`campaign`] - キャンペーン（一斉配信）とステータス遷移
//! - [`attempt`] - 配信試行の追記専用レコード
//! - [`recipient`] - 受信者とメールアドレス
//! - [`message`] - 配信メッセージ
//! - [`clock`] - テスト可能な時刻プロバイダ
//!
//! ## 使用例
//!
//! ```rust
//! use mailcast_domain::{DomainError, campaign::CampaignId};
//!
//! // キャンペーン ID の生成
//! let campaign_id = CampaignId::new();
//!
//! // ドメインエラーの生成
//! let error = DomainError::NotFound {
//!     entity_type: "Campaign",
//!     id:          "cmp-123".to_string(),
//! };
//! ```

#[macro_use]
mod macros;

pub mod attempt;
pub mod campaign;
pub mod clock;
pub mod error;
pub mod message;
pub mod recipient;
pub mod user;

pub use error::DomainError;
