//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//! - **呼び出し側での変換**: ディスパッチャや外部の CRUD 層が
//!   適切な結果型・レスポンスに変換する
//!
//! ## 使用例
//!
//! ```rust
//! use mailcast_domain::DomainError;
//!
//! fn validate_subject(subject: &str) -> Result<(), DomainError> {
//!     if subject.is_empty() {
//!         return Err(DomainError::Validation("件名は必須です".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// ビジネスロジックの実行中に発生する例外状態を表現する。
///
/// # 設計判断
///
/// - `thiserror` を使用し、`std::error::Error` トレイトを自動実装
/// - 各バリアントに `#[error(...)]` で人間可読なメッセージを定義
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がビジネスルールに違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - メールアドレスの形式不正
    /// - 件名の文字数制限超過
    /// - 失敗した配信試行に診断テキストがない
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない
    ///
    /// 指定された ID のエンティティがデータベースに存在しない場合に使用する。
    /// `entity_type` にはエンティティの種類（"Campaign", "Message" など）を
    /// 指定し、エラーメッセージを具体的にする。
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（"Campaign", "Recipient" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },

    /// ステータス遷移の競合
    ///
    /// キャンペーンのステータスが許可されない方向に遷移しようとした場合に
    /// 使用する。ステータスはディスパッチ経路では前方にのみ進む。
    #[error("競合が発生しました: {0}")]
    Conflict(String),

    /// 権限エラー
    ///
    /// 所有者でも管理者でもないユーザーが操作を実行しようとした場合に使用する。
    /// 権限チェック（`is_owner` / `is_administrator`）は呼び出し側の責務であり、
    /// コアはこのエラー型を語彙として提供するのみ。
    #[error("権限がありません: {0}")]
    Forbidden(String),
}
