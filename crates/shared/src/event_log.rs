//! # ビジネスイベントログの構造化ヘルパー
//!
//! 運用時に `jq` で効率的に調査できるよう、ログフィールドの命名規約と
//! ヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"`
//! マーカーが自動付与され、
//! `jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`campaign.id`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.entity_id`: エンティティ ID
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const CAMPAIGN: &str = "campaign";
        pub const DELIVERY: &str = "delivery";
        pub const CACHE: &str = "cache";
    }

    /// イベントアクション
    pub mod action {
        // キャンペーン
        pub const DISPATCH_STARTED: &str = "campaign.dispatch_started";
        pub const DISPATCH_COMPLETED: &str = "campaign.dispatch_completed";
        pub const DISPATCH_SKIPPED: &str = "campaign.dispatch_skipped";

        // 配信
        pub const SEND_SUCCEEDED: &str = "delivery.send_succeeded";
        pub const SEND_FAILED: &str = "delivery.send_failed";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const CAMPAIGN: &str = "campaign";
        pub const ATTEMPT: &str = "attempt";
        pub const RECIPIENT: &str = "recipient";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_business_event;

    #[test]
    fn log_business_eventマクロがコンパイルできる() {
        // フィールド展開の構文検証のみ（出力先は設定しない）
        log_business_event!(
            event.category = event::category::CAMPAIGN,
            event.action = event::action::DISPATCH_STARTED,
            event.result = event::result::SUCCESS,
            "テストイベント"
        );
    }
}
