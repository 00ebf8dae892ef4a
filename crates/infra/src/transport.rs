//! # メールトランスポート
//!
//! 1 通のメッセージを 1 つのアドレスへ送信するプリミティブ。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `MailTransport` trait で送信を抽象化
//! - **2 つの実装**: SMTP（lettre、本番・開発用）、Noop（テスト・無効化用）
//! - **環境変数切替**: `TRANSPORT_BACKEND` でランタイム選択
//! - **例外を漏らさない**: 送信失敗はこの境界を越えて伝播しない。
//!   あらゆる失敗は診断テキスト付きの [`DeliveryOutcome::Rejected`] に
//!   変換され、呼び出し元（ディスパッチエンジン）が配信試行として記録する
//! - **リトライなし**: 1 回の呼び出しで最大 1 回の送信試行

mod noop;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopMailTransport;
pub use smtp::SmtpMailTransport;

/// 1 回の送信試行の結果
///
/// 送信失敗はエラーではなく結果として表現する。シグネチャに `Err` 経路が
/// ないことで、「トランスポート障害はディスパッチループを中断しない」という
/// 方針を型レベルで強制する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 送信成功
    Delivered,
    /// 送信失敗（診断テキスト付き）
    Rejected {
        /// 失敗内容の人間可読な説明（SMTP サーバー応答、接続エラー等）
        diagnostic: String,
    },
}

impl DeliveryOutcome {
    /// 送信に成功したか
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// 失敗時の診断テキスト（成功時は `None`）
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Delivered => None,
            Self::Rejected { diagnostic } => Some(diagnostic),
        }
    }
}

/// メール送信トレイト
///
/// 宛先アドレスの構文検証は上流（受信者登録時の `Email` 値オブジェクト）の
/// 責務であり、トランスポートは再検証しない。
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// メッセージを 1 通送信する
    async fn send(&self, address: &str, subject: &str, body: &str) -> DeliveryOutcome;
}
