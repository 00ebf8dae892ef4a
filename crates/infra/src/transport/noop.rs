//! Noop トランスポート実装
//!
//! メールを実際に送信せず、ログ出力のみ行い常に成功を返す。
//! テスト環境や配信無効化時に使用する。

use async_trait::async_trait;

use super::{DeliveryOutcome, MailTransport};

/// Noop メールトランスポート（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopMailTransport;

#[async_trait]
impl MailTransport for NoopMailTransport {
    async fn send(&self, address: &str, subject: &str, _body: &str) -> DeliveryOutcome {
        tracing::info!(
            to = %address,
            subject = %subject,
            "Noop: メール送信をスキップ"
        );
        DeliveryOutcome::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sendが常に成功を返す() {
        let transport = NoopMailTransport;
        let outcome = transport
            .send("test@example.com", "テスト件名", "テスト本文")
            .await;

        assert!(outcome.is_delivered());
        assert!(outcome.diagnostic().is_none());
    }
}
