//! SMTP トランスポート実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 開発環境では Mailpit（ローカル SMTP サーバー）に接続する。

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Message, SinglePart, header::ContentType},
};

use super::{DeliveryOutcome, MailTransport};

/// SMTP メールトランスポート
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
/// 失敗の種類（アドレス構築失敗・接続失敗・サーバー拒否）に関わらず、
/// すべて [`DeliveryOutcome::Rejected`] に変換して返す。
pub struct SmtpMailTransport {
    transport:    AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailTransport {
    /// 新しい SMTP トランスポートを作成
    ///
    /// # 引数
    ///
    /// - `host`: SMTP サーバーのホスト名（例: "localhost"）
    /// - `port`: SMTP サーバーのポート番号（例: 1025 for Mailpit）
    /// - `from_address`: 送信元メールアドレス
    pub fn new(host: &str, port: u16, from_address: String) -> Self {
        // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Self {
            transport,
            from_address,
        }
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, address: &str, subject: &str, body: &str) -> DeliveryOutcome {
        let from = match self.from_address.parse() {
            Ok(from) => from,
            Err(e) => {
                return DeliveryOutcome::Rejected {
                    diagnostic: format!("送信元アドレス不正: {e}"),
                };
            }
        };

        let to = match address.parse() {
            Ok(to) => to,
            Err(e) => {
                return DeliveryOutcome::Rejected {
                    diagnostic: format!("宛先アドレス不正: {e}"),
                };
            }
        };

        let message = match Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(body.to_string()),
            ) {
            Ok(message) => message,
            Err(e) => {
                return DeliveryOutcome::Rejected {
                    diagnostic: format!("メッセージ構築失敗: {e}"),
                };
            }
        };

        match self.transport.send(message).await {
            Ok(_) => DeliveryOutcome::Delivered,
            Err(e) => DeliveryOutcome::Rejected {
                diagnostic: format!("SMTP 送信失敗: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmtpMailTransport>();
    }

    #[tokio::test]
    async fn 不正な送信元アドレスは診断テキスト付きで失敗する() {
        let transport = SmtpMailTransport::new("localhost", 1025, "不正なアドレス".to_string());

        let outcome = transport
            .send("tanaka@example.com", "件名", "本文")
            .await;

        assert!(!outcome.is_delivered());
        assert!(outcome.diagnostic().unwrap().contains("送信元アドレス不正"));
    }
}
