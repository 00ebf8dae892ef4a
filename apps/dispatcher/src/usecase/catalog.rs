//! # カタログサービス（読み出し系）
//!
//! 受信者・メッセージの一覧と所有者別の配信統計を提供する。
//!
//! 一覧はリスティングキャッシュ経由で読む（キャッシュ無効時は DB 直接
//! 読み出しに退化する）。ディスパッチエンジンとは独立した読み出し専用の
//! 経路であり、ディスパッチ側は常にライブデータを読む。

use std::sync::Arc;

use mailcast_domain::{message::Message, recipient::Recipient, user::UserId};
use mailcast_infra::{
    InfraError,
    cache::ListingCache,
    repository::{AttemptRepository, AttemptStats, MessageRepository, RecipientRepository},
};
use mailcast_shared::{event_log::event, log_business_event};

/// 受信者一覧のキャッシュキー
const RECIPIENT_LIST_KEY: &str = "recipient_list";
/// メッセージ一覧のキャッシュキー
const MESSAGE_LIST_KEY: &str = "message_list";

/// カタログサービス
pub struct CatalogService {
    recipients: Arc<dyn RecipientRepository>,
    messages:   Arc<dyn MessageRepository>,
    attempts:   Arc<dyn AttemptRepository>,
    cache:      ListingCache,
}

impl CatalogService {
    pub fn new(
        recipients: Arc<dyn RecipientRepository>,
        messages: Arc<dyn MessageRepository>,
        attempts: Arc<dyn AttemptRepository>,
        cache: ListingCache,
    ) -> Self {
        Self {
            recipients,
            messages,
            attempts,
            cache,
        }
    }

    /// 全受信者の一覧（キャッシュ経由）
    pub async fn list_recipients(&self) -> Result<Vec<Recipient>, InfraError> {
        let recipients = self
            .cache
            .get_or_populate(RECIPIENT_LIST_KEY, || self.recipients.list_all())
            .await?;

        log_business_event!(
            event.category = event::category::CACHE,
            event.action = "catalog.list_recipients",
            event.result = event::result::SUCCESS,
            count = recipients.len(),
            "受信者一覧を取得"
        );
        Ok(recipients)
    }

    /// 全メッセージの一覧（キャッシュ経由）
    pub async fn list_messages(&self) -> Result<Vec<Message>, InfraError> {
        let messages = self
            .cache
            .get_or_populate(MESSAGE_LIST_KEY, || self.messages.list_all())
            .await?;

        log_business_event!(
            event.category = event::category::CACHE,
            event.action = "catalog.list_messages",
            event.result = event::result::SUCCESS,
            count = messages.len(),
            "メッセージ一覧を取得"
        );
        Ok(messages)
    }

    /// 所有者別の配信試行統計
    ///
    /// 所有キャンペーンに属する全試行を成功・失敗で集計する。
    /// 統計は鮮度が重要なためキャッシュを経由しない。
    pub async fn owner_stats(&self, owner_id: &UserId) -> Result<AttemptStats, InfraError> {
        self.attempts.stats_by_owner(owner_id).await
    }
}
