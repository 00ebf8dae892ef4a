//! # テスト用モック実装
//!
//! ユースケーステストで使用するインメモリのリポジトリ・トランスポート実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! mailcast-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use mailcast_domain::{
    attempt::{Attempt, AttemptId, AttemptStatus},
    campaign::{Campaign, CampaignId, CampaignStatus},
    message::{Message, MessageId},
    recipient::Recipient,
    user::UserId,
};

use crate::{
    error::InfraError,
    repository::{
        AttemptRepository,
        AttemptStats,
        CampaignRepository,
        MessageRepository,
        RecipientRepository,
    },
    transport::{DeliveryOutcome, MailTransport},
};

// ===== MockCampaignRepository =====

#[derive(Clone, Default)]
pub struct MockCampaignRepository {
    campaigns:      Arc<Mutex<Vec<Campaign>>>,
    status_history: Arc<Mutex<Vec<(CampaignId, CampaignStatus)>>>,
}

impl MockCampaignRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_campaign(&self, campaign: Campaign) {
        self.campaigns.lock().unwrap().push(campaign);
    }

    /// 保存されているキャンペーンの現在のステータス
    pub fn status_of(&self, id: &CampaignId) -> Option<CampaignStatus> {
        self.campaigns
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .map(Campaign::status)
    }

    /// `update_status` が呼ばれた順序の記録
    ///
    /// 「`started` は最初の送信より前に永続化される」という順序性の検証に使う。
    pub fn status_history(&self) -> Vec<(CampaignId, CampaignStatus)> {
        self.status_history.lock().unwrap().clone()
    }
}

#[async_trait]
impl CampaignRepository for MockCampaignRepository {
    async fn find_by_id(&self, id: &CampaignId) -> Result<Option<Campaign>, InfraError> {
        Ok(self
            .campaigns
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned())
    }

    async fn find_created_ids(&self) -> Result<Vec<CampaignId>, InfraError> {
        Ok(self
            .campaigns
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.status() == CampaignStatus::Created)
            .map(|c| c.id().clone())
            .collect())
    }

    async fn update_status(
        &self,
        id: &CampaignId,
        status: CampaignStatus,
    ) -> Result<(), InfraError> {
        let mut campaigns = self.campaigns.lock().unwrap();
        let Some(campaign) = campaigns.iter_mut().find(|c| c.id() == id) else {
            return Err(InfraError::conflict("Campaign", id.to_string()));
        };

        *campaign = Campaign::from_record(
            campaign.id().clone(),
            campaign.owner_id().clone(),
            campaign.message_id().clone(),
            campaign.start_time(),
            campaign.end_time(),
            status,
        );
        self.status_history
            .lock()
            .unwrap()
            .push((id.clone(), status));
        Ok(())
    }
}

// ===== MockRecipientRepository =====

#[derive(Clone, Default)]
pub struct MockRecipientRepository {
    recipients:  Arc<Mutex<Vec<Recipient>>>,
    memberships: Arc<Mutex<HashMap<CampaignId, Vec<Recipient>>>>,
}

impl MockRecipientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_recipient(&self, recipient: Recipient) {
        self.recipients.lock().unwrap().push(recipient);
    }

    /// 受信者をキャンペーンの受信者集合に追加する
    pub fn add_to_campaign(&self, campaign_id: &CampaignId, recipient: Recipient) {
        self.recipients.lock().unwrap().push(recipient.clone());
        self.memberships
            .lock()
            .unwrap()
            .entry(campaign_id.clone())
            .or_default()
            .push(recipient);
    }
}

#[async_trait]
impl RecipientRepository for MockRecipientRepository {
    async fn find_by_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<Recipient>, InfraError> {
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .get(campaign_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_all(&self) -> Result<Vec<Recipient>, InfraError> {
        Ok(self.recipients.lock().unwrap().clone())
    }
}

// ===== MockMessageRepository =====

#[derive(Clone, Default)]
pub struct MockMessageRepository {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl MockMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&self, message: Message) {
        self.messages.lock().unwrap().push(message);
    }
}

#[async_trait]
impl MessageRepository for MockMessageRepository {
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, InfraError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id() == id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Message>, InfraError> {
        Ok(self.messages.lock().unwrap().clone())
    }
}

// ===== MockAttemptRepository =====

#[derive(Clone, Default)]
pub struct MockAttemptRepository {
    attempts: Arc<Mutex<Vec<Attempt>>>,
    owners:   Arc<Mutex<HashMap<CampaignId, UserId>>>,
}

impl MockAttemptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録された全試行のスナップショット
    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts.lock().unwrap().clone()
    }

    /// `stats_by_owner` 用にキャンペーンの所有者を登録する
    pub fn set_owner(&self, campaign_id: &CampaignId, owner_id: &UserId) {
        self.owners
            .lock()
            .unwrap()
            .insert(campaign_id.clone(), owner_id.clone());
    }
}

#[async_trait]
impl AttemptRepository for MockAttemptRepository {
    async fn insert(&self, attempt: &Attempt) -> Result<AttemptId, InfraError> {
        self.attempts.lock().unwrap().push(attempt.clone());
        Ok(attempt.id().clone())
    }

    async fn count_by_campaign(&self, campaign_id: &CampaignId) -> Result<i64, InfraError> {
        Ok(self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.campaign_id() == campaign_id)
            .count() as i64)
    }

    async fn stats_by_owner(&self, owner_id: &UserId) -> Result<AttemptStats, InfraError> {
        let owners = self.owners.lock().unwrap();
        let attempts = self.attempts.lock().unwrap();

        let mut stats = AttemptStats::default();
        for attempt in attempts.iter() {
            if owners.get(attempt.campaign_id()) != Some(owner_id) {
                continue;
            }
            match attempt.status() {
                AttemptStatus::Success => stats.successful += 1,
                AttemptStatus::Failed => stats.failed += 1,
            }
        }
        Ok(stats)
    }
}

// ===== MockMailTransport =====

/// モックトランスポートが記録する送信内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub address: String,
    pub subject: String,
    pub body:    String,
}

/// スクリプト可能なモックトランスポート
///
/// `fail_for` で登録したアドレスへの送信は診断テキスト付きで失敗する。
/// それ以外は成功する。すべての送信は記録され、`sent()` で取得できる。
#[derive(Clone, Default)]
pub struct MockMailTransport {
    fail_addresses: Arc<Mutex<HashSet<String>>>,
    sent:           Arc<Mutex<Vec<SentMail>>>,
}

impl MockMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定アドレスへの送信を失敗させる
    pub fn fail_for(&self, address: impl Into<String>) {
        self.fail_addresses.lock().unwrap().insert(address.into());
    }

    /// 記録された送信のスナップショット
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for MockMailTransport {
    async fn send(&self, address: &str, subject: &str, body: &str) -> DeliveryOutcome {
        self.sent.lock().unwrap().push(SentMail {
            address: address.to_string(),
            subject: subject.to_string(),
            body:    body.to_string(),
        });

        if self.fail_addresses.lock().unwrap().contains(address) {
            DeliveryOutcome::Rejected {
                diagnostic: format!("SMTP 送信失敗: 550 mailbox unavailable: {address}"),
            }
        } else {
            DeliveryOutcome::Delivered
        }
    }
}
