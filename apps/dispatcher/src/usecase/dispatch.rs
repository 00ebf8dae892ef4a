//! # ディスパッチエンジン
//!
//! キャンペーンを端から端まで実行する: ステータス遷移 → 受信者ごとの送信と
//! 試行記録 → 完了遷移。
//!
//! ## 設計方針
//!
//! - **冪等な no-op**: `completed` のキャンペーンは送信も試行記録も行わない
//! - **クラッシュ可視性**: `started` は最初の送信より前に永続化される。
//!   途中クラッシュしたキャンペーンは `created` ではなく `started` として残る
//! - **短絡なし**: 受信者 1 人の失敗は後続の受信者の処理を中断しない。
//!   部分失敗は試行レコードにのみ記録され、キャンペーンは `completed` に到達する
//! - **型付きエラー**: キャンペーン未発見や DB 障害は [`DispatchError`] として
//!   呼び出し元に返る。握りつぶしはスケジューラループ境界（[`run_pending`]）
//!   でのみ行い、1 件の失敗がプロセス全体を止めないようにする
//! - **at-least-once**: `started` のまま残ったキャンペーンの再実行は全受信者に
//!   再送し、処理済み受信者にも重複した試行を追記する（クラッシュ回復時の
//!   既知の配信保証、DESIGN.md 参照）
//!
//! [`run_pending`]: DispatchService::run_pending

use std::sync::Arc;

use mailcast_domain::{
    DomainError,
    attempt::Attempt,
    campaign::CampaignId,
    clock::Clock,
};
use mailcast_infra::{
    InfraError,
    repository::{AttemptRepository, CampaignRepository, MessageRepository, RecipientRepository},
    transport::{DeliveryOutcome, MailTransport},
};
use mailcast_shared::{event_log::event, log_business_event};
use thiserror::Error;

/// ディスパッチ 1 回の呼び出しで発生するエラー
///
/// 1 回のディスパッチ呼び出しに対してのみ終端的であり、
/// スケジューラプロセス全体を停止させることはない。
#[derive(Debug, Error)]
pub enum DispatchError {
    /// 対象エンティティが見つからない
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        entity_type: &'static str,
        id:          String,
    },

    /// ドメイン不変条件の違反
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// インフラ層のエラー（DB 障害等）
    #[error(transparent)]
    Infra(#[from] InfraError),
}

/// ディスパッチ 1 回の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// すでに完了済みのため何もしなかった（冪等な no-op）
    AlreadyCompleted,
    /// 全受信者を処理して完了した
    Completed(DispatchSummary),
}

/// 受信者ごとの処理結果の集計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchSummary {
    /// 処理した受信者数（= 作成された試行数）
    pub attempted: usize,
    /// 送信に成功した受信者数
    pub succeeded: usize,
    /// 送信に失敗した受信者数
    pub failed:    usize,
}

/// スケジューラ 1 回の実行結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// 完了まで処理したキャンペーン数
    pub dispatched: usize,
    /// エラーで打ち切られたキャンペーン数
    pub failed:     usize,
}

/// ディスパッチエンジン
///
/// リポジトリとトランスポートはトレイト経由で注入される。
/// ディスパッチ経路は常にライブデータを読み、リスティングキャッシュを
/// 一切参照しない。権限チェック（所有者・管理者）は呼び出し側の責務。
pub struct DispatchService {
    campaigns:  Arc<dyn CampaignRepository>,
    recipients: Arc<dyn RecipientRepository>,
    messages:   Arc<dyn MessageRepository>,
    attempts:   Arc<dyn AttemptRepository>,
    transport:  Arc<dyn MailTransport>,
    clock:      Arc<dyn Clock>,
}

impl DispatchService {
    pub fn new(
        campaigns: Arc<dyn CampaignRepository>,
        recipients: Arc<dyn RecipientRepository>,
        messages: Arc<dyn MessageRepository>,
        attempts: Arc<dyn AttemptRepository>,
        transport: Arc<dyn MailTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            campaigns,
            recipients,
            messages,
            attempts,
            transport,
            clock,
        }
    }

    /// キャンペーンを 1 件ディスパッチする
    ///
    /// # 処理順序
    ///
    /// 1. キャンペーンを取得（未発見は [`DispatchError::NotFound`]）
    /// 2. `completed` なら即座に no-op で返る
    /// 3. `started` へ遷移して永続化（最初の送信より前）
    /// 4. 受信者集合をスナップショットし、1 人ずつ送信して試行を追記
    /// 5. `completed` へ遷移して永続化
    #[tracing::instrument(skip(self), fields(campaign_id = %campaign_id))]
    pub async fn dispatch(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(mut campaign) = self.campaigns.find_by_id(campaign_id).await? else {
            return Err(DispatchError::NotFound {
                entity_type: "Campaign",
                id:          campaign_id.to_string(),
            });
        };

        if campaign.is_completed() {
            log_business_event!(
                event.category = event::category::CAMPAIGN,
                event.action = event::action::DISPATCH_SKIPPED,
                event.entity_type = event::entity_type::CAMPAIGN,
                event.entity_id = %campaign_id,
                event.result = event::result::SUCCESS,
                "完了済みキャンペーンをスキップ"
            );
            return Ok(DispatchOutcome::AlreadyCompleted);
        }

        campaign.start()?;
        self.campaigns
            .update_status(campaign_id, campaign.status())
            .await?;

        log_business_event!(
            event.category = event::category::CAMPAIGN,
            event.action = event::action::DISPATCH_STARTED,
            event.entity_type = event::entity_type::CAMPAIGN,
            event.entity_id = %campaign_id,
            event.result = event::result::SUCCESS,
            "キャンペーンのディスパッチを開始"
        );

        let message_id = campaign.message_id().clone();
        let Some(message) = self.messages.find_by_id(&message_id).await? else {
            return Err(DispatchError::NotFound {
                entity_type: "Message",
                id:          message_id.to_string(),
            });
        };

        // ディスパッチ開始時点のスナップショット。
        // 以降に追加された受信者が含まれる保証はない。
        let recipients = self.recipients.find_by_campaign(campaign_id).await?;

        let mut summary = DispatchSummary::default();
        for recipient in &recipients {
            let outcome = self
                .transport
                .send(
                    recipient.email().as_str(),
                    message.subject().as_str(),
                    message.body(),
                )
                .await;

            let attempt = match outcome {
                DeliveryOutcome::Delivered => {
                    summary.succeeded += 1;
                    log_business_event!(
                        event.category = event::category::DELIVERY,
                        event.action = event::action::SEND_SUCCEEDED,
                        event.entity_type = event::entity_type::RECIPIENT,
                        event.result = event::result::SUCCESS,
                        campaign.id = %campaign_id,
                        recipient.email = %recipient.email(),
                        "メール送信成功"
                    );
                    Attempt::success(
                        campaign_id.clone(),
                        recipient.email().clone(),
                        self.clock.now(),
                    )
                }
                DeliveryOutcome::Rejected { diagnostic } => {
                    summary.failed += 1;
                    log_business_event!(
                        event.category = event::category::DELIVERY,
                        event.action = event::action::SEND_FAILED,
                        event.entity_type = event::entity_type::RECIPIENT,
                        event.result = event::result::FAILURE,
                        campaign.id = %campaign_id,
                        recipient.email = %recipient.email(),
                        error = %diagnostic,
                        "メール送信失敗"
                    );
                    Attempt::failure(
                        campaign_id.clone(),
                        recipient.email().clone(),
                        diagnostic,
                        self.clock.now(),
                    )?
                }
            };

            self.attempts.insert(&attempt).await?;
            summary.attempted += 1;
        }

        campaign.complete()?;
        self.campaigns
            .update_status(campaign_id, campaign.status())
            .await?;

        log_business_event!(
            event.category = event::category::CAMPAIGN,
            event.action = event::action::DISPATCH_COMPLETED,
            event.entity_type = event::entity_type::CAMPAIGN,
            event.entity_id = %campaign_id,
            event.result = event::result::SUCCESS,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "キャンペーンのディスパッチを完了"
        );

        Ok(DispatchOutcome::Completed(summary))
    }

    /// ステータスが `created` の全キャンペーンを順番にディスパッチする
    ///
    /// 定期スケジューラのエントリポイント。1 件ずつ完了まで処理してから
    /// 次に進む。個々のキャンペーンのエラーはログに記録して続行し、
    /// スケジューラプロセス全体は決して停止させない。
    ///
    /// # エラー
    ///
    /// 対象キャンペーンの列挙自体に失敗した場合のみエラーを返す。
    pub async fn run_pending(&self) -> Result<RunSummary, InfraError> {
        let campaign_ids = self.campaigns.find_created_ids().await?;

        let mut summary = RunSummary::default();
        for campaign_id in &campaign_ids {
            match self.dispatch(campaign_id).await {
                Ok(_) => summary.dispatched += 1,
                Err(e) => {
                    // 1 件の失敗は次のキャンペーンの処理を妨げない
                    tracing::error!(
                        campaign_id = %campaign_id,
                        error = %e,
                        "キャンペーンのディスパッチに失敗"
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use mailcast_domain::{
        attempt::AttemptStatus,
        campaign::{Campaign, CampaignStatus, NewCampaign},
        clock::FixedClock,
        message::{Message, MessageId, NewMessage, SubjectLine},
        recipient::{Email, FullName, NewRecipient, Recipient, RecipientId},
        user::UserId,
    };
    use mailcast_infra::mock::{
        MockAttemptRepository,
        MockCampaignRepository,
        MockMailTransport,
        MockMessageRepository,
        MockRecipientRepository,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn test_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn make_recipient(email: &str) -> Recipient {
        Recipient::new(NewRecipient {
            id:        RecipientId::new(),
            owner_id:  UserId::new(),
            email:     Email::new(email).unwrap(),
            full_name: FullName::new("テスト受信者").unwrap(),
            comment:   None,
        })
    }

    fn make_message() -> Message {
        Message::new(NewMessage {
            id:       MessageId::new(),
            owner_id: UserId::new(),
            subject:  SubjectLine::new("8月のお知らせ").unwrap(),
            body:     "いつもご利用ありがとうございます。".to_string(),
        })
    }

    fn make_campaign(message_id: &MessageId) -> Campaign {
        Campaign::new(NewCampaign {
            id:         CampaignId::new(),
            owner_id:   UserId::new(),
            message_id: message_id.clone(),
            start_time: test_now(),
            end_time:   test_now() + chrono::Duration::hours(1),
        })
        .unwrap()
    }

    struct Fixture {
        campaigns:  MockCampaignRepository,
        recipients: MockRecipientRepository,
        messages:   MockMessageRepository,
        attempts:   MockAttemptRepository,
        transport:  MockMailTransport,
        service:    DispatchService,
    }

    fn make_fixture() -> Fixture {
        let campaigns = MockCampaignRepository::new();
        let recipients = MockRecipientRepository::new();
        let messages = MockMessageRepository::new();
        let attempts = MockAttemptRepository::new();
        let transport = MockMailTransport::new();

        let service = DispatchService::new(
            Arc::new(campaigns.clone()),
            Arc::new(recipients.clone()),
            Arc::new(messages.clone()),
            Arc::new(attempts.clone()),
            Arc::new(transport.clone()),
            Arc::new(FixedClock::new(test_now())),
        );

        Fixture {
            campaigns,
            recipients,
            messages,
            attempts,
            transport,
            service,
        }
    }

    /// メッセージ 1 件・受信者 N 人のキャンペーンをセットアップする
    fn seed_campaign(fixture: &Fixture, recipient_emails: &[&str]) -> CampaignId {
        let message = make_message();
        let campaign = make_campaign(message.id());
        let campaign_id = campaign.id().clone();

        fixture.messages.add_message(message);
        fixture.campaigns.add_campaign(campaign);
        for email in recipient_emails {
            fixture
                .recipients
                .add_to_campaign(&campaign_id, make_recipient(email));
        }

        campaign_id
    }

    // ===== 正常系 =====

    #[tokio::test]
    async fn 全受信者への送信が成功するとcompletedになり試行数は受信者数と一致する() {
        let fixture = make_fixture();
        let campaign_id = seed_campaign(&fixture, &["a@example.com", "b@example.com"]);

        let outcome = fixture.service.dispatch(&campaign_id).await.unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Completed(DispatchSummary {
                attempted: 2,
                succeeded: 2,
                failed:    0,
            })
        );
        assert_eq!(
            fixture.campaigns.status_of(&campaign_id),
            Some(CampaignStatus::Completed)
        );

        let attempts = fixture.attempts.attempts();
        assert_eq!(attempts.len(), 2);
        for attempt in &attempts {
            assert_eq!(attempt.status(), AttemptStatus::Success);
            assert!(attempt.server_response().is_none());
            assert_eq!(attempt.attempted_at(), test_now());
        }
    }

    #[tokio::test]
    async fn 送信内容はメッセージの件名と本文を使用する() {
        let fixture = make_fixture();
        let campaign_id = seed_campaign(&fixture, &["a@example.com"]);

        fixture.service.dispatch(&campaign_id).await.unwrap();

        let sent = fixture.transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].address, "a@example.com");
        assert_eq!(sent[0].subject, "8月のお知らせ");
        assert_eq!(sent[0].body, "いつもご利用ありがとうございます。");
    }

    #[tokio::test]
    async fn startedは最初の送信より前に永続化される() {
        let fixture = make_fixture();
        let campaign_id = seed_campaign(&fixture, &["a@example.com"]);

        fixture.service.dispatch(&campaign_id).await.unwrap();

        // 更新順序: started → completed（started が先にコミットされることで
        // 途中クラッシュ時に created のまま残らない）
        let history = fixture.campaigns.status_history();
        assert_eq!(
            history,
            vec![
                (campaign_id.clone(), CampaignStatus::Started),
                (campaign_id.clone(), CampaignStatus::Completed),
            ]
        );
    }

    // ===== 部分失敗 =====

    #[tokio::test]
    async fn 一部の受信者が失敗してもキャンペーンはcompletedに到達する() {
        let fixture = make_fixture();
        let campaign_id = seed_campaign(&fixture, &["a@example.com", "b@example.com"]);
        fixture.transport.fail_for("b@example.com");

        let outcome = fixture.service.dispatch(&campaign_id).await.unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Completed(DispatchSummary {
                attempted: 2,
                succeeded: 1,
                failed:    1,
            })
        );
        assert_eq!(
            fixture.campaigns.status_of(&campaign_id),
            Some(CampaignStatus::Completed)
        );

        let attempts = fixture.attempts.attempts();
        assert_eq!(attempts.len(), 2);

        let success: Vec<_> = attempts
            .iter()
            .filter(|a| a.status() == AttemptStatus::Success)
            .collect();
        assert_eq!(success.len(), 1);
        assert_eq!(success[0].recipient_email().as_str(), "a@example.com");
        assert!(success[0].server_response().is_none());

        let failed: Vec<_> = attempts
            .iter()
            .filter(|a| a.status() == AttemptStatus::Failed)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].recipient_email().as_str(), "b@example.com");
        let diagnostic = failed[0].server_response().unwrap();
        assert!(!diagnostic.is_empty());
        assert!(diagnostic.contains("b@example.com"));
    }

    #[tokio::test]
    async fn 受信者の失敗は後続の受信者の処理を中断しない() {
        let fixture = make_fixture();
        let campaign_id = seed_campaign(
            &fixture,
            &["a@example.com", "b@example.com", "c@example.com"],
        );
        fixture.transport.fail_for("b@example.com");

        fixture.service.dispatch(&campaign_id).await.unwrap();

        // 失敗した b の後の c にも送信されている
        assert_eq!(fixture.transport.sent().len(), 3);
        assert_eq!(fixture.attempts.attempts().len(), 3);
    }

    // ===== 冪等性 =====

    #[tokio::test]
    async fn completedのキャンペーンの再ディスパッチはno_opになる() {
        let fixture = make_fixture();
        let campaign_id = seed_campaign(&fixture, &["a@example.com", "b@example.com"]);

        // 1 回目: 通常のディスパッチ（試行 2 件）
        fixture.service.dispatch(&campaign_id).await.unwrap();
        assert_eq!(fixture.attempts.attempts().len(), 2);

        // 2 回目: no-op（送信なし・試行の追記なし・ステータス不変）
        let outcome = fixture.service.dispatch(&campaign_id).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::AlreadyCompleted);
        assert_eq!(fixture.attempts.attempts().len(), 2);
        assert_eq!(fixture.transport.sent().len(), 2);
        assert_eq!(
            fixture.campaigns.status_of(&campaign_id),
            Some(CampaignStatus::Completed)
        );
    }

    #[tokio::test]
    async fn startedのまま残ったキャンペーンの再実行は全受信者に再送する() {
        let fixture = make_fixture();
        let campaign_id = seed_campaign(&fixture, &["a@example.com", "b@example.com"]);

        // 途中クラッシュを再現: started のまま残す
        fixture
            .campaigns
            .update_status(&campaign_id, CampaignStatus::Started)
            .await
            .unwrap();

        let outcome = fixture.service.dispatch(&campaign_id).await.unwrap();

        // at-least-once: 全受信者に再送され、試行が追記される
        assert_eq!(
            outcome,
            DispatchOutcome::Completed(DispatchSummary {
                attempted: 2,
                succeeded: 2,
                failed:    0,
            })
        );
        assert_eq!(
            fixture.campaigns.status_of(&campaign_id),
            Some(CampaignStatus::Completed)
        );
    }

    // ===== 境界値 =====

    #[tokio::test]
    async fn 受信者が空のキャンペーンは試行ゼロでcompletedに遷移する() {
        let fixture = make_fixture();
        let campaign_id = seed_campaign(&fixture, &[]);

        let outcome = fixture.service.dispatch(&campaign_id).await.unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Completed(DispatchSummary::default())
        );
        assert_eq!(fixture.attempts.attempts().len(), 0);
        assert_eq!(
            fixture.campaigns.status_of(&campaign_id),
            Some(CampaignStatus::Completed)
        );
    }

    // ===== エラー系 =====

    #[tokio::test]
    async fn 存在しないキャンペーンはnot_foundエラーになる() {
        let fixture = make_fixture();
        let unknown_id = CampaignId::new();

        let result = fixture.service.dispatch(&unknown_id).await;

        assert!(matches!(
            result,
            Err(DispatchError::NotFound {
                entity_type: "Campaign",
                ..
            })
        ));
        assert_eq!(fixture.transport.sent().len(), 0);
        assert_eq!(fixture.attempts.attempts().len(), 0);
    }

    #[tokio::test]
    async fn メッセージが存在しないキャンペーンはnot_foundエラーになる() {
        let fixture = make_fixture();
        let campaign = make_campaign(&MessageId::new());
        let campaign_id = campaign.id().clone();
        fixture.campaigns.add_campaign(campaign);

        let result = fixture.service.dispatch(&campaign_id).await;

        assert!(matches!(
            result,
            Err(DispatchError::NotFound {
                entity_type: "Message",
                ..
            })
        ));
        assert_eq!(fixture.attempts.attempts().len(), 0);
    }

    // ===== スケジューラループ =====

    #[tokio::test]
    async fn run_pendingはcreatedのキャンペーンのみを処理する() {
        let fixture = make_fixture();
        let created_id = seed_campaign(&fixture, &["a@example.com"]);
        let completed_id = seed_campaign(&fixture, &["b@example.com"]);
        fixture
            .campaigns
            .update_status(&completed_id, CampaignStatus::Completed)
            .await
            .unwrap();

        let summary = fixture.service.run_pending().await.unwrap();

        assert_eq!(summary.dispatched, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(
            fixture.campaigns.status_of(&created_id),
            Some(CampaignStatus::Completed)
        );
        // completed のキャンペーンには送信されない
        assert_eq!(fixture.transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn run_pendingは1件の失敗で停止せず後続のキャンペーンを処理する() {
        let fixture = make_fixture();

        // メッセージのないキャンペーン（ディスパッチは NotFound で失敗する）
        let broken = make_campaign(&MessageId::new());
        fixture.campaigns.add_campaign(broken);

        let healthy_id = seed_campaign(&fixture, &["a@example.com"]);

        let summary = fixture.service.run_pending().await.unwrap();

        assert_eq!(summary.dispatched, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            fixture.campaigns.status_of(&healthy_id),
            Some(CampaignStatus::Completed)
        );
    }
}
