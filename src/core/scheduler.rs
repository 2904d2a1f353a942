use crate::config::players::PlayerDirectory;
use crate::core::fetcher::PageFetcher;
use crate::core::notifier::Notifier;
use crate::core::parser::parse_turn_status;
use crate::core::state_machine::decide;
use crate::domain::model::{CycleReport, Decision, NotificationKind, NotificationState};
use crate::domain::ports::{ChatGateway, SessionFactory};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;

/// 週期性執行 fetch → parse → decide → notify
///
/// 以 `&mut self` 執行每個週期，因此同一時間最多只有一個週期在跑，
/// `NotificationState` 也只有這一個寫入者。
pub struct TurnWatcher<F: SessionFactory, G: ChatGateway> {
    fetcher: PageFetcher<F>,
    notifier: Notifier<G>,
    directory: PlayerDirectory,
    state: NotificationState,
    interval: Duration,
}

impl<F: SessionFactory, G: ChatGateway> TurnWatcher<F, G> {
    pub fn new(
        fetcher: PageFetcher<F>,
        notifier: Notifier<G>,
        directory: PlayerDirectory,
        interval: Duration,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            directory,
            state: NotificationState::default(),
            interval,
        }
    }

    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    pub fn fetcher(&self) -> &PageFetcher<F> {
        &self.fetcher
    }

    pub fn notifier(&self) -> &Notifier<G> {
        &self.notifier
    }

    /// 以指定時間執行一個週期，錯誤直接回傳給呼叫端
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> Result<CycleReport> {
        let page_text = self.fetcher.fetch().await?;
        let status = parse_turn_status(&page_text);
        let previous = self.state.last_active_player.clone();
        let decision = decide(&status, &mut self.state, now);

        let deliveries = match &decision {
            Decision::Notify(notification) => {
                match notification.kind {
                    NotificationKind::TurnChanged => tracing::info!(
                        "🔔 Turn changed: {} -> {}",
                        previous.as_deref().unwrap_or("None"),
                        notification.player
                    ),
                    NotificationKind::Reminder { hours_waiting } => tracing::info!(
                        "⏰ Sending 24h reminder for {} ({}h)",
                        notification.player,
                        hours_waiting
                    ),
                }
                let mention = self.directory.mention(&notification.player);
                self.notifier.notify(&notification.render(&mention)).await
            }
            Decision::NoTurnInfo => {
                tracing::info!("No turn information found");
                Vec::new()
            }
            Decision::FirstObservation => {
                tracing::info!(
                    "Still {}'s turn. Reminder timer started",
                    status.active_player.as_deref().unwrap_or_default()
                );
                Vec::new()
            }
            Decision::CoolingDown { hours_until_next } => {
                tracing::info!(
                    "Still {}'s turn. Next reminder in {:.1}h",
                    status.active_player.as_deref().unwrap_or_default(),
                    hours_until_next
                );
                Vec::new()
            }
        };

        Ok(CycleReport {
            status,
            decision,
            deliveries,
        })
    }

    /// 執行一個週期；非致命錯誤只記錄並讓下一個週期完整重新載入
    pub async fn tick(&mut self) -> Result<Option<CycleReport>> {
        match self.run_cycle_at(Utc::now()).await {
            Ok(report) => Ok(Some(report)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::error!(
                    "❌ Error checking turn: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                self.fetcher.mark_stale();
                Ok(None)
            }
        }
    }

    /// 等待聊天客戶端就緒後只跑一個週期，然後關閉瀏覽器 session
    pub async fn run_once(&mut self) -> Result<Option<CycleReport>> {
        let result = match self.notifier.wait_until_ready().await {
            Ok(()) => self.tick().await,
            Err(e) => Err(e),
        };
        self.fetcher.shutdown().await;
        result
    }

    /// 持續執行直到 shutdown 完成或發生致命錯誤
    ///
    /// 每個週期結束後等待 `interval` 再開始下一個。週期進行中收到 shutdown
    /// 會先記錄，待該週期完成後才停止。
    pub async fn run<S>(&mut self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let ready = tokio::select! {
            result = self.notifier.wait_until_ready() => Some(result),
            _ = &mut shutdown => None,
        };
        match ready {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                self.fetcher.shutdown().await;
                return Err(e);
            }
            None => {
                tracing::info!("🛑 Shutdown requested before chat client was ready");
                self.fetcher.shutdown().await;
                return Ok(());
            }
        }

        tracing::info!(
            "🚀 Checking turn every {:?} for {} targets",
            self.interval,
            self.notifier.targets().len()
        );

        // 週期結束後才開始計時，週期之間至少間隔 interval
        let mut stopping = false;
        let result = loop {
            let outcome = {
                let cycle = self.tick();
                tokio::pin!(cycle);
                loop {
                    tokio::select! {
                        outcome = &mut cycle => break outcome,
                        _ = &mut shutdown, if !stopping => {
                            tracing::info!("🛑 Shutdown requested, finishing current cycle");
                            stopping = true;
                        }
                    }
                }
            };
            if let Err(e) = outcome {
                tracing::error!("❌ Unrecoverable failure, stopping: {}", e);
                break Err(e);
            }
            if stopping {
                break Ok(());
            }

            let stop = tokio::select! {
                _ = &mut shutdown => true,
                _ = tokio::time::sleep(self.interval) => false,
            };
            if stop {
                tracing::info!("🛑 Shutdown requested");
                break Ok(());
            }
        };

        self.fetcher.shutdown().await;
        result
    }
}
