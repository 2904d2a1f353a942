use crate::core::retry::RetryPolicy;
use crate::domain::ports::{PageSession, SessionFactory};
use crate::utils::error::{BotError, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub target_url: String,
    /// 導覽或重新整理後等待前端渲染的時間
    pub settle: Duration,
    pub fetch_policy: RetryPolicy,
    pub reconnect_policy: RetryPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    NotLoaded,
    Loaded,
}

/// 獨佔瀏覽器 session 的頁面抓取器
///
/// 重連只在這裡發生：抓取重試用盡時丟棄舊 session 並建立新的。
pub struct PageFetcher<F: SessionFactory> {
    factory: F,
    session: Option<F::Session>,
    page_state: PageState,
    settings: FetchSettings,
}

impl<F: SessionFactory> PageFetcher<F> {
    /// 建立抓取器，session 在第一次 fetch 時才建立
    pub fn new(factory: F, settings: FetchSettings) -> Self {
        Self {
            factory,
            session: None,
            page_state: PageState::NotLoaded,
            settings,
        }
    }

    /// 建立抓取器並立即連線；連線失敗即為啟動失敗
    pub async fn connect(factory: F, settings: FetchSettings) -> Result<Self> {
        let mut fetcher = Self::new(factory, settings);
        let session = fetcher.open_session().await?;
        fetcher.session = Some(session);
        tracing::info!("✅ Browser session established");
        Ok(fetcher)
    }

    pub fn page_state(&self) -> PageState {
        self.page_state
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// 下一次 fetch 改為完整導覽
    pub fn mark_stale(&mut self) {
        self.page_state = PageState::NotLoaded;
    }

    pub async fn fetch(&mut self) -> Result<String> {
        let policy = self.settings.fetch_policy;
        let mut attempt = 1;

        let last_error = loop {
            match self.load_page().await {
                Ok(text) => return Ok(text),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    self.page_state = PageState::NotLoaded;
                    if attempt >= policy.max_attempts {
                        break e;
                    }
                    let delay = policy.delay_after(attempt);
                    tracing::warn!(
                        "⚠️ Page fetch failed (attempt {}/{}): {}, retrying in {:?}",
                        attempt,
                        policy.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        };

        tracing::error!(
            "❌ Page fetch failed after {} attempts: {}",
            policy.max_attempts,
            last_error
        );
        self.reconnect().await?;
        Err(last_error)
    }

    /// 丟棄目前的 session 並建立新的；建立失敗為致命錯誤
    pub async fn reconnect(&mut self) -> Result<()> {
        tracing::warn!("🔄 Reconnecting browser session");
        self.close_session().await;
        self.page_state = PageState::NotLoaded;

        let session = self.open_session().await?;
        self.session = Some(session);
        tracing::info!("✅ Browser session re-established");
        Ok(())
    }

    /// 盡力關閉 session，忽略錯誤
    pub async fn shutdown(&mut self) {
        self.close_session().await;
        self.page_state = PageState::NotLoaded;
    }

    async fn load_page(&mut self) -> Result<String> {
        if self.session.is_none() {
            let session = self.open_session().await?;
            self.session = Some(session);
        }
        let session = self.session.as_mut().ok_or(BotError::SessionUnavailable)?;

        match self.page_state {
            PageState::NotLoaded => {
                tracing::info!("🌐 Performing full page load...");
                session.navigate(&self.settings.target_url).await?;
                tokio::time::sleep(self.settings.settle).await;
                self.page_state = PageState::Loaded;
            }
            PageState::Loaded => {
                tracing::debug!("Refreshing page...");
                session.refresh().await?;
                tokio::time::sleep(self.settings.settle).await;
            }
        }

        tracing::debug!("Waiting for body element...");
        let text = session.body_text().await?;
        let preview: String = text.chars().take(200).collect();
        tracing::debug!("Page content preview: {}", preview);
        Ok(text)
    }

    async fn open_session(&self) -> Result<F::Session> {
        let policy = self.settings.reconnect_policy;
        let factory = &self.factory;
        policy
            .run("browser session creation", || factory.connect())
            .await
            .map_err(|e| BotError::ReconnectExhausted {
                attempts: policy.max_attempts,
                message: e.to_string(),
            })
    }

    async fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close().await {
                tracing::debug!("Ignoring error while closing browser session: {}", e);
            }
        }
    }
}
