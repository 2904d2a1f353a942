use crate::domain::ports::{PageSession, SessionFactory};
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 連線到遠端 Chrome DevTools 端點
#[derive(Debug, Clone)]
pub struct ChromeSessionFactory {
    endpoint: String,
    element_wait: Duration,
}

impl ChromeSessionFactory {
    pub fn new(endpoint: impl Into<String>, element_wait: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            element_wait,
        }
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    type Session = ChromeSession;

    async fn connect(&self) -> Result<ChromeSession> {
        tracing::info!("🔌 Connecting to browser at {}", self.endpoint);

        let (browser, mut handler) =
            tokio::time::timeout(CONNECT_TIMEOUT, Browser::connect(self.endpoint.clone()))
                .await
                .map_err(|_| BotError::PageTimeout {
                    operation: format!("connecting to {}", self.endpoint),
                    seconds: CONNECT_TIMEOUT.as_secs(),
                })??;

        // CDP 事件必須持續被消費，連線才會運作
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {}", e);
                }
            }
            tracing::debug!("Browser handler stream ended");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(e.into());
            }
        };

        Ok(ChromeSession {
            _browser: browser,
            page,
            handler_task,
            element_wait: self.element_wait,
        })
    }
}

pub struct ChromeSession {
    _browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    element_wait: Duration,
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        self.page.reload().await?;
        Ok(())
    }

    async fn body_text(&mut self) -> Result<String> {
        let page = &self.page;
        let wait_for_body = async {
            loop {
                match page.find_element("body").await {
                    Ok(body) => return body.inner_text().await,
                    Err(e) => {
                        tracing::trace!("Body element not ready yet: {}", e);
                        tokio::time::sleep(ELEMENT_POLL_INTERVAL).await;
                    }
                }
            }
        };

        let text = tokio::time::timeout(self.element_wait, wait_for_body)
            .await
            .map_err(|_| BotError::PageTimeout {
                operation: "waiting for body element".to_string(),
                seconds: self.element_wait.as_secs(),
            })??;

        Ok(text.unwrap_or_default())
    }

    async fn close(&mut self) -> Result<()> {
        let result = self.page.clone().close().await;
        self.handler_task.abort();
        result.map_err(BotError::from)
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
