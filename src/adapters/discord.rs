use crate::core::retry::RetryPolicy;
use crate::domain::model::Destination;
use crate::domain::ports::ChatGateway;
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// `/users/@me/guilds` 每頁最多回傳的數量
const GUILD_PAGE_SIZE: usize = 200;

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct DiscordGuild {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiscordChannel {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActiveThreads {
    #[serde(default)]
    threads: Vec<DiscordChannel>,
}

#[derive(Debug, Deserialize)]
struct RateLimitBody {
    retry_after: f64,
}

impl DiscordChannel {
    fn into_destination(self, fallback_id: u64) -> Destination {
        let id = self.id.parse().unwrap_or(fallback_id);
        Destination {
            id,
            name: self.name.unwrap_or_else(|| self.id.clone()),
        }
    }
}

/// Discord REST API 的 `ChatGateway` 實作
pub struct DiscordGateway {
    client: Client,
    api_base: String,
    token: String,
    ready_policy: RetryPolicy,
}

impl DiscordGateway {
    pub fn new(token: &str, api_base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(
                "DiscordBot (https://github.com/turn-notifier, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
            ready_policy: RetryPolicy::exponential(
                5,
                Duration::from_secs(2),
                Duration::from_secs(60),
            ),
        })
    }

    pub fn with_ready_policy(mut self, policy: RetryPolicy) -> Self {
        self.ready_policy = policy;
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base, path);
        self.client
            .request(method, &url)
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
    }

    /// 將非成功的狀態碼轉成對應的錯誤
    async fn check_response(&self, resp: Response, target: u64) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to read error body: {}", e);
            String::new()
        });

        match status {
            StatusCode::UNAUTHORIZED => Err(BotError::Unauthorized),
            StatusCode::FORBIDDEN => Err(BotError::PermissionDenied { target }),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = serde_json::from_str::<RateLimitBody>(&text)
                    .map(|body| body.retry_after.ceil().max(1.0) as u64)
                    .unwrap_or(5);
                Err(BotError::RateLimited { retry_after_secs })
            }
            _ => Err(BotError::ChatApiError {
                status: status.as_u16(),
                message: text,
            }),
        }
    }

    async fn current_user(&self) -> Result<DiscordUser> {
        let resp = self.request(Method::GET, "/users/@me").send().await?;
        let resp = self.check_response(resp, 0).await?;
        Ok(resp.json().await?)
    }

    /// 以 `after` 分頁取得所有伺服器
    async fn guilds(&self) -> Result<Vec<DiscordGuild>> {
        let mut guilds = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut request = self
                .request(Method::GET, "/users/@me/guilds")
                .query(&[("limit", GUILD_PAGE_SIZE.to_string())]);
            if let Some(after) = &after {
                request = request.query(&[("after", after)]);
            }
            let resp = self.check_response(request.send().await?, 0).await?;
            let page: Vec<DiscordGuild> = resp.json().await?;

            let full = page.len() >= GUILD_PAGE_SIZE;
            after = page.last().map(|guild| guild.id.clone());
            guilds.extend(page);
            if !full || after.is_none() {
                break;
            }
        }
        Ok(guilds)
    }

    async fn active_threads(&self, guild: &DiscordGuild) -> Result<Vec<DiscordChannel>> {
        let path = format!("/guilds/{}/threads/active", guild.id);
        let resp = self.request(Method::GET, &path).send().await?;
        let resp = self.check_response(resp, 0).await?;
        let body: ActiveThreads = resp.json().await?;
        Ok(body.threads)
    }
}

#[async_trait]
impl ChatGateway for DiscordGateway {
    async fn wait_until_ready(&self) -> Result<()> {
        let user = self
            .ready_policy
            .run("Discord login", || self.current_user())
            .await?;
        tracing::info!("🤖 Bot {} ({}) has connected to Discord", user.username, user.id);
        Ok(())
    }

    async fn resolve_channel(&self, id: u64) -> Result<Option<Destination>> {
        let resp = self
            .request(Method::GET, &format!("/channels/{}", id))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = self.check_response(resp, id).await?;
        let channel: DiscordChannel = resp.json().await?;
        Ok(Some(channel.into_destination(id)))
    }

    async fn find_thread(&self, id: u64) -> Result<Option<Destination>> {
        let wanted = id.to_string();
        for guild in self.guilds().await? {
            let threads = match self.active_threads(&guild).await {
                Ok(threads) => threads,
                Err(e) => {
                    tracing::debug!(
                        "Skipping threads of guild {} ({}): {}",
                        guild.name.as_deref().unwrap_or("unknown"),
                        guild.id,
                        e
                    );
                    continue;
                }
            };
            if let Some(thread) = threads.into_iter().find(|thread| thread.id == wanted) {
                return Ok(Some(thread.into_destination(id)));
            }
        }
        Ok(None)
    }

    async fn send_message(&self, destination: &Destination, content: &str) -> Result<()> {
        let path = format!("/channels/{}/messages", destination.id);
        let resp = self
            .request(Method::POST, &path)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;
        self.check_response(resp, destination.id).await?;
        Ok(())
    }
}

/// 只記錄訊息、不連線的 gateway，用於 `--dry-run`
#[derive(Debug, Clone, Default)]
pub struct DryRunGateway;

#[async_trait]
impl ChatGateway for DryRunGateway {
    async fn wait_until_ready(&self) -> Result<()> {
        tracing::info!("🧪 Dry run: messages will be logged, not posted");
        Ok(())
    }

    async fn resolve_channel(&self, id: u64) -> Result<Option<Destination>> {
        Ok(Some(Destination {
            id,
            name: format!("dry-run-{}", id),
        }))
    }

    async fn find_thread(&self, _id: u64) -> Result<Option<Destination>> {
        Ok(None)
    }

    async fn send_message(&self, destination: &Destination, content: &str) -> Result<()> {
        tracing::info!("🧪 [dry run] {} <- {}", destination.name, content);
        Ok(())
    }
}
