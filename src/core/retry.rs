use crate::utils::error::{BotError, Result};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed,
    /// 每次加倍，最多到 max
    Exponential { max: Duration },
}

/// 有上限的重試策略：最大嘗試次數 + 嘗試之間的延遲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            backoff: Backoff::Fixed,
        }
    }

    pub fn exponential(max_attempts: u32, delay: Duration, max: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            backoff: Backoff::Exponential { max },
        }
    }

    /// 第 attempt 次（從 1 開始）失敗後要等待的時間
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential { max } => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.delay.saturating_mul(factor).min(max)
            }
        }
    }

    /// 執行 operation，遇到可重試錯誤時依策略重試
    ///
    /// 不可重試的錯誤立即回傳；次數用盡時回傳最後一次的錯誤。
    pub async fn run<F, Fut, T>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() || attempt >= self.max_attempts => return Err(e),
                Err(e) => {
                    let delay = match &e {
                        BotError::RateLimited { retry_after_secs } => {
                            Duration::from_secs(*retry_after_secs).max(self.delay_after(attempt))
                        }
                        _ => self.delay_after(attempt),
                    };
                    tracing::warn!(
                        "⚠️ {} failed (attempt {}/{}): {}, retrying in {:?}",
                        label,
                        attempt,
                        self.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
