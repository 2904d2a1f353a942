use crate::domain::model::Destination;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 一個已連線的瀏覽器自動化分頁
#[async_trait]
pub trait PageSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;
    async fn refresh(&mut self) -> Result<()>;
    /// 等待 body 元素出現並回傳其可見文字
    async fn body_text(&mut self) -> Result<String>;
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: PageSession;

    async fn connect(&self) -> Result<Self::Session>;
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// 阻塞直到聊天客戶端可用
    async fn wait_until_ready(&self) -> Result<()>;
    async fn resolve_channel(&self, id: u64) -> Result<Option<Destination>>;
    /// 在所有已知伺服器的討論串中尋找
    async fn find_thread(&self, id: u64) -> Result<Option<Destination>>;
    async fn send_message(&self, destination: &Destination, content: &str) -> Result<()>;
}
