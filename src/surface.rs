//! 通知与客户端协作者
//!
//! 通知面负责展示和关闭通知；客户端面负责枚举、聚焦、打开窗口以及在激活时接管客户端。

use crate::error::RouterError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// 通知附带数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    /// 点击后打开的URL
    pub url: String,
}

/// 通知选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: Option<String>,
    pub data: NotificationData,
}

/// 已展示的通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub options: NotificationOptions,
    pub shown_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(title: impl Into<String>, options: NotificationOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            options,
            shown_at: Utc::now(),
        }
    }

    /// 通知的目标URL
    pub fn target_url(&self) -> &str {
        &self.options.data.url
    }
}

/// 客户端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientType {
    Window,
    Worker,
    All,
}

impl ClientType {
    pub fn matches(&self, other: ClientType) -> bool {
        *self == ClientType::All || *self == other
    }
}

/// 打开的客户端
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub url: String,
    pub client_type: ClientType,
    pub focused: bool,
}

impl Client {
    pub fn window(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            client_type: ClientType::Window,
            focused: false,
        }
    }
}

/// 通知面
#[async_trait]
pub trait NotificationSurface: Send + Sync {
    /// 展示通知
    async fn show_notification(
        &self,
        title: &str,
        options: NotificationOptions,
    ) -> Result<Notification, RouterError>;

    /// 关闭通知
    async fn close_notification(&self, id: Uuid) -> Result<(), RouterError>;
}

/// 客户端面
#[async_trait]
pub trait ClientSurface: Send + Sync {
    /// 按类型枚举打开的客户端
    async fn match_all(&self, filter: ClientType) -> Result<Vec<Client>, RouterError>;

    /// 聚焦客户端
    async fn focus(&self, client_id: Uuid) -> Result<Client, RouterError>;

    /// 是否支持打开新窗口
    fn supports_open_window(&self) -> bool;

    /// 打开新窗口
    async fn open_window(&self, url: &str) -> Result<Option<Client>, RouterError>;

    /// 接管所有打开的客户端，返回被接管的数量
    async fn claim(&self) -> Result<usize, RouterError>;

    /// 跳过等待，新实例立即替换仍在服务的旧实例
    async fn skip_waiting(&self) -> Result<(), RouterError>;
}

/// 内存通知与客户端面
#[derive(Debug)]
pub struct MemorySurface {
    shown: Mutex<Vec<Notification>>,
    closed: Mutex<Vec<Uuid>>,
    clients: Mutex<Vec<Client>>,
    open_window_supported: bool,
    claims: AtomicUsize,
    skip_waits: AtomicUsize,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self {
            shown: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
            clients: Mutex::new(Vec::new()),
            open_window_supported: true,
            claims: AtomicUsize::new(0),
            skip_waits: AtomicUsize::new(0),
        }
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_open_window(mut self) -> Self {
        self.open_window_supported = false;
        self
    }

    pub fn add_client(&self, client: Client) {
        self.clients.lock().push(client);
    }

    /// 当前仍在展示（未关闭）的通知
    pub fn notifications(&self) -> Vec<Notification> {
        let closed = self.closed.lock();
        self.shown
            .lock()
            .iter()
            .filter(|n| !closed.contains(&n.id))
            .cloned()
            .collect()
    }

    /// 所有展示过的通知
    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().clone()
    }

    pub fn clients(&self) -> Vec<Client> {
        self.clients.lock().clone()
    }

    pub fn claim_count(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }

    pub fn skip_waiting_count(&self) -> usize {
        self.skip_waits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSurface for MemorySurface {
    async fn show_notification(
        &self,
        title: &str,
        options: NotificationOptions,
    ) -> Result<Notification, RouterError> {
        let notification = Notification::new(title, options);
        self.shown.lock().push(notification.clone());
        Ok(notification)
    }

    async fn close_notification(&self, id: Uuid) -> Result<(), RouterError> {
        self.closed.lock().push(id);
        Ok(())
    }
}

#[async_trait]
impl ClientSurface for MemorySurface {
    async fn match_all(&self, filter: ClientType) -> Result<Vec<Client>, RouterError> {
        Ok(self
            .clients
            .lock()
            .iter()
            .filter(|c| filter.matches(c.client_type))
            .cloned()
            .collect())
    }

    async fn focus(&self, client_id: Uuid) -> Result<Client, RouterError> {
        let mut clients = self.clients.lock();
        for client in clients.iter_mut() {
            client.focused = client.id == client_id;
        }
        clients
            .iter()
            .find(|c| c.id == client_id)
            .cloned()
            .ok_or_else(|| RouterError::NotificationError(format!("客户端不存在: {}", client_id)))
    }

    fn supports_open_window(&self) -> bool {
        self.open_window_supported
    }

    async fn open_window(&self, url: &str) -> Result<Option<Client>, RouterError> {
        if !self.open_window_supported {
            return Ok(None);
        }
        let mut client = Client::window(url);
        client.focused = true;
        let mut clients = self.clients.lock();
        for other in clients.iter_mut() {
            other.focused = false;
        }
        clients.push(client.clone());
        Ok(Some(client))
    }

    async fn claim(&self) -> Result<usize, RouterError> {
        self.claims.fetch_add(1, Ordering::SeqCst);
        Ok(self.clients.lock().len())
    }

    async fn skip_waiting(&self) -> Result<(), RouterError> {
        self.skip_waits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
