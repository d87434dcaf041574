//! 后台同步处理
//!
//! 收到同步触发（默认 `sync-cart`）后：读取本地待同步购物车 → 以JSON数组
//! POST 到同步端点 → 成功后展示确认通知。任一步骤失败都会记录日志并返回错误，
//! 不在内部重试；重新投递由外部的延迟任务队列按其退避策略负责。

use crate::config::{NotificationConfig, SyncConfig};
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::error::{RouterError, StorageError};
use crate::http::Request;
use crate::network::Network;
use crate::surface::{Notification, NotificationData, NotificationOptions, NotificationSurface};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// 购物车条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
    /// 其他字段原样透传
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            extra: serde_json::Map::new(),
        }
    }
}

/// 本地持久购物车存储
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// 读取待同步的购物车快照（可能为空）
    async fn get_cart_data(&self) -> Result<Vec<CartItem>, StorageError>;

    /// 确认条目已成功发送
    ///
    /// 默认不做任何处理。
    async fn acknowledge(&self, _items: &[CartItem]) -> Result<(), StorageError> {
        Ok(())
    }
}

/// 内存购物车存储
///
/// 确认后的条目会被移除；同步期间新加入的条目保留到下一次同步。
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    items: Mutex<Vec<CartItem>>,
}

impl MemoryCartStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<CartItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    pub fn push(&self, item: CartItem) {
        self.items.lock().push(item);
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

#[async_trait]
impl CartStorage for MemoryCartStorage {
    async fn get_cart_data(&self) -> Result<Vec<CartItem>, StorageError> {
        Ok(self.items.lock().clone())
    }

    async fn acknowledge(&self, items: &[CartItem]) -> Result<(), StorageError> {
        let mut pending = self.items.lock();
        for item in items {
            if let Some(pos) = pending.iter().position(|p| p == item) {
                pending.remove(pos);
            }
        }
        Ok(())
    }
}

/// 同步结果
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// 标签不匹配，未处理
    Ignored,
    /// 同步成功
    Synced {
        items: usize,
        notification: Notification,
    },
}

/// 后台同步处理器
pub struct SyncHandler {
    config: SyncConfig,
    notification_config: NotificationConfig,
    cart: Arc<dyn CartStorage>,
    network: Arc<dyn Network>,
    notifications: Arc<dyn NotificationSurface>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl SyncHandler {
    pub fn new(
        config: SyncConfig,
        notification_config: NotificationConfig,
        cart: Arc<dyn CartStorage>,
        network: Arc<dyn Network>,
        notifications: Arc<dyn NotificationSurface>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            config,
            notification_config,
            cart,
            network,
            notifications,
            diagnostics,
        }
    }

    pub fn tag(&self) -> &str {
        &self.config.tag
    }

    /// 处理同步触发
    ///
    /// # 返回
    /// - `Ok(SyncOutcome::Ignored)`: 标签不是本处理器负责的
    /// - `Ok(SyncOutcome::Synced)`: 已发送并展示确认通知
    /// - `Err(RouterError::SyncError)`: 失败，已记录，等待外部重新投递
    #[instrument(skip(self))]
    pub async fn on_sync(&self, tag: &str) -> Result<SyncOutcome, RouterError> {
        if tag != self.config.tag {
            debug!("忽略未知同步标签: {}", tag);
            return Ok(SyncOutcome::Ignored);
        }

        let items = self
            .cart
            .get_cart_data()
            .await
            .map_err(|e| self.fail("read", e))?;

        self.transmit(&items).await?;

        if let Err(e) = self.cart.acknowledge(&items).await {
            self.diagnostics
                .report(DiagnosticEvent::sync_failed(tag, "acknowledge", e));
        }

        let options = NotificationOptions {
            body: self.notification_config.sync_body.clone(),
            icon: self.notification_config.default_icon.clone(),
            badge: self.notification_config.default_badge.clone(),
            tag: Some(self.config.tag.clone()),
            data: NotificationData {
                url: self.notification_config.default_url.clone(),
            },
        };
        let notification = self
            .notifications
            .show_notification(&self.notification_config.sync_title, options)
            .await
            .map_err(|e| self.fail("notify", e))?;

        info!("购物车同步完成: items={}", items.len());
        Ok(SyncOutcome::Synced {
            items: items.len(),
            notification,
        })
    }

    /// 发送购物车快照
    async fn transmit(&self, items: &[CartItem]) -> Result<(), RouterError> {
        let body = serde_json::to_vec(items).map_err(|e| self.fail("encode", e))?;
        let request = Request::post(&self.config.endpoint)
            .with_header("content-type", "application/json")
            .with_body(body);

        let response = self
            .network
            .fetch(&request)
            .await
            .map_err(|e| self.fail("transmit", e))?;

        if !response.is_ok() {
            return Err(self.fail(
                "transmit",
                format!("同步端点返回错误状态码: {}", response.status),
            ));
        }
        Ok(())
    }

    fn fail(&self, stage: &str, error: impl ToString) -> RouterError {
        let message = error.to_string();
        self.diagnostics.report(DiagnosticEvent::sync_failed(
            &self.config.tag,
            stage,
            &message,
        ));
        RouterError::SyncError(format!("{}: {}", stage, message))
    }
}
