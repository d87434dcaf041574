//! 推送处理
//!
//! 推送数据解码失败（无数据、非法JSON、缺少标题）时使用固定的默认载荷，
//! 推送事件永远不会因为解码失败而未被确认。点击通知时聚焦URL完全匹配的窗口，
//! 没有则在支持时打开新窗口。

use crate::config::NotificationConfig;
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::error::RouterError;
use crate::surface::{
    Client, ClientSurface, ClientType, Notification, NotificationData, NotificationOptions,
    NotificationSurface,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// 通知载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl NotificationPayload {
    /// 解码推送数据
    pub fn decode(data: Option<&[u8]>) -> Result<Self, RouterError> {
        let data = data.ok_or_else(|| RouterError::NotificationError("推送消息没有数据".to_string()))?;
        let payload: Self = serde_json::from_slice(data)?;
        if payload.title.trim().is_empty() {
            return Err(RouterError::NotificationError("推送消息标题为空".to_string()));
        }
        Ok(payload)
    }

    /// 默认载荷
    pub fn fallback(config: &NotificationConfig) -> Self {
        Self {
            title: config.default_title.clone(),
            body: Some(config.default_body.clone()),
            icon: Some(config.default_icon.clone()),
            badge: Some(config.default_badge.clone()),
            url: Some(config.default_url.clone()),
        }
    }

    /// 生成通知选项，缺失字段使用默认值
    pub fn to_options(&self, config: &NotificationConfig) -> NotificationOptions {
        fn or_default(value: &Option<String>, default: &str) -> String {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        }

        NotificationOptions {
            body: self.body.clone().unwrap_or_default(),
            icon: or_default(&self.icon, &config.default_icon),
            badge: or_default(&self.badge, &config.default_badge),
            tag: None,
            data: NotificationData {
                url: or_default(&self.url, &config.default_url),
            },
        }
    }
}

/// 通知点击结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// 聚焦了已有窗口
    Focused(Client),
    /// 打开了新窗口
    Opened(Client),
    /// 没有匹配窗口且无法打开新窗口
    Nothing,
}

/// 推送处理器
pub struct PushHandler {
    notifications: Arc<dyn NotificationSurface>,
    clients: Arc<dyn ClientSurface>,
    config: NotificationConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl PushHandler {
    pub fn new(
        notifications: Arc<dyn NotificationSurface>,
        clients: Arc<dyn ClientSurface>,
        config: NotificationConfig,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            notifications,
            clients,
            config,
            diagnostics,
        }
    }

    /// 解码载荷，失败时使用默认载荷
    pub fn payload(&self, data: Option<&[u8]>) -> NotificationPayload {
        match NotificationPayload::decode(data) {
            Ok(payload) => payload,
            Err(e) => {
                self.diagnostics
                    .report(DiagnosticEvent::push_decode_failed(&e));
                NotificationPayload::fallback(&self.config)
            }
        }
    }

    /// 处理推送消息
    ///
    /// # 返回
    /// - `Ok(notification)`: 已展示的通知
    /// - `Err(_)`: 通知面展示失败
    #[instrument(skip(self, data))]
    pub async fn on_push(&self, data: Option<&[u8]>) -> Result<Notification, RouterError> {
        let payload = self.payload(data);
        let options = payload.to_options(&self.config);

        let notification = self
            .notifications
            .show_notification(&payload.title, options)
            .await
            .map_err(|e| {
                self.diagnostics
                    .report(DiagnosticEvent::notification_failed("show", &e));
                e
            })?;

        info!(
            "展示推送通知: title={}, url={}",
            notification.title,
            notification.target_url()
        );
        Ok(notification)
    }

    /// 处理通知点击
    #[instrument(skip(self), fields(url = %notification.target_url()))]
    pub async fn on_notification_click(
        &self,
        notification: &Notification,
    ) -> Result<ClickOutcome, RouterError> {
        if let Err(e) = self.notifications.close_notification(notification.id).await {
            self.diagnostics
                .report(DiagnosticEvent::notification_failed("close", &e));
        }

        let target = notification.target_url();
        let windows = self.clients.match_all(ClientType::Window).await?;

        if let Some(client) = windows.into_iter().find(|c| c.url == target) {
            debug!("聚焦已有窗口: {}", client.url);
            let focused = self.clients.focus(client.id).await?;
            return Ok(ClickOutcome::Focused(focused));
        }

        if self.clients.supports_open_window() {
            if let Some(client) = self.clients.open_window(target).await? {
                debug!("打开新窗口: {}", client.url);
                return Ok(ClickOutcome::Opened(client));
            }
        }

        Ok(ClickOutcome::Nothing)
    }
}
