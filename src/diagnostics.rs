//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 诊断事件模块
//!
//! 尽力而为的操作（缓存回写、后台同步、推送解码）失败时不会传播给调用方，
//! 而是上报到可注入的诊断接收器，测试中可以直接观察。

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, warn};

/// 诊断事件
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event_type")]
pub enum DiagnosticEvent {
    /// 缓存回写失败
    CacheWriteFailed {
        timestamp: DateTime<Utc>,
        cache: String,
        key: String,
        error: String,
    },
    /// 缓存读取失败（按未命中处理）
    CacheReadFailed {
        timestamp: DateTime<Utc>,
        cache: String,
        key: String,
        error: String,
    },
    /// 后台同步失败
    SyncFailed {
        timestamp: DateTime<Utc>,
        tag: String,
        stage: String,
        error: String,
    },
    /// 推送数据解码失败，使用默认载荷
    PushDecodeFailed {
        timestamp: DateTime<Utc>,
        error: String,
    },
    /// 通知操作失败
    NotificationFailed {
        timestamp: DateTime<Utc>,
        action: String,
        error: String,
    },
}

impl DiagnosticEvent {
    pub fn cache_write_failed(cache: &str, key: &str, error: impl ToString) -> Self {
        DiagnosticEvent::CacheWriteFailed {
            timestamp: Utc::now(),
            cache: cache.to_string(),
            key: key.to_string(),
            error: error.to_string(),
        }
    }

    pub fn cache_read_failed(cache: &str, key: &str, error: impl ToString) -> Self {
        DiagnosticEvent::CacheReadFailed {
            timestamp: Utc::now(),
            cache: cache.to_string(),
            key: key.to_string(),
            error: error.to_string(),
        }
    }

    pub fn sync_failed(tag: &str, stage: &str, error: impl ToString) -> Self {
        DiagnosticEvent::SyncFailed {
            timestamp: Utc::now(),
            tag: tag.to_string(),
            stage: stage.to_string(),
            error: error.to_string(),
        }
    }

    pub fn push_decode_failed(error: impl ToString) -> Self {
        DiagnosticEvent::PushDecodeFailed {
            timestamp: Utc::now(),
            error: error.to_string(),
        }
    }

    pub fn notification_failed(action: &str, error: impl ToString) -> Self {
        DiagnosticEvent::NotificationFailed {
            timestamp: Utc::now(),
            action: action.to_string(),
            error: error.to_string(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            DiagnosticEvent::CacheWriteFailed { timestamp, .. } => *timestamp,
            DiagnosticEvent::CacheReadFailed { timestamp, .. } => *timestamp,
            DiagnosticEvent::SyncFailed { timestamp, .. } => *timestamp,
            DiagnosticEvent::PushDecodeFailed { timestamp, .. } => *timestamp,
            DiagnosticEvent::NotificationFailed { timestamp, .. } => *timestamp,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DiagnosticEvent::CacheWriteFailed { .. } => "cache_write_failed",
            DiagnosticEvent::CacheReadFailed { .. } => "cache_read_failed",
            DiagnosticEvent::SyncFailed { .. } => "sync_failed",
            DiagnosticEvent::PushDecodeFailed { .. } => "push_decode_failed",
            DiagnosticEvent::NotificationFailed { .. } => "notification_failed",
        }
    }
}

/// 诊断接收器
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, event: DiagnosticEvent);
}

/// 写入 tracing 日志的接收器（默认）
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, event: DiagnosticEvent) {
        match &event {
            DiagnosticEvent::SyncFailed { tag, stage, error, .. } => {
                error!(tag = %tag, stage = %stage, error = %error, "后台同步失败");
            }
            DiagnosticEvent::CacheWriteFailed { cache, key, error, .. } => {
                warn!(cache = %cache, key = %key, error = %error, "缓存回写失败");
            }
            DiagnosticEvent::CacheReadFailed { cache, key, error, .. } => {
                warn!(cache = %cache, key = %key, error = %error, "缓存读取失败");
            }
            DiagnosticEvent::PushDecodeFailed { error, .. } => {
                warn!(error = %error, "推送数据解码失败，使用默认载荷");
            }
            DiagnosticEvent::NotificationFailed { action, error, .. } => {
                warn!(action = %action, error = %error, "通知操作失败");
            }
        }
    }
}

/// 收集事件的内存接收器
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events.lock().iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, event: DiagnosticEvent) {
        TracingSink.report(event.clone());
        self.events.lock().push(event);
    }
}
