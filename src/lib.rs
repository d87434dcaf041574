//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Cacheron - Offline-first Request Router
//!
//! 位于应用网络请求与网络之间的缓存路由器：逐个请求决定从本地缓存返回、
//! 请求网络，还是在两者都不可用时返回替代资源。
//!
//! # API Layers
//!
//! ## Prelude (Quick Start)
//!
//! Use `use cacheron::prelude::*;` to import all commonly used types.
//!
//! ## Core API
//!
//! - [`OfflineRouter`] - 每种事件一个入口的主控制器
//! - [`RouterConfig`] - 缓存代际、API前缀、安装清单等配置
//! - [`FetchOutcome`] - 请求拦截结果
//! - [`RouterError`] - 错误类型
//!
//! ## Components
//!
//! - [`RequestClassifier`] - 请求分类（忽略 / API / 静态资源）
//! - [`StrategyEngine`] - 网络优先与缓存优先两种策略
//! - [`FallbackSelector`] - 离线页面 / 占位图片
//! - [`LifecycleManager`] - 安装与激活
//! - [`SyncHandler`] - 购物车后台同步
//! - [`PushHandler`] - 推送通知与点击
//!
//! # Examples
//!
//! ```rust
//! use cacheron::prelude::*;
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct Offline;
//!
//! #[async_trait]
//! impl Network for Offline {
//!     async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
//!         Err(NetworkError::Unreachable(request.url.clone()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = OfflineRouter::builder(RouterConfig::default())
//!         .network(Arc::new(Offline))
//!         .build()
//!         .unwrap();
//!
//!     // 离线时API请求得到合成的 503 响应
//!     let outcome = router.on_fetch(&Request::get("/api/products")).await;
//!     let response = outcome.settle().await.unwrap().unwrap();
//!     assert_eq!(response.status, 503);
//! }
//! ```
//!
//! # Features
//!
//! - `memory` (default): 内存缓存存储、购物车存储与通知面
//! - `http`: 基于 reqwest 的网络后端
//! - `telemetry`: tracing-subscriber 日志初始化

pub mod prelude;

pub mod classifier;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod fallback;
pub mod http;
pub mod lifecycle;
pub mod network;
pub mod push;
pub mod registry;
pub mod router;
pub mod stats;
pub mod storage;
pub mod strategy;
pub mod surface;
pub mod sync;
#[cfg(feature = "telemetry")]
pub mod telemetry;

// 重新导出常用类型
pub use classifier::{RequestClass, RequestClassifier};
pub use config::{
    FallbackConfig, GenerationConfig, NetworkConfig, NotificationConfig, RouterConfig, SyncConfig,
};
pub use diagnostics::{DiagnosticEvent, DiagnosticSink, MemorySink, TracingSink};
pub use error::{NetworkError, RouterError, StorageError};
pub use event::EventGuard;
pub use fallback::{FallbackKind, FallbackSelector};
pub use http::{CacheKey, Request, Response};
pub use lifecycle::{ActivateReport, InstallReport, LifecycleManager, WorkerState};
#[cfg(feature = "http")]
pub use network::HttpNetwork;
pub use network::Network;
pub use push::{ClickOutcome, NotificationPayload, PushHandler};
pub use registry::{CacheGeneration, CacheRegistry};
pub use router::{FetchOutcome, OfflineRouter, OfflineRouterBuilder};
pub use stats::{RouterStats, StatsSnapshot};
pub use storage::{CacheStorage, CacheStore, MemoryCacheStorage, MemoryCacheStore};
pub use strategy::{Strategy, StrategyEngine};
pub use surface::{
    Client, ClientSurface, ClientType, MemorySurface, Notification, NotificationData,
    NotificationOptions, NotificationSurface,
};
pub use sync::{CartItem, CartStorage, MemoryCartStorage, SyncHandler, SyncOutcome};
#[cfg(feature = "telemetry")]
pub use telemetry::{init_tracing, TelemetryConfig};
