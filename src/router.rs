//! OfflineRouter 主控制器
//!
//! 每种事件一个入口：`on_install`、`on_activate`、`on_fetch`、`on_sync`、
//! `on_push`、`on_notification_click`。所有协作者在构造时注入，
//! 缓存代际标识来自配置而不是全局常量。

use crate::classifier::{RequestClass, RequestClassifier};
use crate::config::RouterConfig;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::RouterError;
use crate::event::EventGuard;
use crate::fallback::FallbackSelector;
use crate::http::{Request, Response};
use crate::lifecycle::{ActivateReport, InstallReport, LifecycleManager, WorkerState};
use crate::network::Network;
use crate::push::{ClickOutcome, PushHandler};
use crate::registry::CacheRegistry;
use crate::stats::{RouterStats, StatsSnapshot};
use crate::storage::{CacheStorage, MemoryCacheStorage};
use crate::strategy::{Strategy, StrategyEngine};
use crate::surface::{ClientSurface, MemorySurface, Notification, NotificationSurface};
use crate::sync::{CartStorage, MemoryCartStorage, SyncHandler, SyncOutcome};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

/// 请求拦截结果
#[derive(Debug)]
pub enum FetchOutcome {
    /// 不拦截，交给默认处理
    PassThrough,
    /// 已处理
    Handled {
        class: RequestClass,
        response: Result<Response, RouterError>,
        /// 后台任务守卫，等待后事件才算处理完毕
        guard: EventGuard,
    },
}

impl FetchOutcome {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, FetchOutcome::PassThrough)
    }

    pub fn class(&self) -> RequestClass {
        match self {
            FetchOutcome::PassThrough => RequestClass::Ignored,
            FetchOutcome::Handled { class, .. } => *class,
        }
    }

    /// 已产生的响应（后台任务可能仍在运行）
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Handled {
                response: Ok(response),
                ..
            } => Some(response),
            _ => None,
        }
    }

    /// 等待所有后台任务完成并取出结果
    ///
    /// `PassThrough` 返回 `None`。
    pub async fn settle(self) -> Option<Result<Response, RouterError>> {
        match self {
            FetchOutcome::PassThrough => None,
            FetchOutcome::Handled {
                response, guard, ..
            } => {
                guard.wait().await;
                Some(response)
            }
        }
    }
}

/// 离线路由器
pub struct OfflineRouter {
    config: RouterConfig,
    classifier: RequestClassifier,
    engine: StrategyEngine,
    lifecycle: LifecycleManager,
    sync: SyncHandler,
    push: PushHandler,
    stats: Arc<RouterStats>,
}

impl OfflineRouter {
    /// 创建构建器
    pub fn builder(config: RouterConfig) -> OfflineRouterBuilder {
        OfflineRouterBuilder::new(config)
    }

    /// 当前生命周期状态
    pub fn state(&self) -> WorkerState {
        self.lifecycle.state()
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// 分类请求（不执行任何策略）
    pub fn classify(&self, request: &Request) -> RequestClass {
        self.classifier.classify(request)
    }

    /// 安装事件
    pub async fn on_install(&self) -> Result<InstallReport, RouterError> {
        self.lifecycle.install().await
    }

    /// 激活事件
    pub async fn on_activate(&self) -> Result<ActivateReport, RouterError> {
        self.lifecycle.activate().await
    }

    /// 请求拦截事件
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn on_fetch(&self, request: &Request) -> FetchOutcome {
        self.stats.record_request();

        let class = self.classifier.classify(request);
        let strategy = match Strategy::for_class(class) {
            Some(strategy) => strategy,
            None => {
                trace!("请求不拦截");
                self.stats.record_passthrough();
                return FetchOutcome::PassThrough;
            }
        };

        debug!("请求分类: class={}, strategy={:?}", class.as_str(), strategy);
        let guard = EventGuard::new();
        let response = self.engine.execute(strategy, request, &guard).await;

        FetchOutcome::Handled {
            class,
            response,
            guard,
        }
    }

    /// 后台同步事件
    pub async fn on_sync(&self, tag: &str) -> Result<SyncOutcome, RouterError> {
        self.sync.on_sync(tag).await
    }

    /// 推送事件
    pub async fn on_push(&self, data: Option<&[u8]>) -> Result<Notification, RouterError> {
        self.push.on_push(data).await
    }

    /// 通知点击事件
    pub async fn on_notification_click(
        &self,
        notification: &Notification,
    ) -> Result<ClickOutcome, RouterError> {
        self.push.on_notification_click(notification).await
    }
}

/// 路由器构建器
///
/// 网络协作者必须提供；其他协作者默认使用内存实现，诊断默认写入 tracing 日志。
pub struct OfflineRouterBuilder {
    config: RouterConfig,
    cache_storage: Option<Arc<dyn CacheStorage>>,
    network: Option<Arc<dyn Network>>,
    cart: Option<Arc<dyn CartStorage>>,
    notifications: Option<Arc<dyn NotificationSurface>>,
    clients: Option<Arc<dyn ClientSurface>>,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl OfflineRouterBuilder {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            cache_storage: None,
            network: None,
            cart: None,
            notifications: None,
            clients: None,
            diagnostics: None,
        }
    }

    pub fn cache_storage(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.cache_storage = Some(storage);
        self
    }

    pub fn network(mut self, network: Arc<dyn Network>) -> Self {
        self.network = Some(network);
        self
    }

    pub fn cart_storage(mut self, cart: Arc<dyn CartStorage>) -> Self {
        self.cart = Some(cart);
        self
    }

    pub fn notifications(mut self, notifications: Arc<dyn NotificationSurface>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn clients(mut self, clients: Arc<dyn ClientSurface>) -> Self {
        self.clients = Some(clients);
        self
    }

    /// 同时设置通知面和客户端面
    pub fn surface<S>(self, surface: Arc<S>) -> Self
    where
        S: NotificationSurface + ClientSurface + 'static,
    {
        self.notifications(surface.clone()).clients(surface)
    }

    pub fn diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// 构建路由器
    pub fn build(self) -> Result<OfflineRouter, RouterError> {
        let config = self.config;
        config.validate().map_err(RouterError::ConfigError)?;
        let origin = config.origin_url()?;
        for resource in config.missing_fallbacks() {
            warn!("降级资源未包含在安装清单中，离线时不可用: {}", resource);
        }

        let network = self
            .network
            .ok_or_else(|| RouterError::ConfigError("缺少网络协作者".to_string()))?;
        let cache_storage = self
            .cache_storage
            .unwrap_or_else(|| Arc::new(MemoryCacheStorage::new()) as Arc<dyn CacheStorage>);
        let cart = self
            .cart
            .unwrap_or_else(|| Arc::new(MemoryCartStorage::new()) as Arc<dyn CartStorage>);
        let diagnostics = self
            .diagnostics
            .unwrap_or_else(|| Arc::new(TracingSink) as Arc<dyn DiagnosticSink>);

        let (notifications, clients): (Arc<dyn NotificationSurface>, Arc<dyn ClientSurface>) =
            match (self.notifications, self.clients) {
                (Some(n), Some(c)) => (n, c),
                (n, c) => {
                    let surface = Arc::new(MemorySurface::new());
                    let default_notifications: Arc<dyn NotificationSurface> = surface.clone();
                    let default_clients: Arc<dyn ClientSurface> = surface;
                    (
                        n.unwrap_or(default_notifications),
                        c.unwrap_or(default_clients),
                    )
                }
            };

        let stats = Arc::new(RouterStats::new());
        let registry = CacheRegistry::new(cache_storage, config.generations.clone());

        let classifier = RequestClassifier::new(origin.clone(), config.api_prefix.clone());
        let fallback = FallbackSelector::new(
            origin.clone(),
            config.fallback.clone(),
            diagnostics.clone(),
        );
        let engine = StrategyEngine::new(
            origin.clone(),
            registry.clone(),
            network.clone(),
            fallback,
            diagnostics.clone(),
            stats.clone(),
        );
        let lifecycle = LifecycleManager::new(
            origin,
            registry,
            network.clone(),
            clients.clone(),
            config.install_assets.clone(),
            diagnostics.clone(),
        );
        let sync = SyncHandler::new(
            config.sync.clone(),
            config.notification.clone(),
            cart,
            network,
            notifications.clone(),
            diagnostics.clone(),
        );
        let push = PushHandler::new(
            notifications,
            clients,
            config.notification.clone(),
            diagnostics,
        );

        info!(
            "创建离线路由器: assets={}, api={}, config_hash={}",
            config.generations.assets,
            config.generations.api,
            config.compute_hash()
        );

        Ok(OfflineRouter {
            config,
            classifier,
            engine,
            lifecycle,
            sync,
            push,
            stats,
        })
    }
}
