//! 缓存策略引擎
//!
//! 两种策略：
//!
//! - **网络优先**（API请求）：先请求网络，成功则后台回写API缓存并立即返回；
//!   网络失败时查找API缓存，仍未命中则合成 503 错误响应。
//! - **缓存优先**（静态资源）：先查静态资源缓存，命中则不访问网络；
//!   未命中时请求网络并后台回写；网络失败时交给降级资源选择器。
//!
//! 缓存回写只在网络成功响应之后发生，作为事件守卫跟踪的后台任务运行，
//! 不阻塞响应返回。回写失败不会传播给调用方，只上报到诊断接收器。

use crate::classifier::RequestClass;
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::error::RouterError;
use crate::event::EventGuard;
use crate::fallback::FallbackSelector;
use crate::http::{CacheKey, Request, Response};
use crate::network::Network;
use crate::registry::{CacheGeneration, CacheRegistry};
use crate::stats::RouterStats;
use crate::storage::CacheStore;
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};
use url::Url;

/// 缓存策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// 网络优先，缓存兜底
    NetworkFirst,
    /// 缓存优先，网络兜底
    CacheFirst,
}

impl Strategy {
    /// 请求分类对应的策略，`Ignored` 不使用任何策略
    pub fn for_class(class: RequestClass) -> Option<Self> {
        match class {
            RequestClass::Ignored => None,
            RequestClass::Api => Some(Strategy::NetworkFirst),
            RequestClass::Static => Some(Strategy::CacheFirst),
        }
    }
}

/// 策略引擎
pub struct StrategyEngine {
    origin: Url,
    registry: CacheRegistry,
    network: Arc<dyn Network>,
    fallback: FallbackSelector,
    diagnostics: Arc<dyn DiagnosticSink>,
    stats: Arc<RouterStats>,
}

impl StrategyEngine {
    pub fn new(
        origin: Url,
        registry: CacheRegistry,
        network: Arc<dyn Network>,
        fallback: FallbackSelector,
        diagnostics: Arc<dyn DiagnosticSink>,
        stats: Arc<RouterStats>,
    ) -> Self {
        Self {
            origin,
            registry,
            network,
            fallback,
            diagnostics,
            stats,
        }
    }

    /// 执行策略
    ///
    /// # 返回
    /// - `Ok(response)`: 网络、缓存、降级资源或合成错误响应
    /// - `Err(RouterError::NetworkError)`: 静态资源全部失败且无降级资源，原始失败原样返回
    pub async fn execute(
        &self,
        strategy: Strategy,
        request: &Request,
        guard: &EventGuard,
    ) -> Result<Response, RouterError> {
        match strategy {
            Strategy::NetworkFirst => self.network_first(request, guard).await,
            Strategy::CacheFirst => self.cache_first(request, guard).await,
        }
    }

    /// 网络优先，缓存兜底
    #[instrument(skip(self, guard), fields(url = %request.url))]
    pub async fn network_first(
        &self,
        request: &Request,
        guard: &EventGuard,
    ) -> Result<Response, RouterError> {
        let key = request.cache_key(&self.origin)?;

        self.stats.record_network_fetch();
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.spawn_cache_write(CacheGeneration::Api, key, response.snapshot(), guard);
                } else {
                    debug!("网络响应非成功状态，不写入缓存: status={}", response.status);
                }
                Ok(response)
            }
            Err(e) => {
                self.stats.record_network_failure();
                warn!("API网络请求失败，尝试缓存: key={}, error={}", key, e);

                let cached = match self.open_store(CacheGeneration::Api).await {
                    Some(store) => self.lookup(store.as_ref(), CacheGeneration::Api, &key).await,
                    None => None,
                };

                match cached {
                    Some(response) => {
                        self.stats.record_cache_hit();
                        debug!("使用API缓存快照: key={}", key);
                        Ok(response)
                    }
                    None => {
                        self.stats.record_cache_miss();
                        self.stats.record_synthesized_error();
                        warn!("API缓存未命中，返回合成错误响应: key={}", key);
                        Ok(Response::network_error())
                    }
                }
            }
        }
    }

    /// 缓存优先，网络兜底
    #[instrument(skip(self, guard), fields(url = %request.url))]
    pub async fn cache_first(
        &self,
        request: &Request,
        guard: &EventGuard,
    ) -> Result<Response, RouterError> {
        let key = request.cache_key(&self.origin)?;

        let assets = self.open_store(CacheGeneration::Assets).await;
        if let Some(store) = &assets {
            if let Some(cached) = self.lookup(store.as_ref(), CacheGeneration::Assets, &key).await
            {
                self.stats.record_cache_hit();
                trace!("静态资源缓存命中: key={}", key);
                return Ok(cached);
            }
        }
        self.stats.record_cache_miss();

        self.stats.record_network_fetch();
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.spawn_cache_write(
                        CacheGeneration::Assets,
                        key,
                        response.snapshot(),
                        guard,
                    );
                }
                Ok(response)
            }
            Err(e) => {
                self.stats.record_network_failure();
                warn!("静态资源网络请求失败: key={}, error={}", key, e);

                let fallback = match &assets {
                    Some(store) => self.fallback.select(request, store.as_ref()).await,
                    None => None,
                };

                match fallback {
                    Some(response) => {
                        self.stats.record_fallback();
                        Ok(response)
                    }
                    None => Err(RouterError::NetworkError(e)),
                }
            }
        }
    }

    /// 打开存储，失败时上报并返回 `None`
    async fn open_store(&self, generation: CacheGeneration) -> Option<Arc<dyn CacheStore>> {
        match self.registry.open(generation).await {
            Ok(store) => Some(store),
            Err(e) => {
                self.diagnostics.report(DiagnosticEvent::cache_read_failed(
                    self.registry.name(generation),
                    "*",
                    e,
                ));
                None
            }
        }
    }

    /// 查找条目，读取失败按未命中处理
    async fn lookup(
        &self,
        store: &dyn CacheStore,
        generation: CacheGeneration,
        key: &CacheKey,
    ) -> Option<Response> {
        match store.match_request(key).await {
            Ok(found) => found,
            Err(e) => {
                self.diagnostics.report(DiagnosticEvent::cache_read_failed(
                    self.registry.name(generation),
                    key.as_str(),
                    e,
                ));
                None
            }
        }
    }

    /// 后台回写缓存
    ///
    /// 任务由事件守卫跟踪；最后写入者获胜，不加锁。
    fn spawn_cache_write(
        &self,
        generation: CacheGeneration,
        key: CacheKey,
        snapshot: Response,
        guard: &EventGuard,
    ) {
        let registry = self.registry.clone();
        let diagnostics = self.diagnostics.clone();
        let stats = self.stats.clone();

        guard.wait_until(async move {
            let name = registry.name(generation).to_string();
            let result = match registry.open(generation).await {
                Ok(store) => store.put(key.clone(), snapshot).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    stats.record_cache_write();
                    trace!("缓存回写完成: cache={}, key={}", name, key);
                }
                Err(e) => {
                    stats.record_cache_write_failure();
                    diagnostics.report(DiagnosticEvent::cache_write_failed(&name, key.as_str(), e));
                }
            }
        });
    }
}
