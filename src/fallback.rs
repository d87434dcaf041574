//! 降级资源选择
//!
//! 静态资源请求在缓存和网络都不可用时，根据请求的接受偏好选择替代资源：
//!
//! - 接受HTML → 预缓存的离线页面
//! - 接受图片 → 预缓存的占位图片
//! - 其他 → 无替代，原始失败原样返回给调用方

use crate::config::FallbackConfig;
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::http::{Request, Response};
use crate::storage::CacheStore;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// 降级资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    /// 离线页面
    OfflinePage,
    /// 占位图片
    PlaceholderImage,
}

/// 降级资源选择器
#[derive(Clone)]
pub struct FallbackSelector {
    origin: Url,
    config: FallbackConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl FallbackSelector {
    pub fn new(origin: Url, config: FallbackConfig, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            origin,
            config,
            diagnostics,
        }
    }

    /// 根据接受偏好判断降级资源类型
    ///
    /// 没有 `Accept` 头的请求既不算HTML也不算图片。
    pub fn kind_for(&self, request: &Request) -> Option<FallbackKind> {
        if request.accepts_html() {
            Some(FallbackKind::OfflinePage)
        } else if request.accepts_image() {
            Some(FallbackKind::PlaceholderImage)
        } else {
            None
        }
    }

    /// 降级资源路径
    pub fn path(&self, kind: FallbackKind) -> &str {
        match kind {
            FallbackKind::OfflinePage => &self.config.offline_page,
            FallbackKind::PlaceholderImage => &self.config.placeholder_image,
        }
    }

    /// 选择降级响应
    ///
    /// # 参数
    /// - `request`: 失败的请求
    /// - `assets`: 静态资源代际的存储
    ///
    /// # 返回
    /// - `Some(response)`: 预缓存的替代资源
    /// - `None`: 无可用替代资源
    pub async fn select(&self, request: &Request, assets: &dyn CacheStore) -> Option<Response> {
        let kind = self.kind_for(request)?;
        let path = self.path(kind);

        let key = match Request::get(path).cache_key(&self.origin) {
            Ok(key) => key,
            Err(e) => {
                warn!("降级资源路径无效: path={}, error={}", path, e);
                return None;
            }
        };

        match assets.match_request(&key).await {
            Ok(Some(response)) => {
                debug!("使用降级资源: kind={:?}, path={}", kind, path);
                Some(response)
            }
            Ok(None) => {
                warn!("降级资源未预缓存: {}", path);
                None
            }
            Err(e) => {
                self.diagnostics
                    .report(DiagnosticEvent::cache_read_failed("fallback", key.as_str(), e));
                None
            }
        }
    }
}
