//! 请求分类器
//!
//! 根据请求方法和URL把请求分为三类：忽略、API、静态资源。纯函数，无副作用。

use crate::constants::FETCHABLE_SCHEMES;
use crate::http::Request;
use url::Url;

/// 请求分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// 不拦截，交给默认处理
    Ignored,
    /// API请求（网络优先）
    Api,
    /// 静态资源（缓存优先）
    Static,
}

impl RequestClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::Ignored => "ignored",
            RequestClass::Api => "api",
            RequestClass::Static => "static",
        }
    }
}

/// 请求分类器
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    origin: Url,
    api_prefix: String,
}

impl RequestClassifier {
    pub fn new(origin: Url, api_prefix: impl Into<String>) -> Self {
        Self {
            origin,
            api_prefix: api_prefix.into(),
        }
    }

    /// 分类请求
    ///
    /// - 非 GET 或非 http(s) 协议 → `Ignored`
    /// - 路径以API前缀开头 → `Api`
    /// - 其他 → `Static`
    ///
    /// 无法解析的URL同样视为 `Ignored`。
    pub fn classify(&self, request: &Request) -> RequestClass {
        if !request.is_get() {
            return RequestClass::Ignored;
        }

        let url = match request.resolve_url(&self.origin) {
            Ok(url) => url,
            Err(_) => return RequestClass::Ignored,
        };

        if !FETCHABLE_SCHEMES.contains(&url.scheme()) {
            return RequestClass::Ignored;
        }

        if url.path().starts_with(&self.api_prefix) {
            RequestClass::Api
        } else {
            RequestClass::Static
        }
    }
}
