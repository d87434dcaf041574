//! 请求与响应模型
//!
//! 路由器只读取请求；响应可以被快照后写入缓存存储，同时原响应返回给调用方。

use crate::constants::{NETWORK_ERROR_MESSAGE, NETWORK_ERROR_STATUS};
use crate::error::NetworkError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use url::Url;

/// 拦截到的请求
///
/// 头部名称统一存为小写。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// 请求方法
    pub method: String,
    /// 请求URL（绝对地址或以 `/` 开头的相对路径）
    pub url: String,
    /// HTTP头
    pub headers: HashMap<String, String>,
    /// 请求体
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into().to_uppercase(),
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn with_accept(self, accept: impl Into<String>) -> Self {
        self.with_header("accept", accept)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// 接受偏好列表
    ///
    /// 解析 `Accept` 头，去掉参数（如 `;q=0.9`），统一小写。
    /// 没有 `Accept` 头时返回空列表。
    pub fn accept_list(&self) -> Vec<String> {
        self.header("accept")
            .map(|accept| {
                accept
                    .split(',')
                    .filter_map(|part| {
                        let media_type = part.split(';').next().unwrap_or("").trim();
                        if media_type.is_empty() {
                            None
                        } else {
                            Some(media_type.to_lowercase())
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 是否接受HTML
    pub fn accepts_html(&self) -> bool {
        self.accept_list()
            .iter()
            .any(|t| t == "text/html" || t == "application/xhtml+xml")
    }

    /// 是否接受图片
    pub fn accepts_image(&self) -> bool {
        self.accept_list().iter().any(|t| t.starts_with("image/"))
    }

    /// 基于源地址解析出绝对URL
    pub fn resolve_url(&self, origin: &Url) -> Result<Url, NetworkError> {
        Ok(origin.join(&self.url)?)
    }

    /// 规范化的请求标识（方法 + 绝对URL）
    pub fn cache_key(&self, origin: &Url) -> Result<CacheKey, NetworkError> {
        let url = self.resolve_url(origin)?;
        Ok(CacheKey::new(&self.method, &url))
    }
}

/// 缓存键
///
/// 只有 GET 请求会被存储，因此方法 + URL 足以唯一标识一个条目。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(method: &str, url: &Url) -> Self {
        Self(format!("{} {}", method.to_uppercase(), url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// HTTP响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// 状态码
    pub status: u16,
    /// HTTP头（名称小写）
    pub headers: HashMap<String, String>,
    /// 响应体
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    /// 构造JSON响应
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string()).with_header("content-type", "application/json")
    }

    /// 网络失败且无缓存时合成的 503 响应
    pub fn network_error() -> Self {
        Self::json(
            NETWORK_ERROR_STATUS,
            &serde_json::json!({ "error": NETWORK_ERROR_MESSAGE }),
        )
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// 状态码是否在 200–299 之间
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 生成独立快照，可以写入缓存而原响应继续返回给调用方
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
