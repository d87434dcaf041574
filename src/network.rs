//! 网络协作者
//!
//! `fetch` 在连接丢失时返回错误；非 2xx 的响应不是错误，由调用方通过
//! [`Response::is_ok`] 判断。传输层自身的重试和退避不在本模块范围内。

use crate::error::NetworkError;
use crate::http::{Request, Response};
use async_trait::async_trait;

/// 网络接口
#[async_trait]
pub trait Network: Send + Sync {
    /// 发送请求
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

#[cfg(feature = "http")]
pub use self::http_backend::HttpNetwork;

#[cfg(feature = "http")]
mod http_backend {
    use super::*;
    use crate::config::NetworkConfig;
    use tracing::{debug, trace};
    use url::Url;

    /// 基于 reqwest 的网络实现
    ///
    /// 相对URL基于配置的源地址解析。
    pub struct HttpNetwork {
        client: reqwest::Client,
        origin: Url,
    }

    impl HttpNetwork {
        pub fn new(origin: Url, config: &NetworkConfig) -> Result<Self, NetworkError> {
            let client = reqwest::Client::builder()
                .timeout(config.timeout())
                .build()?;
            Ok(Self { client, origin })
        }
    }

    #[async_trait]
    impl Network for HttpNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
            let url = request.resolve_url(&self.origin)?;
            let method = reqwest::Method::from_bytes(request.method.as_bytes())
                .map_err(|e| NetworkError::Rejected(e.to_string()))?;

            trace!("发送网络请求: {} {}", method, url);

            let mut builder = self.client.request(method, url.clone());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let mut result = Response::new(status, Vec::new());
            for (name, value) in response.headers() {
                if let Ok(value) = value.to_str() {
                    result = result.with_header(name.as_str(), value);
                }
            }
            result.body = response.bytes().await?.to_vec();

            debug!("网络响应: url={}, status={}", url, status);
            Ok(result)
        }
    }
}
