//! 请求分类集成测试
//!
//! 测试分类结果与路由器拦截行为的一致性

use crate::common::*;
use cacheron::{http::Request, RequestClass};

/// 非GET请求与内部协议不拦截，也不访问网络
#[tokio::test]
async fn test_ignored_requests_pass_through() {
    let env = TestEnv::new(MockNetwork::new().with_default_assets());
    env.install_and_activate().await;
    env.network.reset_calls();

    let requests = [
        Request::post("/api/cart").with_body(b"{}".to_vec()),
        Request::new("DELETE", "/api/cart/1"),
        Request::get("chrome-extension://abc/script.js"),
        Request::get("data:text/plain,hello"),
    ];

    for request in &requests {
        assert_eq!(env.router.classify(request), RequestClass::Ignored);
        let outcome = env.router.on_fetch(request).await;
        assert!(outcome.is_pass_through(), "{} 应不拦截", request.url);
        assert!(outcome.settle().await.is_none());
    }

    assert_eq!(env.network.calls(), 0);
    assert_eq!(env.router.stats().passthrough, requests.len() as u64);
}

/// API前缀只匹配路径开头
#[tokio::test]
async fn test_api_prefix_matches_path_start() {
    let env = TestEnv::new(MockNetwork::new());

    assert_eq!(
        env.router.classify(&Request::get("/api/products?page=2")),
        RequestClass::Api
    );
    assert_eq!(
        env.router
            .classify(&Request::get("http://localhost/api/cart/sync")),
        RequestClass::Api
    );
    assert_eq!(
        env.router.classify(&Request::get("/docs/api/index.html")),
        RequestClass::Static
    );
    assert_eq!(
        env.router.classify(&Request::get("/css/styles.min.css")),
        RequestClass::Static
    );
}

/// 方法大小写不影响分类
#[tokio::test]
async fn test_lowercase_get_is_intercepted() {
    let env = TestEnv::new(MockNetwork::new());
    let request = Request::new("get", "/");
    assert_eq!(env.router.classify(&request), RequestClass::Static);
}
