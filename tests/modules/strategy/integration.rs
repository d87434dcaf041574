//! 缓存策略集成测试
//!
//! 测试网络优先与缓存优先策略在路由器中的完整行为

use crate::common::*;
use cacheron::{
    http::{Request, Response},
    MemorySink, MemorySurface, OfflineRouter, RequestClass, RouterError,
};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

/// API请求成功时返回实时响应，并写入快照
#[tokio::test]
async fn test_api_success_stores_snapshot() {
    init_test_tracing();
    let network = MockNetwork::new().with_route(
        "/api/products",
        Response::new(200, r#"[{"id":1}]"#).with_header("content-type", "application/json"),
    );
    let env = TestEnv::new(network);

    let outcome = env.router.on_fetch(&Request::get("/api/products")).await;
    assert_eq!(outcome.class(), RequestClass::Api);
    let response = assert_ok!(outcome.settle().await.unwrap());
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), r#"[{"id":1}]"#);

    let cached = env.api_entry("/api/products").await.unwrap();
    assert_eq!(cached, response);
    assert_eq!(env.router.stats().cache_writes, 1);
}

/// API请求离线时使用之前的快照
#[tokio::test]
async fn test_api_offline_uses_snapshot() {
    let network = MockNetwork::new().with_route("/api/products", Response::new(200, "v1"));
    let env = TestEnv::new(network);

    assert_ok!(env
        .router
        .on_fetch(&Request::get("/api/products"))
        .await
        .settle()
        .await
        .unwrap());

    env.network.set_offline(true);
    let response = assert_ok!(env
        .router
        .on_fetch(&Request::get("/api/products"))
        .await
        .settle()
        .await
        .unwrap());
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "v1");
}

/// API请求离线且无快照时返回合成的 503
#[tokio::test]
async fn test_api_total_failure_synthesizes_503() {
    let env = TestEnv::new(MockNetwork::new());
    env.network.set_offline(true);

    let response = assert_ok!(env
        .router
        .on_fetch(&Request::get("/api/orders"))
        .await
        .settle()
        .await
        .unwrap());

    assert_eq!(response.status, 503);
    assert_eq!(response.header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body, serde_json::json!({"error": "Network error"}));
    assert_eq!(env.router.stats().synthesized_errors, 1);
    assert!(env.api_entry("/api/orders").await.is_none());
}

/// 非成功状态码原样返回但不写入缓存
#[tokio::test]
async fn test_api_error_status_not_cached() {
    let network = MockNetwork::new().with_route("/api/broken", Response::new(500, "boom"));
    let env = TestEnv::new(network);

    let response = assert_ok!(env
        .router
        .on_fetch(&Request::get("/api/broken"))
        .await
        .settle()
        .await
        .unwrap());
    assert_eq!(response.status, 500);
    assert!(env.api_entry("/api/broken").await.is_none());
}

/// 静态资源缓存命中时不访问网络
#[tokio::test]
async fn test_static_cache_hit_skips_network() {
    let env = TestEnv::new(MockNetwork::new());
    env.seed_assets("/css/styles.min.css", Response::new(200, "body{}"))
        .await;

    let response = assert_ok!(env
        .router
        .on_fetch(&Request::get("/css/styles.min.css"))
        .await
        .settle()
        .await
        .unwrap());

    assert_eq!(response.text(), "body{}");
    assert_eq!(env.network.calls(), 0);
    assert_eq!(env.router.stats().cache_hits, 1);
}

/// 静态资源未命中时从网络获取并写入当前代际
#[tokio::test]
async fn test_static_miss_fetches_and_caches() {
    let network = MockNetwork::new().with_route("/js/extra.js", Response::new(200, "let x;"));
    let env = TestEnv::new(network);

    let response = assert_ok!(env
        .router
        .on_fetch(&Request::get("/js/extra.js"))
        .await
        .settle()
        .await
        .unwrap());
    assert_eq!(response.text(), "let x;");
    assert_eq!(env.network.calls(), 1);

    let cached = env.assets_entry("/js/extra.js").await.unwrap();
    assert_eq!(cached.text(), "let x;");

    // 第二次请求直接命中缓存
    env.router
        .on_fetch(&Request::get("/js/extra.js"))
        .await
        .settle()
        .await;
    assert_eq!(env.network.calls(), 1);
}

/// HTML导航失败时返回离线页面
#[tokio::test]
async fn test_static_failure_serves_offline_page() {
    let env = TestEnv::new(MockNetwork::new().with_default_assets());
    env.install_and_activate().await;
    env.network.set_offline(true);

    let request = Request::get("/products/42").with_accept("text/html,application/xhtml+xml");
    let response = assert_ok!(env.router.on_fetch(&request).await.settle().await.unwrap());

    assert_eq!(response.text(), "<h1>You are offline</h1>");
    assert_eq!(env.router.stats().fallbacks_served, 1);
}

/// 图片请求失败时返回占位图片
#[tokio::test]
async fn test_static_failure_serves_placeholder() {
    let env = TestEnv::new(MockNetwork::new().with_default_assets());
    env.install_and_activate().await;
    env.network.set_offline(true);

    let request = Request::get("/images/product-7.jpg").with_accept("image/webp,image/*");
    let response = assert_ok!(env.router.on_fetch(&request).await.settle().await.unwrap());

    assert_eq!(response.text(), "PLACEHOLDER");
    assert_eq!(response.header("content-type"), Some("image/png"));
}

/// 既不是HTML也不是图片时返回原始网络错误
#[tokio::test]
async fn test_static_failure_without_fallback_surfaces_error() {
    let env = TestEnv::new(MockNetwork::new().with_default_assets());
    env.install_and_activate().await;
    env.network.set_offline(true);

    let request = Request::get("/fonts/inter.woff2").with_accept("font/woff2");
    let error = assert_err!(env.router.on_fetch(&request).await.settle().await.unwrap());
    assert!(matches!(error, RouterError::NetworkError(_)));
    assert!(error.is_network());
}

/// 缓存写入失败只上报诊断，不影响已返回的响应
#[tokio::test]
async fn test_cache_write_failure_reported() {
    let network = Arc::new(
        MockNetwork::new().with_route("/api/products", Response::new(200, "live")),
    );
    let sink = Arc::new(MemorySink::new());
    let storage = ReadOnlyCacheStorage::new(cacheron::MemoryCacheStorage::new());

    let router = OfflineRouter::builder(test_config())
        .network(network)
        .cache_storage(Arc::new(storage))
        .surface(Arc::new(MemorySurface::new()))
        .diagnostics(sink.clone())
        .build()
        .unwrap();

    let response = assert_ok!(router
        .on_fetch(&Request::get("/api/products"))
        .await
        .settle()
        .await
        .unwrap());

    assert_eq!(response.text(), "live");
    assert_eq!(sink.count("cache_write_failed"), 1);
    assert_eq!(router.stats().cache_write_failures, 1);
}
