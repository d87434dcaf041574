//! 端到端测试：缓存代际升级
//!
//! 测试场景：
//! 1. 旧版本（v1）安装激活并缓存了资源和API快照
//! 2. 新版本（v2）使用新代际标识安装，与旧版本共享缓存存储
//! 3. 新版本激活后只剩下新代际的存储，旧资源不再被返回

use crate::common::*;
use cacheron::{
    http::{Request, Response},
    CacheStorage, MemoryCacheStorage, MemorySink, MemorySurface, OfflineRouter, RouterConfig,
    WorkerState,
};
use std::sync::Arc;
use tokio_test::assert_ok;

fn router(config: RouterConfig, network: Arc<MockNetwork>, storage: &MemoryCacheStorage) -> OfflineRouter {
    OfflineRouter::builder(config)
        .network(network)
        .cache_storage(Arc::new(storage.clone()))
        .surface(Arc::new(MemorySurface::new()))
        .diagnostics(Arc::new(MemorySink::new()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_e2e_generation_rollover() {
    let storage = MemoryCacheStorage::new();
    let network = Arc::new(
        MockNetwork::new()
            .with_default_assets()
            .with_route("/api/products", Response::new(200, "products v1")),
    );

    // 1. 旧版本
    let v1 = RouterConfig::default().with_generations("static-v1", "api-v1");
    let old = router(v1, network.clone(), &storage);
    assert_ok!(old.on_install().await);
    assert_ok!(old.on_activate().await);
    old.on_fetch(&Request::get("/api/products")).await.settle().await;

    let mut names = storage.keys().await.unwrap();
    names.sort();
    assert_eq!(names, vec!["api-v1".to_string(), "static-v1".to_string()]);

    // 2. 新版本安装，资源内容已更新
    network.route("/css/styles.min.css", Response::new(200, "styles v2"));
    let v2 = RouterConfig::default().with_generations("static-v2", "api-v2");
    let new = router(v2, network.clone(), &storage);
    let report = assert_ok!(new.on_install().await);
    assert_eq!(report.cache, "static-v2");
    assert_eq!(storage.keys().await.unwrap().len(), 3);

    // 3. 激活新版本
    let report = assert_ok!(new.on_activate().await);
    let mut deleted = report.deleted.clone();
    deleted.sort();
    assert_eq!(deleted, vec!["api-v1".to_string(), "static-v1".to_string()]);
    assert_eq!(storage.keys().await.unwrap(), vec!["static-v2".to_string()]);
    assert_eq!(new.state(), WorkerState::Activated);

    network.set_offline(true);
    let styles = assert_ok!(new
        .on_fetch(&Request::get("/css/styles.min.css"))
        .await
        .settle()
        .await
        .unwrap());
    assert_eq!(styles.text(), "styles v2");

    // 旧的API快照已随旧代际删除
    let products = assert_ok!(new
        .on_fetch(&Request::get("/api/products"))
        .await
        .settle()
        .await
        .unwrap());
    assert_eq!(products.status, 503);
}
