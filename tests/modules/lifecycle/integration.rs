//! 生命周期集成测试
//!
//! 测试安装预缓存、代际清理与客户端接管

use crate::common::*;
use cacheron::{
    http::{Request, Response},
    CacheRegistry, CacheStorage, CacheStore, Client, LifecycleManager, MemoryCacheStorage,
    MemorySink, MemorySurface, RouterError, WorkerState,
};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

/// 安装后清单中每个资源都在静态资源存储中
#[tokio::test]
async fn test_install_precaches_manifest() {
    let env = TestEnv::new(MockNetwork::new().with_default_assets());

    let report = assert_ok!(env.router.on_install().await);
    assert_eq!(report.cache, env.assets_name());
    assert_eq!(report.cached, env.config.install_assets.len());
    assert!(report.skip_waiting);
    assert_eq!(env.router.state(), WorkerState::Installed);

    for path in &env.config.install_assets {
        assert!(env.assets_entry(path).await.is_some(), "{} 未预缓存", path);
    }
}

/// 任一资源抓取失败时安装失败，存储中没有任何条目
#[tokio::test]
async fn test_install_failure_leaves_store_empty() {
    let network = MockNetwork::new();
    network.fail("/a.html");
    let config = test_config().with_install_assets(["/a.html"]);
    let env = TestEnv::with_config(config, network, MemorySurface::new());

    let error = assert_err!(env.router.on_install().await);
    assert!(matches!(error, RouterError::InstallError(_)));
    assert_eq!(env.router.state(), WorkerState::Redundant);
    assert_eq!(env.surface.skip_waiting_count(), 0);

    let count = env
        .storage
        .store(env.assets_name())
        .map(|s| s.len())
        .unwrap_or(0);
    assert_eq!(count, 0);
}

/// 直接使用生命周期管理器时行为相同
#[tokio::test]
async fn test_manager_install_failure_writes_nothing() {
    let storage = MemoryCacheStorage::new();
    let network = MockNetwork::new();
    network.fail("/b.css");

    let config = test_config();
    let manager = LifecycleManager::new(
        origin(),
        CacheRegistry::new(Arc::new(storage.clone()), config.generations.clone()),
        Arc::new(network),
        Arc::new(MemorySurface::new()),
        vec!["/a.html".to_string(), "/b.css".to_string()],
        Arc::new(MemorySink::new()),
    );

    assert_err!(manager.install().await);
    let count = storage
        .store(&config.generations.assets)
        .map(|s| s.len())
        .unwrap_or(0);
    assert_eq!(count, 0);
}

/// 安装成功后通知客户端面跳过等待
#[tokio::test]
async fn test_install_signals_skip_waiting() {
    let env = TestEnv::new(MockNetwork::new().with_default_assets());

    let report = assert_ok!(env.router.on_install().await);
    assert!(report.skip_waiting);
    assert_eq!(env.surface.skip_waiting_count(), 1);
}

/// 失败后可以重新安装
#[tokio::test]
async fn test_install_retry_after_failure() {
    let env = TestEnv::new(MockNetwork::new().with_default_assets());
    env.network.fail("/js/app.min.js");

    assert_err!(env.router.on_install().await);
    assert_eq!(env.router.state(), WorkerState::Redundant);
    assert!(env.assets_entry("/").await.is_none());

    env.network.recover("/js/app.min.js");
    assert_ok!(env.router.on_install().await);
    assert_eq!(env.router.state(), WorkerState::Installed);
}

/// 激活删除所有非当前代际的存储并接管客户端
#[tokio::test]
async fn test_activate_deletes_stale_and_claims() {
    let surface = MemorySurface::new();
    surface.add_client(Client::window("http://localhost/"));
    let env = TestEnv::with_config(
        test_config(),
        MockNetwork::new().with_default_assets(),
        surface,
    );

    env.storage.open("static-v0").await.unwrap();
    env.storage.open("api-v0").await.unwrap();
    env.storage.open("unrelated").await.unwrap();

    assert_ok!(env.router.on_install().await);
    let report = assert_ok!(env.router.on_activate().await);

    assert_eq!(env.router.state(), WorkerState::Activated);
    assert_eq!(report.deleted.len(), 3);
    assert!(report.retained.contains(&env.assets_name().to_string()));
    assert_eq!(report.claimed, 1);
    assert_eq!(env.surface.claim_count(), 1);

    let names = env.storage.keys().await.unwrap();
    assert_eq!(names, vec![env.assets_name().to_string()]);
}

/// 重复激活不改变两个代际存储的内容
#[tokio::test]
async fn test_activate_is_idempotent() {
    let network = MockNetwork::new()
        .with_default_assets()
        .with_route("/api/products", Response::new(200, "[]"));
    let env = TestEnv::new(network);
    env.storage.open("static-old").await.unwrap();

    assert_ok!(env.router.on_install().await);
    let first = assert_ok!(env.router.on_activate().await);
    assert_eq!(first.deleted, vec!["static-old".to_string()]);

    assert_ok!(env
        .router
        .on_fetch(&Request::get("/api/products"))
        .await
        .settle()
        .await
        .unwrap());

    let assets = env.storage.store(env.assets_name()).unwrap();
    let api = env.storage.store(env.api_name()).unwrap();
    let assets_keys = assets.keys().await.unwrap();
    let api_keys = api.keys().await.unwrap();
    assert_eq!(assets_keys.len(), env.config.install_assets.len());
    assert_eq!(api_keys.len(), 1);

    let second = assert_ok!(env.router.on_activate().await);
    assert!(second.deleted.is_empty());
    assert_eq!(env.router.state(), WorkerState::Activated);

    let assets = env.storage.store(env.assets_name()).unwrap();
    let api = env.storage.store(env.api_name()).unwrap();
    assert_eq!(assets.len(), assets_keys.len());
    assert_eq!(api.len(), 1);
    assert_eq!(assets.keys().await.unwrap(), assets_keys);
    assert_eq!(api.keys().await.unwrap(), api_keys);
    assert_eq!(
        env.api_entry("/api/products").await.map(|r| r.text().into_owned()),
        Some("[]".to_string())
    );
}

/// 未安装时不能激活
#[tokio::test]
async fn test_activate_requires_install() {
    let env = TestEnv::new(MockNetwork::new());
    let error = assert_err!(env.router.on_activate().await);
    assert!(matches!(error, RouterError::LifecycleError(_)));
    assert_eq!(env.router.state(), WorkerState::Parsed);
}
