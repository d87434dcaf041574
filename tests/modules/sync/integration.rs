//! 后台同步集成测试
//!
//! 测试购物车快照发送、确认通知与失败上报

use crate::common::*;
use cacheron::{
    http::Response, CartItem, MemorySurface, RouterError, SyncOutcome,
};
use tokio_test::{assert_err, assert_ok};

fn sync_network() -> MockNetwork {
    MockNetwork::new().with_route("/api/cart/sync", Response::new(200, "{}"))
}

/// 同步成功：POST 购物车快照并展示确认通知
#[tokio::test]
async fn test_sync_posts_cart_and_notifies() {
    let env = TestEnv::new(sync_network());
    env.cart.push(CartItem::new("sku-1", 2));
    env.cart.push(CartItem::new("sku-2", 1));

    let outcome = assert_ok!(env.router.on_sync("sync-cart").await);
    let notification = match outcome {
        SyncOutcome::Synced {
            items,
            notification,
        } => {
            assert_eq!(items, 2);
            notification
        }
        other => panic!("unexpected outcome: {:?}", other),
    };

    assert_eq!(notification.title, "Cart Synced");
    assert_eq!(notification.options.body, "Your cart has been synchronized");
    assert_eq!(notification.options.tag.as_deref(), Some("sync-cart"));

    let requests = env.network.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.url, "/api/cart/sync");
    assert_eq!(request.header("content-type"), Some("application/json"));

    let body: Vec<CartItem> = serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, vec![CartItem::new("sku-1", 2), CartItem::new("sku-2", 1)]);

    assert!(env.cart.is_empty());
    assert_eq!(env.surface.notifications().len(), 1);
}

/// 未知标签不做任何事
#[tokio::test]
async fn test_unknown_tag_ignored() {
    let env = TestEnv::new(sync_network());
    env.cart.push(CartItem::new("sku-1", 1));

    let outcome = assert_ok!(env.router.on_sync("sync-wishlist").await);
    assert_eq!(outcome, SyncOutcome::Ignored);
    assert_eq!(env.network.calls(), 0);
    assert_eq!(env.cart.len(), 1);
    assert!(env.surface.shown().is_empty());
}

/// 离线时同步失败：上报诊断，不展示通知，购物车保留
#[tokio::test]
async fn test_sync_failure_reported_and_retained() {
    let env = TestEnv::new(sync_network());
    env.cart.push(CartItem::new("sku-1", 3));
    env.network.set_offline(true);

    let error = assert_err!(env.router.on_sync("sync-cart").await);
    assert!(matches!(error, RouterError::SyncError(_)));
    assert_eq!(env.sink.count("sync_failed"), 1);
    assert!(env.surface.shown().is_empty());
    assert_eq!(env.cart.len(), 1);

    // 网络恢复后重新投递成功
    env.network.set_offline(false);
    assert_ok!(env.router.on_sync("sync-cart").await);
    assert!(env.cart.is_empty());
}

/// 同步端点返回错误状态码视为失败
#[tokio::test]
async fn test_sync_rejected_by_endpoint() {
    let network = MockNetwork::new().with_route("/api/cart/sync", Response::new(500, "oops"));
    let env = TestEnv::new(network);
    env.cart.push(CartItem::new("sku-1", 1));

    assert_err!(env.router.on_sync("sync-cart").await);
    assert_eq!(env.cart.len(), 1);
    assert_eq!(env.sink.count("sync_failed"), 1);
}

/// 空购物车同样发送并确认
#[tokio::test]
async fn test_empty_cart_still_syncs() {
    let env = TestEnv::with_config(test_config(), sync_network(), MemorySurface::new());

    let outcome = assert_ok!(env.router.on_sync("sync-cart").await);
    assert!(matches!(outcome, SyncOutcome::Synced { items: 0, .. }));
    let requests = env.network.requests();
    assert_eq!(requests[0].body.as_deref(), Some(&b"[]"[..]));
}
