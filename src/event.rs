//! 事件生命周期守卫
//!
//! 拦截到的请求可能在响应返回之后仍有后台工作（缓存回写）。这些工作通过
//! [`EventGuard::wait_until`] 注册为任务，[`EventGuard::wait`] 会等待全部完成，
//! 事件在此之后才算处理完毕。

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, trace};

/// 事件生命周期守卫
#[derive(Debug, Clone, Default)]
pub struct EventGuard {
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl EventGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册需要在事件结束前完成的后台任务
    pub fn wait_until<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        self.tasks.lock().push(handle);
    }

    /// 尚未被等待的任务数量
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// 等待所有已注册任务完成
    ///
    /// 等待过程中新注册的任务同样会被等待。
    pub async fn wait(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
            if handles.is_empty() {
                break;
            }
            trace!("等待 {} 个后台任务", handles.len());
            for result in futures::future::join_all(handles).await {
                if let Err(e) = result {
                    error!("后台任务异常退出: {}", e);
                }
            }
        }
    }
}
