//! 缓存代际生命周期管理
//!
//! 两个转换：
//!
//! - **安装**：打开静态资源代际的存储，抓取安装清单中的全部资源并整批写入。
//!   任一资源失败则安装失败，本批次不写入任何条目，实例变为 `Redundant`，
//!   之前的实例继续服务。成功后立即发出 skip-waiting 信号。
//! - **激活**：枚举所有缓存存储名称，删除不属于当前两个代际的存储，然后接管所有客户端。
//!   代际标识不变时重复激活不会删除任何存活存储。

use crate::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::error::RouterError;
use crate::http::Request;
use crate::network::Network;
use crate::registry::{CacheGeneration, CacheRegistry};
use crate::surface::ClientSurface;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// 实例生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WorkerState {
    /// 已创建，尚未安装
    Parsed,
    /// 安装中
    Installing,
    /// 已安装，等待激活
    Installed,
    /// 激活中
    Activating,
    /// 已激活，控制所有客户端
    Activated,
    /// 安装失败，已被丢弃
    Redundant,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

/// 安装结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// 写入的缓存存储名称
    pub cache: String,
    /// 预缓存的条目数
    pub cached: usize,
    /// 是否跳过等待，立即替换旧实例
    pub skip_waiting: bool,
}

/// 激活结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateReport {
    /// 被删除的旧代际存储
    pub deleted: Vec<String>,
    /// 保留的当前代际存储
    pub retained: Vec<String>,
    /// 被接管的客户端数量
    pub claimed: usize,
}

/// 生命周期管理器
pub struct LifecycleManager {
    origin: Url,
    registry: CacheRegistry,
    network: Arc<dyn Network>,
    clients: Arc<dyn ClientSurface>,
    install_assets: Vec<String>,
    diagnostics: Arc<dyn DiagnosticSink>,
    state: RwLock<WorkerState>,
}

impl LifecycleManager {
    pub fn new(
        origin: Url,
        registry: CacheRegistry,
        network: Arc<dyn Network>,
        clients: Arc<dyn ClientSurface>,
        install_assets: Vec<String>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            origin,
            registry,
            network,
            clients,
            install_assets,
            diagnostics,
            state: RwLock::new(WorkerState::Parsed),
        }
    }

    /// 当前状态
    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    fn set_state(&self, new_state: WorkerState) {
        let mut state = self.state.write();
        if *state != new_state {
            debug!("生命周期状态变更: {} -> {}", *state, new_state);
            *state = new_state;
        }
    }

    /// 检查并切换状态
    fn transition(&self, allowed: &[WorkerState], next: WorkerState) -> Result<(), RouterError> {
        let mut state = self.state.write();
        if !allowed.contains(&*state) {
            return Err(RouterError::LifecycleError(format!(
                "状态 {} 不允许切换到 {}",
                *state, next
            )));
        }
        debug!("生命周期状态变更: {} -> {}", *state, next);
        *state = next;
        Ok(())
    }

    /// 安装
    ///
    /// 被丢弃（`Redundant`）的实例可以重新安装。
    #[instrument(skip(self))]
    pub async fn install(&self) -> Result<InstallReport, RouterError> {
        self.transition(
            &[WorkerState::Parsed, WorkerState::Redundant],
            WorkerState::Installing,
        )?;

        match self.precache().await {
            Ok(mut report) => {
                report.skip_waiting = self.signal_skip_waiting().await;
                self.set_state(WorkerState::Installed);
                info!(
                    "安装完成: cache={}, cached={}",
                    report.cache, report.cached
                );
                Ok(report)
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant);
                error!("安装失败，实例被丢弃: {}", e);
                Err(e)
            }
        }
    }

    /// 抓取安装清单并整批写入
    async fn precache(&self) -> Result<InstallReport, RouterError> {
        let store = self.registry.open(CacheGeneration::Assets).await?;

        let fetches = self.install_assets.iter().map(|path| async move {
            let request = Request::get(path.as_str());
            let key = request.cache_key(&self.origin)?;
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| RouterError::InstallError(format!("{}: {}", path, e)))?;
            if !response.is_ok() {
                return Err(RouterError::InstallError(format!(
                    "{}: 状态码 {}",
                    path, response.status
                )));
            }
            Ok::<_, RouterError>((key, response))
        });

        let entries = futures::future::try_join_all(fetches).await?;
        let cached = entries.len();
        store.put_all(entries).await?;

        Ok(InstallReport {
            cache: self.registry.name(CacheGeneration::Assets).to_string(),
            cached,
            skip_waiting: false,
        })
    }

    /// 通知客户端面跳过等待
    ///
    /// 失败只上报诊断，安装结果不受影响。
    async fn signal_skip_waiting(&self) -> bool {
        match self.clients.skip_waiting().await {
            Ok(()) => true,
            Err(e) => {
                self.diagnostics
                    .report(DiagnosticEvent::notification_failed("skip_waiting", &e));
                false
            }
        }
    }

    /// 激活
    ///
    /// 已激活的实例可以重复激活。
    #[instrument(skip(self))]
    pub async fn activate(&self) -> Result<ActivateReport, RouterError> {
        let previous = self.state();
        self.transition(
            &[WorkerState::Installed, WorkerState::Activated],
            WorkerState::Activating,
        )?;

        match self.cleanup_and_claim().await {
            Ok(report) => {
                self.set_state(WorkerState::Activated);
                info!(
                    "激活完成: deleted={:?}, claimed={}",
                    report.deleted, report.claimed
                );
                Ok(report)
            }
            Err(e) => {
                self.set_state(previous);
                error!("激活失败: {}", e);
                Err(e)
            }
        }
    }

    async fn cleanup_and_claim(&self) -> Result<ActivateReport, RouterError> {
        let storage = self.registry.storage();
        let generations = self.registry.generations();

        let mut deleted = Vec::new();
        let mut retained = Vec::new();
        for name in storage.keys().await? {
            if generations.is_current(&name) {
                retained.push(name);
                continue;
            }
            if storage.delete(&name).await? {
                info!("删除旧代际缓存: {}", name);
                deleted.push(name);
            } else {
                warn!("旧代际缓存已不存在: {}", name);
            }
        }

        let claimed = match self.clients.claim().await {
            Ok(count) => count,
            Err(e) => {
                self.diagnostics
                    .report(DiagnosticEvent::notification_failed("claim", &e));
                return Err(e);
            }
        };

        Ok(ActivateReport {
            deleted,
            retained,
            claimed,
        })
    }
}
