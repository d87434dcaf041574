//! 缓存存储注册表
//!
//! 把逻辑缓存名映射到打开的存储句柄。任一时刻只有两个代际：
//! 静态资源代际和API代际。存储按需打开，从不显式关闭。

use crate::config::GenerationConfig;
use crate::error::StorageError;
use crate::storage::{CacheStorage, CacheStore};
use std::sync::Arc;
use tracing::trace;

/// 缓存代际
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheGeneration {
    /// 静态资源
    Assets,
    /// API响应
    Api,
}

impl CacheGeneration {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheGeneration::Assets => "assets",
            CacheGeneration::Api => "api",
        }
    }
}

/// 缓存存储注册表
#[derive(Clone)]
pub struct CacheRegistry {
    storage: Arc<dyn CacheStorage>,
    generations: GenerationConfig,
}

impl CacheRegistry {
    pub fn new(storage: Arc<dyn CacheStorage>, generations: GenerationConfig) -> Self {
        Self {
            storage,
            generations,
        }
    }

    /// 代际对应的存储名称
    pub fn name(&self, generation: CacheGeneration) -> &str {
        match generation {
            CacheGeneration::Assets => &self.generations.assets,
            CacheGeneration::Api => &self.generations.api,
        }
    }

    /// 打开代际对应的存储
    pub async fn open(&self, generation: CacheGeneration) -> Result<Arc<dyn CacheStore>, StorageError> {
        let name = self.name(generation);
        trace!("打开缓存存储: generation={}, name={}", generation.as_str(), name);
        self.storage.open(name).await
    }

    pub fn generations(&self) -> &GenerationConfig {
        &self.generations
    }

    /// 底层缓存存储集合
    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }
}
