//! 存储抽象层
//!
//! 定义缓存存储接口和内存实现。缓存存储按名称打开，同名的多次打开共享同一底层存储。

use crate::error::StorageError;
use crate::http::{CacheKey, Response};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// 命名缓存存储集合
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// 打开（必要时创建）指定名称的缓存存储
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>, StorageError>;

    /// 列出所有已存在的缓存存储名称
    async fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// 删除指定名称的缓存存储
    ///
    /// # 返回
    /// - `Ok(true)`: 存储存在并已删除
    /// - `Ok(false)`: 存储不存在
    async fn delete(&self, name: &str) -> Result<bool, StorageError>;

    /// 检查缓存存储是否存在
    async fn has(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.keys().await?.iter().any(|k| k == name))
    }
}

/// 单个缓存存储
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// 查找条目
    async fn match_request(&self, key: &CacheKey) -> Result<Option<Response>, StorageError>;

    /// 写入条目（覆盖同键旧值）
    async fn put(&self, key: CacheKey, response: Response) -> Result<(), StorageError>;

    /// 批量写入
    ///
    /// 默认逐条写入；能提供原子批量写入的实现应覆盖此方法。
    async fn put_all(&self, entries: Vec<(CacheKey, Response)>) -> Result<(), StorageError> {
        for (key, response) in entries {
            self.put(key, response).await?;
        }
        Ok(())
    }

    /// 列出所有键
    async fn keys(&self) -> Result<Vec<CacheKey>, StorageError>;
}

/// 内存缓存存储
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: DashMap<CacheKey, Response>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn match_request(&self, key: &CacheKey) -> Result<Option<Response>, StorageError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: CacheKey, response: Response) -> Result<(), StorageError> {
        self.entries.insert(key, response);
        Ok(())
    }

    async fn put_all(&self, entries: Vec<(CacheKey, Response)>) -> Result<(), StorageError> {
        // 内存写入不会失败，整批写入
        for (key, response) in entries {
            self.entries.insert(key, response);
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<CacheKey>, StorageError> {
        let mut keys: Vec<CacheKey> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}

/// 内存缓存存储集合
#[derive(Default, Clone)]
pub struct MemoryCacheStorage {
    stores: Arc<DashMap<String, Arc<MemoryCacheStore>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取具体类型的存储（测试中用于检查内容）
    pub fn store(&self, name: &str) -> Option<Arc<MemoryCacheStore>> {
        self.stores.get(name).map(|s| s.value().clone())
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>, StorageError> {
        let store = self
            .stores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryCacheStore::new()))
            .value()
            .clone();
        Ok(store)
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = self.stores.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.stores.remove(name).is_some())
    }
}
