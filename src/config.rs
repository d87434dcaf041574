//! 配置模块
//!
//! 定义路由器的配置结构。缓存代际标识、API前缀、安装清单等都在构造时注入，
//! 测试可以为每次运行使用不同的代际标识。

use crate::constants::*;
use crate::error::RouterError;
use ahash::AHashSet as HashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// 路由器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub version: String,
    /// 用于解析相对URL的源地址
    pub origin: String,
    pub generations: GenerationConfig,
    /// API请求路径前缀
    pub api_prefix: String,
    pub fallback: FallbackConfig,
    /// 安装时预缓存的资源清单
    pub install_assets: Vec<String>,
    pub sync: SyncConfig,
    pub notification: NotificationConfig,
    pub network: NetworkConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            generations: GenerationConfig::default(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            fallback: FallbackConfig::default(),
            install_assets: DEFAULT_INSTALL_ASSETS.iter().map(|s| s.to_string()).collect(),
            sync: SyncConfig::default(),
            notification: NotificationConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl RouterConfig {
    /// 使用指定的代际标识创建配置
    pub fn with_generations(mut self, assets: impl Into<String>, api: impl Into<String>) -> Self {
        self.generations = GenerationConfig {
            assets: assets.into(),
            api: api.into(),
        };
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_install_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.install_assets = assets.into_iter().map(Into::into).collect();
        self
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), String> {
        if self.version.is_empty() {
            return Err("版本号不能为空".to_string());
        }

        let origin = Url::parse(&self.origin).map_err(|e| format!("源地址无效: {}", e))?;
        if !FETCHABLE_SCHEMES.contains(&origin.scheme()) {
            return Err(format!("源地址必须是 http(s): {}", self.origin));
        }

        self.generations.validate()?;

        if !self.api_prefix.starts_with('/') {
            return Err(format!("API前缀必须以 / 开头: {}", self.api_prefix));
        }

        let mut seen = HashSet::new();
        for (index, asset) in self.install_assets.iter().enumerate() {
            if !asset.starts_with('/') {
                return Err(format!("安装清单[{}]必须以 / 开头: {}", index, asset));
            }
            if !seen.insert(asset.as_str()) {
                return Err(format!("安装清单重复: {}", asset));
            }
        }

        for resource in [&self.fallback.offline_page, &self.fallback.placeholder_image] {
            if !resource.starts_with('/') {
                return Err(format!("降级资源必须以 / 开头: {}", resource));
            }
        }

        self.sync.validate()?;

        if self.network.timeout_secs == 0 {
            return Err("网络超时必须大于0".to_string());
        }

        Ok(())
    }

    /// 未包含在安装清单中的降级资源
    ///
    /// 这些资源不会被预缓存，离线时对应的降级选择结果为空。
    pub fn missing_fallbacks(&self) -> Vec<&str> {
        [&self.fallback.offline_page, &self.fallback.placeholder_image]
            .into_iter()
            .filter(|resource| !self.install_assets.contains(*resource))
            .map(String::as_str)
            .collect()
    }

    /// 解析源地址
    pub fn origin_url(&self) -> Result<Url, RouterError> {
        Url::parse(&self.origin).map_err(|e| RouterError::ConfigError(format!("源地址无效: {}", e)))
    }

    /// 从YAML字符串加载
    pub fn from_yaml_str(content: &str) -> Result<Self, RouterError> {
        let config: RouterConfig = serde_yaml::from_str(content)?;
        config.validate().map_err(RouterError::ConfigError)?;
        Ok(config)
    }

    /// 从TOML字符串加载
    pub fn from_toml_str(content: &str) -> Result<Self, RouterError> {
        let config: RouterConfig = toml::from_str(content)?;
        config.validate().map_err(RouterError::ConfigError)?;
        Ok(config)
    }

    /// 从文件加载，按扩展名选择格式
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RouterError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            other => Err(RouterError::ConfigError(format!(
                "不支持的配置文件格式: {:?}",
                other
            ))),
        }
    }

    /// 计算配置哈希值
    pub fn compute_hash(&self) -> String {
        let config_str = serde_json::to_string(self).unwrap_or_default();
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        config_str.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }
}

/// 缓存代际配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// 静态资源代际标识
    pub assets: String,
    /// API响应代际标识
    pub api: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            assets: DEFAULT_ASSETS_GENERATION.to_string(),
            api: DEFAULT_API_GENERATION.to_string(),
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.assets.is_empty() || self.api.is_empty() {
            return Err("缓存代际标识不能为空".to_string());
        }
        if self.assets == self.api {
            return Err(format!("两个缓存代际标识不能相同: {}", self.assets));
        }
        Ok(())
    }

    /// 是否为当前代际之一
    pub fn is_current(&self, name: &str) -> bool {
        name == self.assets || name == self.api
    }
}

/// 降级资源配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// 离线页面
    pub offline_page: String,
    /// 占位图片
    pub placeholder_image: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            offline_page: DEFAULT_OFFLINE_PAGE.to_string(),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
        }
    }
}

/// 后台同步配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// 同步触发标签
    pub tag: String,
    /// 同步端点
    pub endpoint: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tag: DEFAULT_SYNC_TAG.to_string(),
            endpoint: DEFAULT_SYNC_ENDPOINT.to_string(),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.tag.is_empty() {
            return Err("同步标签不能为空".to_string());
        }
        if self.endpoint.is_empty() {
            return Err("同步端点不能为空".to_string());
        }
        Ok(())
    }
}

/// 通知配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub default_title: String,
    pub default_body: String,
    pub default_icon: String,
    pub default_badge: String,
    pub default_url: String,
    /// 同步成功确认通知标题
    pub sync_title: String,
    /// 同步成功确认通知内容
    pub sync_body: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_NOTIFICATION_TITLE.to_string(),
            default_body: DEFAULT_NOTIFICATION_BODY.to_string(),
            default_icon: DEFAULT_NOTIFICATION_ICON.to_string(),
            default_badge: DEFAULT_NOTIFICATION_BADGE.to_string(),
            default_url: DEFAULT_NOTIFICATION_URL.to_string(),
            sync_title: DEFAULT_SYNC_NOTIFICATION_TITLE.to_string(),
            sync_body: DEFAULT_SYNC_NOTIFICATION_BODY.to_string(),
        }
    }
}

/// 网络后端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_NETWORK_TIMEOUT_SECS,
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
