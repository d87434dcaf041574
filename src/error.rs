//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! 错误类型定义
//!
//! 使用thiserror定义所有错误类型。

use thiserror::Error;

/// 路由器错误类型
#[derive(Error, Debug)]
pub enum RouterError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 存储错误
    #[error("存储错误: {0}")]
    StorageError(#[from] StorageError),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(#[from] NetworkError),

    /// 安装失败
    #[error("安装失败: {0}")]
    InstallError(String),

    /// 生命周期状态错误
    #[error("生命周期错误: {0}")]
    LifecycleError(String),

    /// 后台同步错误
    #[error("同步错误: {0}")]
    SyncError(String),

    /// 通知错误
    #[error("通知错误: {0}")]
    NotificationError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// YAML解析错误
    #[error("YAML解析错误: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML解析错误
    #[error("TOML解析错误: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 其他错误
    #[error("未知错误: {0}")]
    Other(String),
}

impl RouterError {
    /// 是否为传输层失败
    pub fn is_network(&self) -> bool {
        matches!(self, RouterError::NetworkError(_))
    }
}

/// 存储错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// 连接错误
    #[error("连接错误: {0}")]
    ConnectionError(String),

    /// 查询错误
    #[error("查询错误: {0}")]
    QueryError(String),

    /// 写入错误
    #[error("写入错误: {0}")]
    WriteError(String),

    /// 未找到
    #[error("未找到: {0}")]
    NotFound(String),
}

/// 网络错误
///
/// 传输层失败是本引擎唯一观察到的取消信号。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// 网络不可达
    #[error("网络不可达: {0}")]
    Unreachable(String),

    /// 请求超时
    #[error("请求超时: {0}")]
    Timeout(String),

    /// 请求被拒绝
    #[error("请求被拒绝: {0}")]
    Rejected(String),

    /// URL无效
    #[error("URL无效: {0}")]
    InvalidUrl(String),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout(err.to_string())
        } else if err.is_connect() {
            NetworkError::Unreachable(err.to_string())
        } else if err.is_builder() {
            NetworkError::InvalidUrl(err.to_string())
        } else {
            NetworkError::Rejected(err.to_string())
        }
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        NetworkError::InvalidUrl(err.to_string())
    }
}
