//! 日志初始化
//!
//! 需要启用 `telemetry` feature。安装 tracing-subscriber 的 fmt 订阅者，
//! `RUST_LOG` 环境变量优先于配置中的过滤级别。

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// 默认过滤级别，如 `info` 或 `cacheron=debug`
    pub filter: String,
    /// 是否输出JSON格式
    pub json: bool,
    /// 是否输出目标模块
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
            with_target: true,
        }
    }
}

/// 初始化全局订阅者
///
/// 已经安装过订阅者时返回错误。
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| format!("日志过滤配置无效: {}", e))?;

    let builder = fmt().with_env_filter(filter).with_target(config.with_target);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| format!("初始化日志失败: {}", e))?;

    info!("日志系统初始化完成: filter={}", config.filter);
    Ok(())
}
