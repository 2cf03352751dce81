//! 配置管理模块
//!
//! 支持配置文件加载与环境变量覆盖，为描述符构造提供默认参数。

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::descriptor::LockDescriptor;

/// 锁配置
#[derive(Debug, Clone, Deserialize)]
pub struct LockConfig {
    /// 默认锁超时时间（秒）
    pub max_lock_time_secs: u64,
    /// 获取锁重试次数
    pub retry_count: u32,
    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            max_lock_time_secs: 30,
            retry_count: 3,
            retry_delay_ms: 100,
        }
    }
}

impl LockConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. 环境变量（DISTLOCK_ 前缀，如 DISTLOCK_RETRY_COUNT -> retry_count）
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("DISTLOCK_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let defaults = Self::default();
        Config::builder()
            .set_default("max_lock_time_secs", defaults.max_lock_time_secs)?
            .set_default("retry_count", defaults.retry_count as u64)?
            .set_default("retry_delay_ms", defaults.retry_delay_ms)?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(Environment::with_prefix("DISTLOCK").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn max_lock_time(&self) -> Duration {
        Duration::from_secs(self.max_lock_time_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// 按配置中的默认参数构造锁描述符
    pub fn descriptor(
        &self,
        lock_type: impl Into<String>,
        lock_key: impl Into<String>,
        owner: impl Into<String>,
    ) -> LockDescriptor {
        LockDescriptor::new(
            lock_type,
            lock_key,
            owner,
            self.max_lock_time(),
            self.retry_count,
            self.retry_delay(),
        )
    }
}
