//! Kafka 配置

use hubex::{
    config::{ConsumeConfig, build_config},
    errors::ConfigError,
};
use std::{collections::HashMap, path::PathBuf};
use tokio::time::Duration;
use tracing::debug;

#[inline]
fn load_timeout(config: &config::Config) -> Duration {
    match config.get("timeout") {
        Ok(t) => Duration::from_secs(t),
        Err(_) => Duration::from_secs(45),
    }
}

fn load_settings(config: &config::Config, section: &str) -> Result<HashMap<String, String>, ConfigError> {
    match config.get::<HashMap<String, String>>(section) {
        Ok(settings) => Ok(settings),
        Err(config::ConfigError::NotFound(_)) => Ok(HashMap::new()),
        Err(e) => Err(e.into()),
    }
}

/// Kafka 事件流配置
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// 元数据请求超时
    pub timeout: Duration,
    /// 分区消费配置
    pub consume: ConsumeConfig,
    /// 附加的消费者配置
    pub cc: HashMap<String, String>,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(45),
            consume: ConsumeConfig::default(),
            cc: HashMap::new(),
        }
    }
}

impl KafkaConfig {
    /// 从 crate 目录下的配置文件及环境变量加载
    pub fn load(crate_dir: PathBuf) -> Result<Self, ConfigError> {
        let config = build_config(crate_dir)?;
        Self::from_config(&config)
    }

    /// 从已构建的配置加载
    pub fn from_config(config: &config::Config) -> Result<Self, ConfigError> {
        let timeout = load_timeout(config);
        let consume = ConsumeConfig::load(config, "consume")?;
        let cc = load_settings(config, "cc")?;
        debug!("加载Kafka配置，附加{}项消费者配置", cc.len());
        Ok(Self {
            timeout,
            consume,
            cc,
        })
    }
}
