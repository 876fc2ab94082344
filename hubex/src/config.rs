//! # **hubex** 配置

use crate::errors::ConfigError;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::{fmt, path::PathBuf, str::FromStr, time::Duration};
use validator::Validate;

/// 构建分层配置
///
/// 依次加载 `config/default`、`config/$HUBEX_ENV` 及 `HUBEX__` 前缀的环境变量，
/// 配置目录可由 `HUBEX_CONFIG_ROOT` 覆盖。
pub fn build_config(crate_dir: PathBuf) -> Result<Config, ConfigError> {
    let config_root = std::env::var("HUBEX_CONFIG_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| crate_dir.join("config"));
    let env = std::env::var("HUBEX_ENV").unwrap_or_else(|_| "dev".to_string());
    let config = Config::builder()
        .add_source(File::from(config_root.join("default")).required(false))
        .add_source(File::from(config_root.join(env)).required(false))
        .add_source(
            Environment::with_prefix("HUBEX")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    Ok(config)
}

/// 接收者起始位置
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartPosition {
    /// 流起始
    #[default]
    Beginning,
    /// 流末尾，仅接收新事件
    End,
    /// 指定偏移
    Offset(i64),
}

impl fmt::Display for StartPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartPosition::Beginning => f.write_str("beginning"),
            StartPosition::End => f.write_str("end"),
            StartPosition::Offset(offset) => write!(f, "{offset}"),
        }
    }
}

impl FromStr for StartPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginning" | "earliest" | "start" => Ok(StartPosition::Beginning),
            "end" | "latest" => Ok(StartPosition::End),
            other => other
                .parse::<i64>()
                .ok()
                .filter(|offset| *offset >= 0)
                .map(StartPosition::Offset)
                .ok_or_else(|| format!("无效的起始位置'{s}'")),
        }
    }
}

/// 分区消费配置
#[derive(Debug, Deserialize, Validate, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ConsumeConfig {
    /// 空闲超时秒数
    #[validate(range(min = 1))]
    pub idle_timeout: u64,
    /// 接收者起始位置
    pub start: StartPosition,
}

impl Default for ConsumeConfig {
    fn default() -> Self {
        Self {
            idle_timeout: 30,
            start: StartPosition::Beginning,
        }
    }
}

impl ConsumeConfig {
    /// 空闲超时
    #[inline]
    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }

    /// 从配置节加载，配置节缺失时使用默认值
    pub fn load(config: &Config, section: &str) -> Result<Self, ConfigError> {
        let cfg = match config.get::<ConsumeConfig>(section) {
            Ok(cfg) => cfg,
            Err(config::ConfigError::NotFound(_)) => ConsumeConfig::default(),
            Err(e) => return Err(e.into()),
        };
        cfg.check(section)?;
        Ok(cfg)
    }

    /// 验证配置
    pub fn check(&self, section: &str) -> Result<(), ConfigError> {
        self.validate().map_err(|e| ConfigError::Validation {
            section: section.to_string(),
            message: e.to_string(),
        })?;
        match self.start {
            StartPosition::Offset(offset) if offset < 0 => Err(ConfigError::Validation {
                section: section.to_string(),
                message: format!("start: 偏移量不能为负数（{offset}）"),
            }),
            _ => Ok(()),
        }
    }
}
