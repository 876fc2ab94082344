//! 连接描述

use crate::errors::KafkaStreamError;
use rdkafka::ClientConfig;
use std::{collections::HashMap, fmt, str::FromStr};

const EVENT_HUBS_PORT: u16 = 9093;

/// 连接描述
///
/// 支持 Event Hubs 连接字符串，或以逗号分隔的 Kafka 引导服务器列表。
#[derive(Clone, PartialEq)]
pub struct Connection {
    bootstrap: String,
    secret: Option<String>,
    entity: Option<String>,
}

impl Connection {
    /// 引导服务器
    pub fn bootstrap(&self) -> &str {
        &self.bootstrap
    }

    /// 连接字符串中的事件中心名称
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// 是否需要 SASL 认证
    pub fn is_authenticated(&self) -> bool {
        self.secret.is_some()
    }

    /// 生成客户端配置，连接相关配置优先于附加配置
    pub fn client_config(&self, settings: &HashMap<String, String>) -> ClientConfig {
        let mut config = ClientConfig::new();
        for (key, value) in settings {
            config.set(key, value);
        }
        config.set("bootstrap.servers", &self.bootstrap);
        if let Some(secret) = &self.secret {
            config
                .set("security.protocol", "SASL_SSL")
                .set("sasl.mechanism", "PLAIN")
                .set("sasl.username", "$ConnectionString")
                .set("sasl.password", secret);
        }
        config
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("bootstrap", &self.bootstrap)
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("entity", &self.entity)
            .finish()
    }
}

impl FromStr for Connection {
    type Err = KafkaStreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KafkaStreamError::Connection("连接描述为空".to_owned()));
        }
        if !s.contains('=') {
            return Ok(Self {
                bootstrap: s.to_owned(),
                secret: None,
                entity: None,
            });
        }

        let mut pairs = HashMap::new();
        for part in s.split(';').filter(|p| !p.trim().is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| KafkaStreamError::Connection(format!("无法解析'{part}'")))?;
            pairs.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
        }

        let endpoint = pairs
            .get("endpoint")
            .ok_or_else(|| KafkaStreamError::Connection("缺少'Endpoint'".to_owned()))?;
        let host = endpoint
            .trim_start_matches("sb://")
            .trim_end_matches('/')
            .to_owned();
        if host.is_empty() {
            return Err(KafkaStreamError::Connection("'Endpoint'为空".to_owned()));
        }
        let signed = pairs.contains_key("sharedaccesssignature");
        let keyed = pairs.contains_key("sharedaccesskeyname") && pairs.contains_key("sharedaccesskey");
        if !signed && !keyed {
            return Err(KafkaStreamError::Connection("缺少共享访问凭据".to_owned()));
        }

        let bootstrap = match host.contains(':') {
            true => host,
            false => format!("{host}:{EVENT_HUBS_PORT}"),
        };
        Ok(Self {
            bootstrap,
            secret: Some(s.to_owned()),
            entity: pairs.get("entitypath").cloned(),
        })
    }
}
