//! # **hubex** 的 Kafka 实现
//!
//! 以 Kafka 协议访问分区事件流，兼容 Azure Event Hubs 的 Kafka 端点。
#![warn(missing_docs)]

pub mod config;
pub mod connection;
pub mod errors;
pub mod stream;


pub use config::KafkaConfig;
pub use connection::Connection;
pub use errors::KafkaStreamError;
pub use stream::{KafkaReceiver, KafkaStream};
