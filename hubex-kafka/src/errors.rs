use thiserror::Error;

/// Kafka 事件流错误
#[derive(Debug, Error)]
pub enum KafkaStreamError {
    /// Kafka 错误
    #[error("Kafka错误：{0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
    /// 主题不存在
    #[error("主题{0}不存在")]
    TopicNotFound(String),
    /// 主题元数据错误
    #[error("主题{topic}元数据错误：{code}")]
    Topic {
        /// 主题
        topic: String,
        /// 错误码
        code: String,
    },
    /// 分区 Id 无效
    #[error("无效的分区Id：{0}")]
    Partition(String),
    /// 连接描述无效
    #[error("连接描述错误：{0}")]
    Connection(String),
    /// 后台任务错误
    #[error("后台任务错误：{0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for KafkaStreamError {
    fn from(e: tokio::task::JoinError) -> Self {
        KafkaStreamError::Join(e.to_string())
    }
}
