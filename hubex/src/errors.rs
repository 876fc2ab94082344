//! # **hubex** 错误定义

use crate::PartitionId;
use thiserror::Error;

/// 消费错误枚举
///
/// 协作方返回的错误原样保留，仅以所处阶段的变体包装。
#[derive(Debug, Error)]
pub enum HubError<E>
where
    E: std::error::Error + 'static,
{
    /// 分区发现失败，整个消费过程终止
    #[error("获取分区失败：{0}")]
    Discovery(#[source] E),
    /// 打开分区接收者失败，仅该分区终止
    #[error("分区{partition}打开接收者失败：{source}")]
    Open {
        /// 分区 Id
        partition: PartitionId,
        /// 原始错误
        source: E,
    },
    /// 接收事件失败，仅该分区终止
    #[error("分区{partition}接收事件失败：{source}")]
    Receive {
        /// 分区 Id
        partition: PartitionId,
        /// 原始错误
        source: E,
    },
    /// 关闭接收者失败，仅作报告
    #[error("分区{partition}关闭接收者失败：{source}")]
    Close {
        /// 分区 Id
        partition: PartitionId,
        /// 原始错误
        source: E,
    },
    /// 分区任务异常终止
    #[error("分区{partition}任务异常终止：{reason}")]
    Aborted {
        /// 分区 Id
        partition: PartitionId,
        /// 终止原因
        reason: String,
    },
}

impl<E> HubError<E>
where
    E: std::error::Error + 'static,
{
    /// 错误所属分区，分区发现错误不属于任何分区
    pub fn partition(&self) -> Option<&PartitionId> {
        match self {
            HubError::Discovery(_) => None,
            HubError::Open { partition, .. }
            | HubError::Receive { partition, .. }
            | HubError::Close { partition, .. }
            | HubError::Aborted { partition, .. } => Some(partition),
        }
    }
}

/// 配置错误枚举
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 加载配置错误
    #[error("加载配置错误：{0}")]
    Load(#[from] config::ConfigError),
    /// 配置验证错误
    #[error("配置'{section}'验证错误：{message}")]
    Validation {
        /// 配置节
        section: String,
        /// 错误信息
        message: String,
    },
}
