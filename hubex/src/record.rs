use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{fmt, sync::Arc};

/// 分区 Id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(Arc<str>);

impl PartitionId {
    /// 字符串形式
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartitionId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for PartitionId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

/// 传输层原始事件
#[derive(Debug, Clone)]
pub struct RawEvent {
    /// 传输层报告的分区 Id
    pub partition: PartitionId,
    /// 消息体，可能缺失
    pub payload: Option<Bytes>,
    /// 传输层报告的入队时间
    pub enqueued_at: DateTime<Utc>,
}

impl RawEvent {
    /// 转换为标准事件记录，消息体缺失或为空时返回 None
    pub fn into_record(self) -> Option<EventRecord> {
        match self.payload {
            Some(payload) if !payload.is_empty() => Some(EventRecord {
                partition: self.partition,
                payload,
                enqueued_at: self.enqueued_at,
            }),
            _ => None,
        }
    }
}

/// 标准事件记录
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// 分区 Id
    pub partition: PartitionId,
    /// 消息体
    pub payload: Bytes,
    /// 入队时间
    pub enqueued_at: DateTime<Utc>,
}
