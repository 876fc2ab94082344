//! # **hubex** 特征

use crate::{EventRecord, PartitionId, RawEvent, config::StartPosition};
use std::{future::Future, time::Duration};

/// 分区事件流特征
pub trait Stream: Send + Sync + 'static {
    /// 协作方错误类型
    type Error: std::error::Error + Send + Sync + 'static;
    /// 分区接收者类型
    type Receiver: Receiver<Error = Self::Error>;

    /// 获取当前分区集合
    fn partitions(&self) -> impl Future<Output = Result<Vec<PartitionId>, Self::Error>> + Send;

    /// 在起始位置打开分区接收者
    fn open(
        &self,
        partition: &PartitionId,
        consumer_group: &str,
        start: StartPosition,
    ) -> impl Future<Output = Result<Self::Receiver, Self::Error>> + Send;
}

/// 分区接收者特征
///
/// `recv` 须可安全取消：空闲超时或关闭信号会丢弃尚未完成的 future，
/// 不得因此丢失事件。
pub trait Receiver: Send + 'static {
    /// 协作方错误类型
    type Error: std::error::Error + Send + Sync + 'static;

    /// 接收下一个事件
    fn recv(&mut self) -> impl Future<Output = Result<RawEvent, Self::Error>> + Send;

    /// 关闭接收者
    fn close(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// 事件记录输出特征
pub trait Sink: Send + Sync + 'static {
    /// 输出事件记录
    fn emit(&self, record: EventRecord);
}

/// 诊断报告特征，不影响消费流程
pub trait Reporter: Send + Sync + 'static {
    /// 报告分区空闲
    fn idle(&self, partition: &PartitionId, idle: Duration);

    /// 报告分区错误
    fn error(&self, partition: &PartitionId, error: &(dyn std::error::Error + Send + Sync));
}
