//! # **hubex** 输出与诊断报告

use crate::{
    EventRecord, PartitionId,
    bus::Notice,
    domain::{Reporter, Sink},
};
use chrono::SecondsFormat;
use std::{
    fmt,
    io::{self, Write},
    sync::Mutex,
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::{error, warn};

/// 表格输出
pub struct TableSink<W>
where
    W: Write + Send + 'static,
{
    writer: Mutex<W>,
}

impl TableSink<io::Stdout> {
    /// 输出到标准输出
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W> TableSink<W>
where
    W: Write + Send + 'static,
{
    /// 构造函数
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// 输出一行事件记录
    pub fn print(&self, record: &EventRecord) {
        let line = format_row(record);
        let mut writer = match self.writer.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writer.write_all(line.as_bytes()).and_then(|_| writer.flush()) {
            error!("输出事件记录失败：{e}");
        }
    }

    /// 取回内部输出
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W> Sink for TableSink<W>
where
    W: Write + Send + 'static,
{
    fn emit(&self, record: EventRecord) {
        self.print(&record);
    }
}

/// 格式化表格行
pub fn format_row(record: &EventRecord) -> String {
    format!(
        "| {:<12} | {:<50} | {:<25} |\n",
        record.partition.as_str(),
        String::from_utf8_lossy(&record.payload),
        record
            .enqueued_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

/// 日志报告
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl LogReporter {
    /// 记录总线上的空闲与错误通知，事件记录通知忽略
    pub fn notice(&self, notice: &Notice) {
        match notice {
            Notice::Idle { partition, idle } => self.idle(partition, *idle),
            Notice::Failure { partition, message } => failure(partition, message),
            Notice::Record(_) => {}
        }
    }
}

impl Reporter for LogReporter {
    fn idle(&self, partition: &PartitionId, idle: Duration) {
        warn!("分区{partition}超过{}秒未收到事件", idle.as_secs());
    }

    fn error(&self, partition: &PartitionId, error: &(dyn std::error::Error + Send + Sync)) {
        failure(partition, &error);
    }
}

fn failure(partition: &PartitionId, message: &dyn fmt::Display) {
    error!("分区{partition}错误：{message}");
}

/// 通道输出，由接收端自行缓冲与消费
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<EventRecord>,
}

impl ChannelSink {
    /// 创建通道输出及其接收端
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EventRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Sink for ChannelSink {
    fn emit(&self, record: EventRecord) {
        if let Err(e) = self.tx.send(record) {
            warn!("接收端已关闭，丢弃分区{}事件", e.0.partition);
        }
    }
}
