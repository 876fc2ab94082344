//! # **hubex** 通知总线
//!
//! 显式构造、按引用共享的处理器注册表，按通知种类标签分发。

use crate::{
    EventRecord, PartitionId,
    domain::{Reporter, Sink},
};
use ahash::AHashMap;
use std::{
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};
use tracing::debug;

/// 通知种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// 事件记录
    Record,
    /// 分区空闲
    Idle,
    /// 分区错误
    Failure,
}

/// 通知
#[derive(Debug, Clone)]
pub enum Notice {
    /// 事件记录
    Record(EventRecord),
    /// 分区空闲
    Idle {
        /// 分区 Id
        partition: PartitionId,
        /// 空闲时长
        idle: Duration,
    },
    /// 分区错误
    Failure {
        /// 分区 Id
        partition: PartitionId,
        /// 错误信息
        message: String,
    },
}

impl Notice {
    /// 通知种类标签
    pub fn kind(&self) -> Kind {
        match self {
            Notice::Record(_) => Kind::Record,
            Notice::Idle { .. } => Kind::Idle,
            Notice::Failure { .. } => Kind::Failure,
        }
    }
}

/// 通知处理特征
pub trait Handle: Send + Sync + 'static {
    /// 处理通知
    fn handle(&self, notice: &Notice);
}

impl<F> Handle for F
where
    F: Fn(&Notice) + Send + Sync + 'static,
{
    fn handle(&self, notice: &Notice) {
        self(notice)
    }
}

/// 通知总线
#[derive(Default)]
pub struct Bus {
    handlers: RwLock<AHashMap<Kind, Arc<dyn Handle>>>,
}

impl Bus {
    /// 构造函数
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册处理器，返回被替换的处理器
    pub fn register<H>(&self, kind: Kind, handler: H) -> Option<Arc<dyn Handle>>
    where
        H: Handle,
    {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, Arc::new(handler))
    }

    /// 注销处理器
    pub fn unregister(&self, kind: Kind) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&kind)
            .is_some()
    }

    /// 清空所有处理器
    pub fn clear(&self) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// 在当前任务内同步分发，无处理器时返回 false
    pub fn publish(&self, notice: Notice) -> bool {
        match self.handler(notice.kind()) {
            Some(handler) => {
                handler.handle(&notice);
                true
            }
            None => {
                debug!("{:?}通知无处理器", notice.kind());
                false
            }
        }
    }

    /// 启用独立任务异步分发，无处理器时返回 false
    ///
    /// 须在 tokio 运行时内调用，异步分发不保证通知顺序。
    pub fn publish_async(&self, notice: Notice) -> bool {
        match self.handler(notice.kind()) {
            Some(handler) => {
                tokio::spawn(async move { handler.handle(&notice) });
                true
            }
            None => {
                debug!("{:?}通知无处理器", notice.kind());
                false
            }
        }
    }

    fn handler(&self, kind: Kind) -> Option<Arc<dyn Handle>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
    }
}

impl Sink for Bus {
    fn emit(&self, record: EventRecord) {
        self.publish(Notice::Record(record));
    }
}

impl Reporter for Bus {
    fn idle(&self, partition: &PartitionId, idle: Duration) {
        self.publish(Notice::Idle {
            partition: partition.clone(),
            idle,
        });
    }

    fn error(&self, partition: &PartitionId, error: &(dyn std::error::Error + Send + Sync)) {
        self.publish(Notice::Failure {
            partition: partition.clone(),
            message: error.to_string(),
        });
    }
}
