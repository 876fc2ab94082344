//! # **hubex** 空闲看门狗

use crate::shutdown::ShutdownToken;
use std::future::Future;
use tokio::time::{Duration, sleep};

/// 单次等待结果
#[derive(Debug)]
pub enum Watch<T> {
    /// 收到事件
    Event(T),
    /// 空闲超时
    Idle,
    /// 收到关闭信号
    Cancelled,
}

/// 空闲看门狗
#[derive(Debug, Clone, Copy)]
pub struct Watchdog {
    idle: Duration,
}

impl Watchdog {
    /// 构造函数
    pub fn new(idle: Duration) -> Self {
        Self { idle }
    }

    /// 空闲超时
    #[inline]
    pub fn idle(&self) -> Duration {
        self.idle
    }

    /// 等待下一个事件，关闭信号优先于事件，事件优先于空闲超时
    ///
    /// 每次调用重新计时，空闲时长不跨调用累计。
    pub async fn watch<F>(&self, next: F, token: &mut ShutdownToken) -> Watch<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = token.cancelled() => Watch::Cancelled,
            out = next => Watch::Event(out),
            _ = sleep(self.idle) => Watch::Idle,
        }
    }
}
