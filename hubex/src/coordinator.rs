//! # **hubex** 消费协调者

use crate::{
    PartitionId,
    config::ConsumeConfig,
    domain::{Reporter, Sink, Stream},
    errors::HubError,
    shutdown::Shutdown,
    watchdog::Watchdog,
    worker::Worker,
};
use ahash::{AHashMap, AHashSet};
use std::{future::Future, sync::Arc};
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

/// 分区终止结果
#[derive(Debug)]
pub enum Outcome<E>
where
    E: std::error::Error + 'static,
{
    /// 响应关闭信号退出
    Cancelled,
    /// 分区失败
    Failed(HubError<E>),
}

impl<E> Outcome<E>
where
    E: std::error::Error + 'static,
{
    /// 是否响应关闭信号退出
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }
}

/// 单个分区的终止结果
#[derive(Debug)]
pub struct PartitionOutcome<E>
where
    E: std::error::Error + 'static,
{
    /// 分区 Id
    pub partition: PartitionId,
    /// 终止结果
    pub outcome: Outcome<E>,
}

/// 消费协调者
pub struct Coordinator<S, K, R>
where
    S: Stream,
    K: Sink,
    R: Reporter,
{
    stream: Arc<S>,
    sink: Arc<K>,
    reporter: Arc<R>,
    config: ConsumeConfig,
}

impl<S, K, R> Coordinator<S, K, R>
where
    S: Stream,
    K: Sink,
    R: Reporter,
{
    /// 构造函数
    pub fn new(stream: Arc<S>, sink: Arc<K>, reporter: Arc<R>, config: ConsumeConfig) -> Self {
        Self {
            stream,
            sink,
            reporter,
            config,
        }
    }

    /// 消费所有分区，直至每个分区均终止
    ///
    /// `cancel` 完成时触发关闭信号，随后无限期等待所有分区退出。
    /// 分区发现失败时不启动任何分区任务。
    #[instrument(name = "consume", skip_all, fields(group = consumer_group))]
    pub async fn run<F>(
        &self,
        consumer_group: &str,
        cancel: F,
    ) -> Result<Vec<PartitionOutcome<S::Error>>, HubError<S::Error>>
    where
        F: Future<Output = ()>,
    {
        let discovered = self.stream.partitions().await.map_err(|e| {
            error!("获取分区失败：{e}");
            HubError::Discovery(e)
        })?;
        let partitions = distinct(discovered);
        info!("发现{}个分区", partitions.len());

        let shutdown = Shutdown::new();
        let group: Arc<str> = Arc::from(consumer_group);
        let watchdog = Watchdog::new(self.config.idle());
        let mut tasks = JoinSet::new();
        let mut spawned = AHashMap::with_capacity(partitions.len());

        for partition in partitions {
            let worker = Worker {
                partition: partition.clone(),
                stream: Arc::clone(&self.stream),
                group: Arc::clone(&group),
                start: self.config.start,
                watchdog,
                token: shutdown.token(),
                sink: Arc::clone(&self.sink),
                reporter: Arc::clone(&self.reporter),
            };
            let handle = tasks.spawn(worker.run());
            spawned.insert(handle.id(), partition);
        }

        let mut outcomes = Vec::with_capacity(spawned.len());
        let mut cancelling = false;
        tokio::pin!(cancel);

        loop {
            tokio::select! {
                biased;
                _ = &mut cancel, if !cancelling => {
                    cancelling = true;
                    info!("开始优雅退出所有分区");
                    shutdown.trigger();
                }
                joined = tasks.join_next_with_id() => match joined {
                    Some(Ok((id, outcome))) => {
                        let Some(partition) = spawned.remove(&id) else {
                            continue;
                        };
                        report(&partition, &outcome);
                        outcomes.push(PartitionOutcome { partition, outcome });
                    }
                    Some(Err(e)) => {
                        let Some(partition) = spawned.remove(&e.id()) else {
                            continue;
                        };
                        let err = HubError::Aborted {
                            partition: partition.clone(),
                            reason: e.to_string(),
                        };
                        error!("{err}");
                        self.reporter.error(&partition, &err);
                        outcomes.push(PartitionOutcome {
                            partition,
                            outcome: Outcome::Failed(err),
                        });
                    }
                    None => break,
                }
            }
        }

        info!("所有分区均已终止");
        Ok(outcomes)
    }
}

fn distinct(partitions: Vec<PartitionId>) -> Vec<PartitionId> {
    let mut seen = AHashSet::with_capacity(partitions.len());
    partitions
        .into_iter()
        .filter(|partition| {
            let fresh = seen.insert(partition.clone());
            if !fresh {
                warn!("忽略重复分区{partition}");
            }
            fresh
        })
        .collect()
}

fn report<E>(partition: &PartitionId, outcome: &Outcome<E>)
where
    E: std::error::Error + 'static,
{
    match outcome {
        Outcome::Cancelled => info!("分区{partition}已优雅退出"),
        Outcome::Failed(err) => warn!("分区{partition}失败终止：{err}"),
    }
}
