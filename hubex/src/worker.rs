//! # **hubex** 分区任务

use crate::{
    PartitionId,
    config::StartPosition,
    coordinator::Outcome,
    domain::{Receiver, Reporter, Sink, Stream},
    errors::HubError,
    shutdown::ShutdownToken,
    watchdog::{Watch, Watchdog},
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub(crate) struct Worker<S, K, R>
where
    S: Stream,
    K: Sink,
    R: Reporter,
{
    pub partition: PartitionId,
    pub stream: Arc<S>,
    pub group: Arc<str>,
    pub start: StartPosition,
    pub watchdog: Watchdog,
    pub token: ShutdownToken,
    pub sink: Arc<K>,
    pub reporter: Arc<R>,
}

impl<S, K, R> Worker<S, K, R>
where
    S: Stream,
    K: Sink,
    R: Reporter,
{
    #[instrument(name = "partition_worker", skip_all, fields(partition = %self.partition))]
    pub(crate) async fn run(mut self) -> Outcome<S::Error> {
        let opened = tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                info!("打开接收者前收到关闭信号");
                return Outcome::Cancelled;
            }
            opened = self.stream.open(&self.partition, &self.group, self.start) => opened,
        };
        let mut receiver = match opened {
            Ok(receiver) => receiver,
            Err(source) => {
                return self.fail(HubError::Open {
                    partition: self.partition.clone(),
                    source,
                });
            }
        };
        info!("成功打开分区接收者，起始位置：{}", self.start);

        let outcome = self.drive(&mut receiver).await;

        if let Err(source) = receiver.close().await {
            let err = HubError::Close {
                partition: self.partition.clone(),
                source,
            };
            warn!("{err}");
            self.reporter.error(&self.partition, &err);
        } else {
            debug!("分区接收者已关闭");
        }
        outcome
    }

    async fn drive(&mut self, receiver: &mut S::Receiver) -> Outcome<S::Error> {
        loop {
            match self.watchdog.watch(receiver.recv(), &mut self.token).await {
                Watch::Cancelled => {
                    info!("收到关闭信号，开始优雅退出");
                    break Outcome::Cancelled;
                }
                Watch::Event(Ok(raw)) => match raw.into_record() {
                    Some(record) => {
                        debug!("转发{}字节事件", record.payload.len());
                        self.sink.emit(record);
                    }
                    None => debug!("跳过空消息体事件"),
                },
                Watch::Event(Err(source)) => {
                    break self.fail(HubError::Receive {
                        partition: self.partition.clone(),
                        source,
                    });
                }
                Watch::Idle => {
                    debug!("分区空闲超过{:?}", self.watchdog.idle());
                    self.reporter.idle(&self.partition, self.watchdog.idle());
                }
            }
        }
    }

    fn fail(&self, err: HubError<S::Error>) -> Outcome<S::Error> {
        error!("{err}");
        self.reporter.error(&self.partition, &err);
        Outcome::Failed(err)
    }
}
