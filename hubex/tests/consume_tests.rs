use bytes::Bytes;
use chrono::{DateTime, Utc};
use hubex::{
    Coordinator, Outcome, PartitionId, RawEvent,
    config::{ConsumeConfig, StartPosition},
    domain::{Receiver, Stream},
    errors::HubError,
    report::{ChannelSink, LogReporter},
};
use std::{collections::HashMap, sync::Arc, sync::Mutex};
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Duration, sleep},
};

#[derive(Debug, Error)]
enum MemoryError {
    #[error("分区{0}不可用")]
    Unavailable(String),
    #[error("分区{0}已断开")]
    Disconnected(String),
}

/// 以内存通道模拟的分区事件流
struct MemoryStream {
    partitions: Vec<PartitionId>,
    channels: Mutex<HashMap<PartitionId, mpsc::UnboundedReceiver<RawEvent>>>,
}

impl MemoryStream {
    fn new(ids: &[&str]) -> (Self, HashMap<PartitionId, mpsc::UnboundedSender<RawEvent>>) {
        let mut senders = HashMap::new();
        let mut channels = HashMap::new();
        for id in ids {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.insert(PartitionId::from(*id), tx);
            channels.insert(PartitionId::from(*id), rx);
        }
        let stream = Self {
            partitions: ids.iter().map(|id| PartitionId::from(*id)).collect(),
            channels: Mutex::new(channels),
        };
        (stream, senders)
    }
}

struct MemoryReceiver {
    partition: PartitionId,
    rx: mpsc::UnboundedReceiver<RawEvent>,
}

impl Stream for MemoryStream {
    type Error = MemoryError;
    type Receiver = MemoryReceiver;

    async fn partitions(&self) -> Result<Vec<PartitionId>, MemoryError> {
        Ok(self.partitions.clone())
    }

    async fn open(
        &self,
        partition: &PartitionId,
        _consumer_group: &str,
        _start: StartPosition,
    ) -> Result<MemoryReceiver, MemoryError> {
        let rx = self
            .channels
            .lock()
            .unwrap()
            .remove(partition)
            .ok_or_else(|| MemoryError::Unavailable(partition.to_string()))?;
        Ok(MemoryReceiver {
            partition: partition.clone(),
            rx,
        })
    }
}

impl Receiver for MemoryReceiver {
    type Error = MemoryError;

    async fn recv(&mut self) -> Result<RawEvent, MemoryError> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| MemoryError::Disconnected(self.partition.to_string()))
    }

    async fn close(&mut self) -> Result<(), MemoryError> {
        self.rx.close();
        Ok(())
    }
}

fn event(partition: &str, payload: &'static str) -> RawEvent {
    RawEvent {
        partition: PartitionId::from(partition),
        payload: Some(Bytes::from_static(payload.as_bytes())),
        enqueued_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

fn config() -> ConsumeConfig {
    ConsumeConfig {
        idle_timeout: 1,
        start: StartPosition::End,
    }
}

#[tokio::test]
async fn events_reach_channel_until_cancelled() {
    let (stream, senders) = MemoryStream::new(&["0", "1"]);
    let (sink, mut records) = ChannelSink::channel();
    let coordinator = Coordinator::new(Arc::new(stream), Arc::new(sink), Arc::new(LogReporter), config());
    let (stop, cancel) = oneshot::channel::<()>();

    senders[&PartitionId::from("0")].send(event("0", "a")).unwrap();
    senders[&PartitionId::from("1")].send(event("1", "b")).unwrap();
    let run = tokio::spawn(async move {
        coordinator
            .run("$Default", async {
                let _ = cancel.await;
            })
            .await
    });

    let mut payloads = Vec::new();
    for _ in 0..2 {
        let record = records.recv().await.unwrap();
        payloads.push(String::from_utf8(record.payload.to_vec()).unwrap());
    }
    payloads.sort();
    stop.send(()).unwrap();
    let outcomes = run.await.unwrap().unwrap();

    assert_eq!(payloads, ["a", "b"]);
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.outcome.is_cancelled()));
}

#[tokio::test]
async fn disconnected_partition_fails_alone() {
    let (stream, mut senders) = MemoryStream::new(&["0", "1"]);
    let (sink, _records) = ChannelSink::channel();
    let coordinator = Coordinator::new(Arc::new(stream), Arc::new(sink), Arc::new(LogReporter), config());
    drop(senders.remove(&PartitionId::from("1")));

    let outcomes = coordinator
        .run("$Default", sleep(Duration::from_millis(200)))
        .await
        .unwrap();

    let failed: Vec<_> = outcomes
        .iter()
        .filter_map(|o| match &o.outcome {
            Outcome::Failed(HubError::Receive { partition, .. }) => Some(partition.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(failed, ["1"]);
    assert_eq!(outcomes.len(), 2);
}
