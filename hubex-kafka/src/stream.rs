//! Kafka 分区事件流

use crate::{config::KafkaConfig, connection::Connection, errors::KafkaStreamError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use hubex::{
    PartitionId, RawEvent,
    config::StartPosition,
    domain::{Receiver, Stream},
};
use rdkafka::{
    ClientConfig, Message, Offset, Timestamp, TopicPartitionList,
    consumer::{BaseConsumer, Consumer, StreamConsumer},
};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, info, instrument};

/// Kafka 分区事件流
pub struct KafkaStream {
    topic: String,
    client: ClientConfig,
    metadata: Arc<BaseConsumer>,
    timeout: Duration,
}

impl KafkaStream {
    /// 创建事件流，仅建立元数据客户端，不访问服务端
    pub fn connect(
        connection: &Connection,
        topic: &str,
        cfg: &KafkaConfig,
    ) -> Result<Self, KafkaStreamError> {
        let client = connection.client_config(&cfg.cc);
        let metadata: BaseConsumer = client.create()?;
        info!("创建 {} 事件流客户端", connection.bootstrap());
        Ok(Self {
            topic: topic.to_owned(),
            client,
            metadata: Arc::new(metadata),
            timeout: cfg.timeout,
        })
    }

    /// 主题名称
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl Stream for KafkaStream {
    type Error = KafkaStreamError;
    type Receiver = KafkaReceiver;

    #[instrument(name = "discover_partitions", skip(self), fields(topic = %self.topic))]
    async fn partitions(&self) -> Result<Vec<PartitionId>, KafkaStreamError> {
        let metadata = Arc::clone(&self.metadata);
        let topic = self.topic.clone();
        let timeout = self.timeout;
        let ids = tokio::task::spawn_blocking(move || fetch_partitions(&metadata, &topic, timeout))
            .await??;
        debug!("主题分区：{ids:?}");
        Ok(ids
            .into_iter()
            .map(|id| PartitionId::from(id.to_string()))
            .collect())
    }

    async fn open(
        &self,
        partition: &PartitionId,
        consumer_group: &str,
        start: StartPosition,
    ) -> Result<KafkaReceiver, KafkaStreamError> {
        let pid = partition
            .as_str()
            .parse::<i32>()
            .map_err(|_| KafkaStreamError::Partition(partition.to_string()))?;

        let mut config = self.client.clone();
        config
            .set("group.id", consumer_group)
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "false");
        let consumer: StreamConsumer = config.create()?;

        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(&self.topic, pid, offset(start))?;
        consumer.assign(&tpl)?;
        debug!("消费者指派到{}主题{pid}分区", self.topic);

        Ok(KafkaReceiver {
            consumer,
            closed: false,
        })
    }
}

fn fetch_partitions(
    consumer: &BaseConsumer,
    topic: &str,
    timeout: Duration,
) -> Result<Vec<i32>, KafkaStreamError> {
    let metadata = consumer.fetch_metadata(Some(topic), timeout)?;
    let found = metadata
        .topics()
        .iter()
        .find(|t| t.name() == topic)
        .ok_or_else(|| KafkaStreamError::TopicNotFound(topic.to_owned()))?;
    if let Some(err) = found.error() {
        return Err(KafkaStreamError::Topic {
            topic: topic.to_owned(),
            code: format!("{err:?}"),
        });
    }
    Ok(found.partitions().iter().map(|p| p.id()).collect())
}

#[inline]
pub(crate) fn offset(start: StartPosition) -> Offset {
    match start {
        StartPosition::Beginning => Offset::Beginning,
        StartPosition::End => Offset::End,
        StartPosition::Offset(n) => Offset::Offset(n),
    }
}

#[inline]
pub(crate) fn enqueued_at(timestamp: Timestamp) -> DateTime<Utc> {
    timestamp
        .to_millis()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

/// Kafka 分区接收者
pub struct KafkaReceiver {
    consumer: StreamConsumer,
    closed: bool,
}

impl Receiver for KafkaReceiver {
    type Error = KafkaStreamError;

    async fn recv(&mut self) -> Result<RawEvent, KafkaStreamError> {
        let msg = self.consumer.recv().await?;
        Ok(RawEvent {
            partition: PartitionId::from(msg.partition().to_string()),
            payload: msg.payload().map(Bytes::copy_from_slice),
            enqueued_at: enqueued_at(msg.timestamp()),
        })
    }

    async fn close(&mut self) -> Result<(), KafkaStreamError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.consumer.unassign()?;
        Ok(())
    }
}
