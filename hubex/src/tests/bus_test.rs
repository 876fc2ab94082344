use super::*;
use crate::{
    Coordinator,
    bus::{Bus, Kind, Notice},
    config::ConsumeConfig,
    report::{LogReporter, TableSink},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

fn record(partition: &str, payload: &'static [u8]) -> EventRecord {
    EventRecord {
        partition: PartitionId::from(partition),
        payload: Bytes::from_static(payload),
        enqueued_at: Utc::now(),
    }
}

fn counter(bus: &Bus, kind: Kind) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&count);
    bus.register(kind, move |_: &Notice| {
        counted.fetch_add(1, Ordering::SeqCst);
    });
    count
}

#[rstest]
#[tokio::test]
async fn publish_dispatches_by_kind() {
    let bus = Bus::new();
    let records = counter(&bus, Kind::Record);
    let idles = counter(&bus, Kind::Idle);

    assert!(bus.publish(Notice::Record(record("0", b"a"))));
    assert!(bus.publish(Notice::Idle {
        partition: PartitionId::from("1"),
        idle: Duration::from_secs(30),
    }));
    assert!(!bus.publish(Notice::Failure {
        partition: PartitionId::from("1"),
        message: "无处理器".to_string(),
    }));

    assert_eq!(records.load(Ordering::SeqCst), 1);
    assert_eq!(idles.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn register_replaces_previous_handler() {
    let bus = Bus::new();
    let first = counter(&bus, Kind::Record);
    let second = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&second);

    let replaced = bus.register(Kind::Record, move |_: &Notice| {
        counted.fetch_add(1, Ordering::SeqCst);
    });
    bus.publish(Notice::Record(record("0", b"a")));

    assert!(replaced.is_some());
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn unregister_and_clear() {
    let bus = Bus::new();
    let records = counter(&bus, Kind::Record);
    counter(&bus, Kind::Idle);

    assert!(bus.unregister(Kind::Record));
    assert!(!bus.unregister(Kind::Record));
    assert!(!bus.publish(Notice::Record(record("0", b"a"))));

    bus.clear();
    assert!(!bus.publish(Notice::Idle {
        partition: PartitionId::from("0"),
        idle: Duration::from_secs(1),
    }));
    assert_eq!(records.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test]
async fn publish_async_runs_detached() {
    let bus = Bus::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    bus.register(Kind::Failure, move |notice: &Notice| {
        let _ = tx.send(notice.kind());
    });

    let dispatched = bus.publish_async(Notice::Failure {
        partition: PartitionId::from("2"),
        message: "连接断开".to_string(),
    });

    assert!(dispatched);
    assert_eq!(rx.recv().await, Some(Kind::Failure));
    assert!(!bus.publish_async(Notice::Record(record("0", b"a"))));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn bus_wires_coordinator_to_table() {
    LazyLock::force(&TEST_LOG);
    let stream = Arc::new(
        MockStream::new(&["0", "1"])
            .script("0", Script::events(&[b"hello"]))
            .script("1", Script::default().open_fails("拒绝连接")),
    );
    let bus = Arc::new(Bus::new());
    let table = Arc::new(TableSink::new(Vec::new()));
    let printer = Arc::clone(&table);
    bus.register(Kind::Record, move |notice: &Notice| {
        if let Notice::Record(record) = notice {
            printer.print(record);
        }
    });
    let failures = counter(&bus, Kind::Failure);
    let idles = counter(&bus, Kind::Idle);
    let config = ConsumeConfig {
        idle_timeout: 1,
        ..Default::default()
    };

    let outcomes = Coordinator::new(stream, Arc::clone(&bus), Arc::clone(&bus), config)
        .run("$Default", sleep(Duration::from_millis(1500)))
        .await
        .unwrap();
    bus.clear();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert_eq!(idles.load(Ordering::SeqCst), 1);
    let output = Arc::try_unwrap(table)
        .ok()
        .expect("总线清空后表格输出应无其他引用")
        .into_inner();
    let output = String::from_utf8(output).unwrap();
    assert_eq!(output.lines().count(), 1);
    assert!(output.starts_with("| 0            | hello"));
}

#[rstest]
fn log_reporter_handles_bus_notices() {
    LazyLock::force(&TEST_LOG);
    let bus = Bus::new();
    bus.register(Kind::Idle, |notice: &Notice| LogReporter.notice(notice));
    bus.register(Kind::Failure, |notice: &Notice| LogReporter.notice(notice));

    assert!(bus.publish(Notice::Idle {
        partition: PartitionId::from("0"),
        idle: Duration::from_secs(30),
    }));
    assert!(bus.publish(Notice::Failure {
        partition: PartitionId::from("1"),
        message: "连接断开".to_owned(),
    }));
    assert!(!bus.publish(Notice::Record(record("0", b"a"))));
}
