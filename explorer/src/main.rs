//! 分区事件流浏览工具
//!
//! 并发读取事件中心全部分区，按表格输出事件，Ctrl-C 或 SIGTERM 退出。
//! 配置目录可由 `HUBEX_CONFIG_ROOT` 指定。

use clap::Parser;
use hubex::{
    Coordinator, Outcome, PartitionId,
    bus::{Bus, Kind, Notice},
    config::StartPosition,
    report::{LogReporter, TableSink},
    shutdown_signal,
};
use hubex_kafka::{Connection, KafkaConfig, KafkaStream};
use std::{path::PathBuf, process::ExitCode, sync::Arc};
use tracing::{Level, error, info, warn};
use tracing_appender::non_blocking;
use tracing_subscriber::fmt;

#[derive(Parser)]
#[command(
    name = "explorer",
    version,
    about = "读取事件中心全部分区并按表格输出事件",
    after_help = "配置目录依次取 HUBEX_CONFIG_ROOT、当前目录下的 config、构建时的 crate 目录下的 config"
)]
struct Cli {
    /// Event Hubs 连接字符串，或 Kafka 引导服务器列表
    connection: String,
    /// 事件中心名称
    hub: String,
    /// 消费者组
    #[arg(default_value = "$Default")]
    group: String,
    /// 空闲报告间隔（秒）
    #[arg(long)]
    idle_timeout: Option<u64>,
    /// 起始位置：beginning、end 或偏移量
    #[arg(long)]
    start: Option<StartPosition>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (non_blocking, _guard) = non_blocking(std::io::stderr());
    fmt()
        .with_writer(non_blocking)
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    match explore(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn explore(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut cfg = KafkaConfig::load(crate_dir())?;
    if let Some(secs) = cli.idle_timeout {
        cfg.consume.idle_timeout = secs;
    }
    if let Some(start) = cli.start {
        cfg.consume.start = start;
    }
    cfg.consume.check("consume")?;

    let connection: Connection = cli.connection.parse()?;
    let hub = cli.hub;
    if let Some(entity) = connection.entity().filter(|e| *e != hub) {
        warn!("连接字符串指向{entity}，实际读取{hub}");
    }
    let stream = KafkaStream::connect(&connection, &hub, &cfg)?;
    info!(
        "读取{}，消费者组{}，起始位置{}，空闲间隔{}秒，SASL认证：{}",
        stream.topic(),
        cli.group,
        cfg.consume.start,
        cfg.consume.idle_timeout,
        connection.is_authenticated()
    );

    let bus = Arc::new(Bus::new());
    let table = TableSink::stdout();
    bus.register(Kind::Record, move |notice: &Notice| {
        if let Notice::Record(record) = notice {
            table.print(record);
        }
    });
    bus.register(Kind::Idle, |notice: &Notice| LogReporter.notice(notice));
    bus.register(Kind::Failure, |notice: &Notice| LogReporter.notice(notice));

    let coordinator = Coordinator::new(Arc::new(stream), bus.clone(), bus.clone(), cfg.consume);
    let outcomes = coordinator.run(&cli.group, shutdown_signal()).await?;
    bus.clear();

    let failed: Vec<_> = outcomes
        .iter()
        .filter_map(|o| match &o.outcome {
            Outcome::Failed(e) => e.partition().map(PartitionId::as_str),
            Outcome::Cancelled => None,
        })
        .collect();
    info!("{}个分区结束，其中{}个失败", outcomes.len(), failed.len());
    if !failed.is_empty() {
        warn!("失败分区：{failed:?}");
    }
    Ok(failed.is_empty())
}

/// 当前目录含 `config` 时以其为准，否则回退到构建时的 crate 目录
fn crate_dir() -> PathBuf {
    std::env::current_dir()
        .ok()
        .filter(|dir| dir.join("config").is_dir())
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}
