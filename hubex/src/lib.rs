//! # **hubex** 分区事件流消费核心
//!
//! 发现分区后为每个分区启用独立的接收任务，按空闲超时报告静默分区，
//! 并以共享的关闭信号协调所有分区任务优雅退出。

#![warn(missing_docs)]

mod record;
pub(crate) mod worker;

pub mod bus;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod errors;
pub mod report;
pub mod shutdown;
pub mod watchdog;

pub use coordinator::{Coordinator, Outcome, PartitionOutcome};
pub use record::{EventRecord, PartitionId, RawEvent};
pub use shutdown::shutdown_signal;
