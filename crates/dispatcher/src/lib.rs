//! # Dispatcher
//!
//! 数据分发模块。
//!
//! 负责：
//! - 从 `InputStream` 读取数据块
//! - Fan-out 到多个文件 sink，按插入顺序写入
//! - 隔离失败的 sink，不阻塞其余输出与输入消费
//! - 可选地直通到标准输出
//! - 响应中断信号，统一由主循环执行 flush/close

pub mod dispatcher;
pub mod metrics;
pub mod passthrough;
pub mod shutdown;
pub mod sink_set;
pub mod sinks;

pub use contracts::{Chunk, ContractError, DataSink};
pub use dispatcher::{Dispatcher, DispatcherBuilder, DispatcherState, RunOutcome, RunReport};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use passthrough::Passthrough;
pub use shutdown::ShutdownController;
pub use sink_set::{is_glob_pattern, DispatchOutcome, SinkReport, SinkSet};
pub use sinks::FileSink;
pub use tokio_util::sync::CancellationToken;
