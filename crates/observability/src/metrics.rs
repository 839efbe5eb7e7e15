//! 分发指标记录模块
//!
//! 基于 metrics facade 记录分发过程中的计数器。
//! 未安装 recorder 时所有调用都是空操作。

use metrics::counter;

/// 记录一个已分发的数据块
pub fn record_chunk_dispatched(bytes: usize) {
    counter!("teeplex_chunks_dispatched_total").increment(1);
    counter!("teeplex_bytes_dispatched_total").increment(bytes as u64);
}

/// 记录 sink 打开结果
pub fn record_sink_opened(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("teeplex_sinks_opened_total", "status" => status).increment(1);
}

/// 记录单次 sink 写入
pub fn record_sink_write(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "teeplex_sink_writes_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// 记录 sink 被停用
pub fn record_sink_deactivated(sink_name: &str) {
    counter!(
        "teeplex_sinks_deactivated_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}
