//! 读线程主循环
//!
//! 专用线程从链路读字节，按行切分、解析、评估障碍，再同步触发回调。
//! 单线程推进保证了顺序语义：第 N 条读数的全部回调先于第 N+1 条。

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use vizible_link::{Link, LinkError};
use vizible_protocol::{LineDecoder, SensorReading};

use crate::config::PipelineConfig;
use crate::evaluator::evaluate;
use crate::pipeline::PipelineContext;
use crate::state::LinkState;

/// 读循环入口
///
/// 在 `ctx.is_running` 置 false 或链路出现致命错误前不断读取。
/// 退出时负责把 `is_running` 清零并将状态置回 Disconnected，
/// 致命错误存入 `ctx.link_fault` 供属主线程取出。
pub fn rx_loop(mut link: Box<dyn Link>, ctx: Arc<PipelineContext>, config: PipelineConfig) {
    #[cfg(feature = "realtime")]
    promote_thread_priority();

    let mut decoder = LineDecoder::new(config.max_record_bytes);
    let mut buf = vec![0u8; config.read_chunk_bytes];

    // 读超时决定停止标志的检查周期
    if let Err(e) = link.set_read_timeout(Duration::from_millis(config.read_timeout_ms)) {
        warn!("Failed to apply read timeout: {}", e);
    }

    info!("RX loop started ({})", link.describe());
    ctx.state.set(LinkState::Streaming, Ordering::Release);

    while ctx.is_running.load(Ordering::Acquire) {
        match link.read(&mut buf) {
            Ok(n) => {
                ctx.metrics.bytes_read.fetch_add(n as u64, Ordering::Relaxed);
                process_chunk(&buf[..n], &mut decoder, &ctx, &config);
            }
            Err(LinkError::Timeout) => {
                // 空闲心跳：只用来周期性检查停止标志
                ctx.metrics.link_timeouts.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                error!("Link failure, terminating RX loop: {}", e);
                *ctx.link_fault.lock() = Some(e);
                break;
            }
        }
    }

    ctx.is_running.store(false, Ordering::Release);
    ctx.state.set(LinkState::Disconnected, Ordering::Release);
    info!("RX loop exited");
}

fn process_chunk(
    chunk: &[u8],
    decoder: &mut LineDecoder,
    ctx: &PipelineContext,
    config: &PipelineConfig,
) {
    for record in decoder.feed(chunk) {
        match record {
            Ok(record) => process_record(&record, ctx, config),
            Err(e) => {
                ctx.metrics
                    .records_oversized
                    .fetch_add(1, Ordering::Relaxed);
                warn!("{}", e);
            }
        }
    }
}

fn process_record(record: &str, ctx: &PipelineContext, config: &PipelineConfig) {
    ctx.metrics.records_framed.fetch_add(1, Ordering::Relaxed);

    let reading = match SensorReading::parse(record) {
        Ok(reading) => reading,
        Err(e) => {
            // 空行和片段记录都会落到这里，属于正常噪声
            ctx.metrics.parse_failures.fetch_add(1, Ordering::Relaxed);
            debug!("Dropping unparseable record: {}", e);
            return;
        }
    };

    ctx.metrics.readings_parsed.fetch_add(1, Ordering::Relaxed);
    ctx.latest_reading.store(Some(Arc::new(reading)));
    ctx.monitor.register_reading();

    let events = evaluate(&reading, config.threshold_cm);
    if !events.is_empty() {
        ctx.metrics
            .obstacle_events
            .fetch_add(events.len() as u64, Ordering::Relaxed);
    }

    // 先广播读数，再报障碍；两者都在读线程同步完成
    let hooks = ctx.hooks.read();
    hooks.trigger_reading(&reading);
    if !events.is_empty() {
        hooks.trigger_obstacles(&reading, &events);
    }
}

#[cfg(feature = "realtime")]
fn promote_thread_priority() {
    use thread_priority::{ThreadPriority, set_current_thread_priority};
    if let Err(e) = set_current_thread_priority(ThreadPriority::Max) {
        warn!("Failed to raise RX thread priority: {:?}", e);
    }
}
