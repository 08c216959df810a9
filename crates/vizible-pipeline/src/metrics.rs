//! 流水线运行计数
//!
//! 全部为 Relaxed 原子计数：读线程写，诊断线程读，
//! 不要求各字段之间瞬时一致。

use std::sync::atomic::{AtomicU64, Ordering};

/// 流水线计数器（读线程内累加）
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// 从链路读到的总字节数
    pub bytes_read: AtomicU64,
    /// 切分出的记录条数（含空行与无法解析的记录）
    pub records_framed: AtomicU64,
    /// 超长被丢弃的记录条数
    pub records_oversized: AtomicU64,
    /// 解析成功的读数条数
    pub readings_parsed: AtomicU64,
    /// 不符合模板被丢弃的记录条数
    pub parse_failures: AtomicU64,
    /// 产生的障碍事件总数
    pub obstacle_events: AtomicU64,
    /// 链路读超时次数（空闲心跳，非故障）
    pub link_timeouts: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取当前快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            records_framed: self.records_framed.load(Ordering::Relaxed),
            records_oversized: self.records_oversized.load(Ordering::Relaxed),
            readings_parsed: self.readings_parsed.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            obstacle_events: self.obstacle_events.load(Ordering::Relaxed),
            link_timeouts: self.link_timeouts.load(Ordering::Relaxed),
        }
    }
}

/// 计数器快照（普通整数，可随意拷贝/比较）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub bytes_read: u64,
    pub records_framed: u64,
    pub records_oversized: u64,
    pub readings_parsed: u64,
    pub parse_failures: u64,
    pub obstacle_events: u64,
    pub link_timeouts: u64,
}
