//! Vizible SDK - 障碍预警传感装置 Rust SDK
//!
//! 面向视障辅助装置的传感流 SDK：从蓝牙 SPP / 串口读取三向超声
//! 距离流，解析、评估障碍并播报警报，远端检测服务可把警报升级为
//! 带物体标签的文案。
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 行切分、读数解析、检测载荷、警报文案
//! - **链路层** (`link`): 字节流抽象，串口 / TCP / 脚本化后端
//! - **流水线层** (`pipeline`): 读线程、障碍评估、回调与订阅
//! - **客户端层** (`client`): 播报串行化、检测补充、警报分发、门面
//!
//! # 快速开始
//!
//! 大多数用户应该使用门面入口：
//!
//! ```no_run
//! use vizible_sdk::prelude::*;
//!
//! vizible_sdk::init_tracing();
//!
//! let mut vizible = VizibleBuilder::new()
//!     .serial("/dev/rfcomm0", 115200)
//!     .build()?;
//!
//! let readings = vizible.subscribe();
//! while let Ok(reading) = readings.recv() {
//!     println!("front={} left={} right={}", reading.front, reading.left, reading.right);
//! }
//! vizible.stop()?;
//! # Ok::<(), vizible_sdk::VizibleError>(())
//! ```
//!
//! 需要细粒度控制的用户可以直接使用流水线层：
//!
//! ```rust
//! use vizible_sdk::pipeline::{PipelineBuilder, PipelineConfig};
//! ```

// 分层 crates 的模块化再导出
pub use vizible_client as client;
pub use vizible_link as link;
pub use vizible_pipeline as pipeline;
pub use vizible_protocol as protocol;

// Prelude 模块
pub mod prelude;

// --- 用户以此为界 ---
// 以下是常用类型的顶层再导出

// 门面（推荐入口）
pub use vizible_client::{Vizible, VizibleBuilder};

// 播报
pub use vizible_client::{MemorySpeaker, SerializedSpeaker, Speaker, StdoutSpeaker};

// 检测补充
pub use vizible_client::{DetectionSource, EnrichmentClient, EnrichmentConfig};

// 流水线层（高级用户使用）
pub use vizible_pipeline::{
    LinkBackend, LinkState, MetricsSnapshot, Pipeline, PipelineBuilder, PipelineConfig,
    ReadingCallback,
};

// 协议层常用类型
pub use vizible_protocol::{Alert, DetectionSet, Direction, SensorReading};

// 错误类型
pub use vizible_client::{AlertError, EnrichmentError, VizibleError};
pub use vizible_link::LinkError;
pub use vizible_pipeline::PipelineError;
pub use vizible_protocol::ProtocolError;

/// 初始化日志输出
///
/// 桥接 log 门面并安装带 `RUST_LOG` 环境过滤的 fmt 订阅器，
/// 未设置时默认 `info`。重复调用安全（后续调用不生效）。
pub fn init_tracing() {
    let _ = tracing_log::LogTracer::builder()
        .with_max_level(log::LevelFilter::Debug)
        .init();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
