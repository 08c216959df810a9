//! # vizible-pipeline
//!
//! 传感器流读取流水线：专用读线程从链路取字节，按行切分、
//! 解析读数、评估障碍，再同步触发回调。
//!
//! ## 核心类型
//!
//! - [`Pipeline`]: 流水线属主，负责读线程的启动 / 停止
//! - [`PipelineBuilder`]: 打开链路并在首条记录前注册回调
//! - [`ReadingCallback`]: 读数 / 障碍事件回调接口
//! - [`ReadingBroadcast`]: 非阻塞订阅钩子
//! - [`evaluate`]: 纯函数障碍评估
//!
//! ## 线程模型
//!
//! 读线程名为 `vizible-rx`，一次只存在一个。回调在读线程上同步
//! 执行，第 N 条读数的全部回调先于第 N+1 条的任何回调。
//!
//! ## Features
//!
//! - `serial`（默认）: 串口链路后端
//! - `mock`: 透出 vizible-link 的脚本化链路，供下游测试
//! - `realtime`: 尝试提升读线程优先级

mod builder;
mod error;
mod pipeline;

pub mod broadcast;
pub mod config;
pub mod evaluator;
pub mod hooks;
pub mod metrics;
pub mod monitor;
pub mod rx;
pub mod state;

pub use builder::{LinkBackend, PipelineBuilder};
pub use broadcast::ReadingBroadcast;
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use evaluator::{ObstacleEvent, evaluate};
pub use hooks::{HookManager, ReadingCallback};
pub use metrics::{MetricsSnapshot, PipelineMetrics};
pub use monitor::ConnectionMonitor;
pub use pipeline::{Pipeline, PipelineContext};
pub use rx::rx_loop;
pub use state::{AtomicLinkState, LinkState};

// 下游 crate 统一从这里拿链路类型
pub use vizible_link as link;
pub use vizible_protocol as protocol;
