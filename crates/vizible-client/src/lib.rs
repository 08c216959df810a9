//! # vizible-client
//!
//! 警报侧组件：播报串行化、检测补充、警报分发，以及把这些和
//! 流水线接成一体的 [`Vizible`] 门面。
//!
//! ## 分层
//!
//! - [`SerializedSpeaker`]: 单写者播报队列，包装任意 [`Speaker`]
//! - [`EnrichmentClient`]: 远端检测服务的 HTTP 客户端
//! - [`AlertDispatcher`]: 基础警报同步入队 + 补充任务纪元化派发
//! - [`Vizible`] / [`VizibleBuilder`]: 一次调用接好全部管线
//!
//! ## 警报时序
//!
//! 同一批障碍事件：基础警报先于任何网络动作入队；升级警报只在
//! 补充结果仍属最新纪元时出现，迟到结果一律丢弃。

pub mod dispatcher;
pub mod enrichment;
pub mod error;
pub mod speaker;
pub mod vizible;

mod util;

pub use dispatcher::{AlertDispatcher, DispatcherConfig, DispatcherStats};
pub use enrichment::{DetectionSource, EnrichmentClient, EnrichmentConfig};
pub use error::{AlertError, EnrichmentError, VizibleError};
pub use speaker::{
    DEFAULT_SPEECH_QUEUE_CAPACITY, MemorySpeaker, SerializedSpeaker, Speaker, StdoutSpeaker,
};
pub use vizible::{Vizible, VizibleBuilder};
