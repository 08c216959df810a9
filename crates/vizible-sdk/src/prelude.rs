//! Prelude - 常用类型的便捷导入
//!
//! 大多数用户应该使用这个模块来导入常用类型：
//!
//! ```rust
//! use vizible_sdk::prelude::*;
//! ```

// 门面（推荐使用）
pub use crate::{Vizible, VizibleBuilder};

// 播报终端
pub use crate::{MemorySpeaker, Speaker, StdoutSpeaker};

// 流水线层（高级用户使用）
pub use crate::{LinkBackend, LinkState, Pipeline, PipelineBuilder, PipelineConfig};

// 链路抽象（常用 Trait）
pub use vizible_link::Link;

// 协议层
pub use crate::{Alert, DetectionSet, Direction, SensorReading};

// 错误类型
pub use crate::{AlertError, EnrichmentError, LinkError, PipelineError, ProtocolError, VizibleError};
