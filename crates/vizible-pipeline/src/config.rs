//! 流水线配置

use vizible_protocol::constants::{DEFAULT_MAX_RECORD_BYTES, DEFAULT_OBSTACLE_THRESHOLD_CM};

use crate::broadcast::DEFAULT_SUBSCRIBER_CAPACITY;
use crate::error::PipelineError;

/// 流水线配置
///
/// 所有字段都有可用的默认值，一般只需要改 `threshold_cm`：
///
/// ```
/// use vizible_pipeline::PipelineConfig;
///
/// let config = PipelineConfig {
///     threshold_cm: 90,
///     ..Default::default()
/// };
/// assert_eq!(config.read_timeout_ms, 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// 障碍判定阈值（厘米，严格小于才触发）
    pub threshold_cm: u32,
    /// 单条记录最大字节数，超长整条丢弃
    pub max_record_bytes: usize,
    /// 单次链路读的缓冲区大小（字节）
    pub read_chunk_bytes: usize,
    /// 链路读超时（毫秒）。也是停止请求的最大响应延迟
    pub read_timeout_ms: u64,
    /// 每个订阅者的读数通道容量
    pub subscriber_capacity: usize,
    /// stop() 等待读线程退出的上限（毫秒）
    pub join_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold_cm: DEFAULT_OBSTACLE_THRESHOLD_CM,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            read_chunk_bytes: 1024,
            read_timeout_ms: 50,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
            join_timeout_ms: 2000,
        }
    }
}

impl PipelineConfig {
    /// 校验配置是否自洽
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_record_bytes == 0 {
            return Err(PipelineError::InvalidInput(
                "max_record_bytes must be greater than 0".into(),
            ));
        }
        if self.read_chunk_bytes == 0 {
            return Err(PipelineError::InvalidInput(
                "read_chunk_bytes must be greater than 0".into(),
            ));
        }
        if self.read_timeout_ms == 0 {
            return Err(PipelineError::InvalidInput(
                "read_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.subscriber_capacity == 0 {
            return Err(PipelineError::InvalidInput(
                "subscriber_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
