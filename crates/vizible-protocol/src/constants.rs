//! 协议常量定义
//!
//! 数值沿用传感背心出厂配置；除路径常量外均可在上层配置中覆盖。

/// 默认障碍物距离阈值（厘米）
///
/// 距离严格小于该值的方向判定为障碍。
pub const DEFAULT_OBSTACLE_THRESHOLD_CM: u32 = 125;

/// 未终止行累积缓冲上限（字节）
///
/// 与设备端单次读块大小一致；超过上限的行整行丢弃。
pub const DEFAULT_MAX_RECORD_BYTES: usize = 1024;

/// 默认检测后端地址
pub const DEFAULT_BASE_URL: &str = "http://192.168.1.100:5000/";

/// 检测请求相对路径（GET `base_url` + `DETECTIONS_PATH`）
pub const DETECTIONS_PATH: &str = "detections";

/// 默认检测请求超时（毫秒）
pub const DEFAULT_ENRICHMENT_TIMEOUT_MS: u64 = 2000;
