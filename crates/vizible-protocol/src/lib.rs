//! # Vizible Protocol
//!
//! 传感器串口行协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `constants`: 协议常量定义（阈值、缓冲上限、后端地址）
//! - `framing`: 字节流 → 行记录切分
//! - `reading`: 距离读数记录解析
//! - `detections`: 检测结果载荷解析/编码
//! - `alert`: 播报文本渲染
//!
//! ## 字节精确性
//!
//! 行切分全部以原始字节为单位（`bytes::BytesMut` 切片），
//! 不做任何字符索引运算；记录在切分后才按 UTF-8 宽松解码，
//! 非 ASCII 噪声交由模板匹配自然拒绝。

pub mod alert;
pub mod constants;
pub mod detections;
pub mod framing;
pub mod reading;

mod scan;

// 重新导出常用类型
pub use alert::Alert;
pub use constants::*;
pub use detections::DetectionSet;
pub use framing::LineDecoder;
pub use reading::{Direction, SensorReading};

use thiserror::Error;

/// 协议解析错误类型
///
/// 所有变体对流来说都是非致命的：调用方丢弃当前记录（或缓冲）后继续。
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// 单行内容超过未终止缓冲上限，整行被丢弃
    #[error("Oversized record dropped ({dropped} bytes)")]
    Oversized { dropped: usize },

    /// 记录不符合距离读数模板
    #[error("Record does not match sensor template: {0:?}")]
    MalformedReading(String),

    /// 距离数字超出取值范围
    #[error("Distance value for {field} out of range: {digits:?}")]
    DistanceOverflow { field: &'static str, digits: String },

    /// 检测载荷不符合三组模板
    #[error("Detection payload does not match template: {0:?}")]
    MalformedDetections(String),
}
