//! # Vizible Link Layer
//!
//! 字节流链路抽象层，提供统一的有序字节源接口。
//!
//! 链路在交付给流水线之前已经建立（配对/发现属于宿主平台），
//! 本层只负责按块读出字节并区分「超时边界」与「致命故障」。

use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "serial")]
pub mod serial;

#[cfg(feature = "serial")]
pub use serial::SerialLink;

pub mod tcp;

pub use tcp::TcpLink;

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockHandle, MockLink};

/// 链路层统一错误类型
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] LinkDeviceError),
    #[error("Read timeout")]
    Timeout,
    #[error("Link closed by peer")]
    Closed,
}

impl LinkError {
    /// `Timeout` 是读循环的停机检查边界，其余变体都终止流水线
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LinkError::Timeout)
    }
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDeviceErrorKind {
    Unknown,
    NotFound,
    AccessDenied,
    Busy,
    UnsupportedConfig,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct LinkDeviceError {
    pub kind: LinkDeviceErrorKind,
    pub message: String,
}

impl LinkDeviceError {
    pub fn new(kind: LinkDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<String> for LinkDeviceError {
    fn from(message: String) -> Self {
        Self::new(LinkDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for LinkDeviceError {
    fn from(message: &str) -> Self {
        Self::new(LinkDeviceErrorKind::Unknown, message)
    }
}

/// 有序字节流源
///
/// # 读语义
///
/// - `Ok(n)`（n > 0）：读到 n 个字节
/// - `Err(LinkError::Timeout)`：本次读在超时边界内无数据，非致命，
///   读循环以此为停机检查点
/// - `Err(LinkError::Closed)`：对端有序关闭（流结束），致命
/// - 其余 `Err`：传输故障，致命
///
/// 实现不返回 `Ok(0)`——流结束一律映射为 `Err(Closed)`。
/// 核心不向链路写入任何内容。
pub trait Link: Send {
    /// 读出至多 `buf.len()` 个字节
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;

    /// 调整读超时（读循环据此控制停机检查频率）
    fn set_read_timeout(&mut self, _timeout: Duration) -> Result<(), LinkError> {
        Ok(())
    }

    /// 链路的人类可读描述（日志用）
    fn describe(&self) -> String {
        "link".to_string()
    }
}
