//! 流水线错误类型

use thiserror::Error;
use vizible_link::LinkError;

/// 流水线错误
#[derive(Error, Debug)]
pub enum PipelineError {
    /// 链路错误（打开失败或读取故障）
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// 读线程启动失败或异常退出
    #[error("Read thread error: {0}")]
    ReadThread(String),

    /// 等待读线程退出超时
    #[error("Timed out waiting for the read thread to stop")]
    JoinTimeout,

    /// 配置或参数非法
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
