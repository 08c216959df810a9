//! 客户端错误类型

use thiserror::Error;
use vizible_pipeline::PipelineError;

/// 检测补充请求的错误
///
/// 全部非致命：补充失败只意味着这次警报停留在基础文案。
#[derive(Error, Debug)]
pub enum EnrichmentError {
    /// 网络层不可达（DNS、连接失败等）
    #[error("Detection service unreachable: {0}")]
    Unreachable(String),

    /// 服务端返回非成功状态码
    #[error("Detection service returned HTTP {0}")]
    Status(u16),

    /// 超过请求时限
    #[error("Detection request timed out")]
    Timeout,

    /// 响应不是预期的 JSON 信封或载荷格式
    #[error("Malformed detection payload: {0}")]
    Malformed(String),
}

/// 警报侧错误（播报与补充链路）
#[derive(Error, Debug)]
pub enum AlertError {
    /// 后台线程启动失败
    #[error("Worker thread error: {0}")]
    Worker(String),

    /// 补充请求失败
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),
}

/// 门面层错误
#[derive(Error, Debug)]
pub enum VizibleError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Alert(#[from] AlertError),
}
