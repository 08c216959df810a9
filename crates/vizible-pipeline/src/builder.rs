//! 流水线构建器

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use vizible_link::{Link, LinkError, TcpLink};

#[cfg(feature = "serial")]
use vizible_link::SerialLink;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::hooks::ReadingCallback;
use crate::pipeline::{Pipeline, PipelineContext};
use crate::state::LinkState;

/// 链路后端选择
pub enum LinkBackend {
    /// 串口（蓝牙 SPP 在宿主系统上也呈现为串口设备）
    #[cfg(feature = "serial")]
    Serial {
        /// 设备路径，如 `/dev/rfcomm0`、`COM5`
        path: String,
        /// 波特率，需与传感器单元的 SPP 模块一致
        baud_rate: u32,
    },
    /// TCP（联调 / 桥接用）
    Tcp {
        /// `host:port` 地址
        addr: String,
    },
    /// 调用方自备的链路实现
    Custom(Box<dyn Link>),
}

/// 流水线构建器
///
/// 与 [`Pipeline::start`] 的区别：构建期打开链路（对外呈现
/// Connecting 状态），且回调在读线程启动前注册完毕，保证第一条
/// 记录也能触达回调。
///
/// ```no_run
/// use vizible_pipeline::PipelineBuilder;
///
/// let pipeline = PipelineBuilder::new()
///     .serial("/dev/rfcomm0", 9600)
///     .threshold_cm(125)
///     .build()?;
/// # Ok::<(), vizible_pipeline::PipelineError>(())
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    backend: Option<LinkBackend>,
    config: PipelineConfig,
    callbacks: Vec<Arc<dyn ReadingCallback>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            backend: None,
            config: PipelineConfig::default(),
            callbacks: Vec::new(),
        }
    }

    /// 使用串口后端
    #[cfg(feature = "serial")]
    pub fn serial(mut self, path: impl Into<String>, baud_rate: u32) -> Self {
        self.backend = Some(LinkBackend::Serial {
            path: path.into(),
            baud_rate,
        });
        self
    }

    /// 使用 TCP 后端
    pub fn tcp(mut self, addr: impl Into<String>) -> Self {
        self.backend = Some(LinkBackend::Tcp { addr: addr.into() });
        self
    }

    /// 使用自备链路
    pub fn custom_link(mut self, link: Box<dyn Link>) -> Self {
        self.backend = Some(LinkBackend::Custom(link));
        self
    }

    /// 直接指定后端
    pub fn backend(mut self, backend: LinkBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// 整体替换配置
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 障碍判定阈值（厘米）
    pub fn threshold_cm(mut self, threshold_cm: u32) -> Self {
        self.config.threshold_cm = threshold_cm;
        self
    }

    /// 链路读超时（毫秒）
    pub fn read_timeout_ms(mut self, read_timeout_ms: u64) -> Self {
        self.config.read_timeout_ms = read_timeout_ms;
        self
    }

    /// 单条记录最大字节数
    pub fn max_record_bytes(mut self, max_record_bytes: usize) -> Self {
        self.config.max_record_bytes = max_record_bytes;
        self
    }

    /// 注册读数回调（先于读线程启动）
    pub fn callback(mut self, callback: Arc<dyn ReadingCallback>) -> Self {
        self.callbacks.push(callback);
        self
    }

    /// 打开链路并启动流水线
    pub fn build(self) -> Result<Pipeline, PipelineError> {
        self.config.validate()?;
        let backend = self.backend.ok_or_else(|| {
            PipelineError::InvalidInput("no link backend configured".to_string())
        })?;

        let ctx = Arc::new(PipelineContext::new());
        ctx.state.set(LinkState::Connecting, Ordering::Release);

        let read_timeout = Duration::from_millis(self.config.read_timeout_ms);
        let link = match open_backend(backend, read_timeout) {
            Ok(link) => link,
            Err(e) => {
                ctx.state.set(LinkState::Disconnected, Ordering::Release);
                return Err(e.into());
            }
        };

        Pipeline::start_with(ctx, link, self.config, self.callbacks)
    }
}

fn open_backend(backend: LinkBackend, read_timeout: Duration) -> Result<Box<dyn Link>, LinkError> {
    match backend {
        #[cfg(feature = "serial")]
        LinkBackend::Serial { path, baud_rate } => {
            Ok(Box::new(SerialLink::open(&path, baud_rate, read_timeout)?))
        }
        LinkBackend::Tcp { addr } => Ok(Box::new(TcpLink::connect(&addr, read_timeout)?)),
        LinkBackend::Custom(link) => Ok(link),
    }
}
