//! 连接门面
//!
//! 一次调用完成全部接线：打开链路、包装播报终端、构建检测
//! 客户端与分发器、注册回调并启动读线程。适合想直接"连上就
//! 出声"的调用方；需要细粒度控制时直接使用底层类型。

use std::sync::Arc;

use crossbeam_channel::Receiver;
use tracing::info;
use vizible_link::{Link, LinkError};
use vizible_pipeline::{
    LinkBackend, LinkState, MetricsSnapshot, Pipeline, PipelineBuilder, PipelineConfig,
    PipelineError,
};
use vizible_protocol::SensorReading;

use crate::dispatcher::{AlertDispatcher, DispatcherConfig, DispatcherStats};
use crate::enrichment::{DetectionSource, EnrichmentClient, EnrichmentConfig};
use crate::error::VizibleError;
use crate::speaker::{
    DEFAULT_SPEECH_QUEUE_CAPACITY, SerializedSpeaker, Speaker, StdoutSpeaker,
};

/// 门面构建器
///
/// ```no_run
/// use vizible_client::VizibleBuilder;
///
/// let mut vizible = VizibleBuilder::new()
///     .serial("/dev/rfcomm0", 115200)
///     .server_url("http://192.168.1.100:5000/")
///     .threshold_cm(125)
///     .build()?;
///
/// let readings = vizible.subscribe();
/// // ……
/// vizible.stop()?;
/// # Ok::<(), vizible_client::VizibleError>(())
/// ```
pub struct VizibleBuilder {
    backend: Option<LinkBackend>,
    pipeline_config: PipelineConfig,
    enrichment_config: EnrichmentConfig,
    dispatcher_config: DispatcherConfig,
    speaker_sink: Option<Arc<dyn Speaker>>,
    speech_queue_capacity: usize,
    detection_source: Option<Box<dyn DetectionSource>>,
}

impl Default for VizibleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VizibleBuilder {
    pub fn new() -> Self {
        Self {
            backend: None,
            pipeline_config: PipelineConfig::default(),
            enrichment_config: EnrichmentConfig::default(),
            dispatcher_config: DispatcherConfig::default(),
            speaker_sink: None,
            speech_queue_capacity: DEFAULT_SPEECH_QUEUE_CAPACITY,
            detection_source: None,
        }
    }

    /// 串口链路
    #[cfg(feature = "serial")]
    pub fn serial(mut self, path: impl Into<String>, baud_rate: u32) -> Self {
        self.backend = Some(LinkBackend::Serial {
            path: path.into(),
            baud_rate,
        });
        self
    }

    /// TCP 链路
    pub fn tcp(mut self, addr: impl Into<String>) -> Self {
        self.backend = Some(LinkBackend::Tcp { addr: addr.into() });
        self
    }

    /// 自备链路
    pub fn custom_link(mut self, link: Box<dyn Link>) -> Self {
        self.backend = Some(LinkBackend::Custom(link));
        self
    }

    /// 整体替换流水线配置
    pub fn pipeline_config(mut self, config: PipelineConfig) -> Self {
        self.pipeline_config = config;
        self
    }

    /// 障碍判定阈值（厘米）
    pub fn threshold_cm(mut self, threshold_cm: u32) -> Self {
        self.pipeline_config.threshold_cm = threshold_cm;
        self
    }

    /// 检测服务基地址
    pub fn server_url(mut self, base_url: impl Into<String>) -> Self {
        self.enrichment_config.base_url = base_url.into();
        self
    }

    /// 检测请求时限（毫秒）
    pub fn enrichment_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.enrichment_config.timeout_ms = timeout_ms;
        self
    }

    /// 单任务请求次数上限
    pub fn fetch_attempts(mut self, fetch_attempts: u32) -> Self {
        self.dispatcher_config.fetch_attempts = fetch_attempts;
        self
    }

    /// 播报终端（默认 [`StdoutSpeaker`]）
    pub fn speaker(mut self, sink: Arc<dyn Speaker>) -> Self {
        self.speaker_sink = Some(sink);
        self
    }

    /// 播报队列容量
    pub fn speech_queue_capacity(mut self, capacity: usize) -> Self {
        self.speech_queue_capacity = capacity;
        self
    }

    /// 替换检测数据源（默认按配置构建 [`EnrichmentClient`]）
    pub fn detection_source(mut self, source: Box<dyn DetectionSource>) -> Self {
        self.detection_source = Some(source);
        self
    }

    /// 打开链路并启动整套管线
    pub fn build(self) -> Result<Vizible, VizibleError> {
        let backend = self.backend.ok_or_else(|| {
            PipelineError::InvalidInput("no link backend configured".to_string())
        })?;

        let sink = self
            .speaker_sink
            .unwrap_or_else(|| Arc::new(StdoutSpeaker));
        let speaker = SerializedSpeaker::with_capacity(sink, self.speech_queue_capacity)?;

        let source = self
            .detection_source
            .unwrap_or_else(|| Box::new(EnrichmentClient::new(&self.enrichment_config)));

        let dispatcher = Arc::new(AlertDispatcher::new(
            speaker,
            source,
            self.dispatcher_config,
        )?);

        let pipeline = PipelineBuilder::new()
            .backend(backend)
            .config(self.pipeline_config)
            .callback(dispatcher.clone())
            .build()
            .map_err(VizibleError::Pipeline)?;

        info!("Vizible session started");
        Ok(Vizible {
            pipeline,
            dispatcher,
        })
    }
}

/// 已启动的完整会话
///
/// 字段声明顺序即析构顺序：先停流水线（释放回调里的分发器
/// 引用），再停分发器，最后播报队列排空退出。
pub struct Vizible {
    pipeline: Pipeline,
    dispatcher: Arc<AlertDispatcher>,
}

impl Vizible {
    pub fn builder() -> VizibleBuilder {
        VizibleBuilder::new()
    }

    /// 订阅读数流
    pub fn subscribe(&self) -> Receiver<SensorReading> {
        self.pipeline.subscribe()
    }

    /// 最近一条解析成功的读数
    #[must_use]
    pub fn latest_reading(&self) -> Option<SensorReading> {
        self.pipeline.latest_reading()
    }

    /// 连接状态
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.pipeline.state()
    }

    /// 流水线计数快照
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.pipeline.metrics()
    }

    /// 分发计数快照
    #[must_use]
    pub fn dispatcher_stats(&self) -> DispatcherStats {
        self.dispatcher.stats()
    }

    /// 读线程是否仍在运行
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.pipeline.is_running()
    }

    /// 取走致命链路错误（读线程故障退出时为 `Some`）
    pub fn take_link_fault(&self) -> Option<LinkError> {
        self.pipeline.take_link_fault()
    }

    /// 底层流水线
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// 有序停机：读线程 → 补充线程；播报队列在 drop 时排空
    ///
    /// 幂等。在途的补充请求被取消，不会再产生升级播报。
    pub fn stop(&mut self) -> Result<(), VizibleError> {
        let result = self.pipeline.stop();
        self.dispatcher.shutdown();
        result.map_err(VizibleError::Pipeline)
    }
}
