//! 流水线属主对象与共享上下文

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use crossbeam_channel::Receiver;
use parking_lot::{Mutex, RwLock};
use tracing::{error, info};
use vizible_link::{Link, LinkError};
use vizible_protocol::SensorReading;

use crate::broadcast::ReadingBroadcast;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::hooks::{HookManager, ReadingCallback};
use crate::metrics::{MetricsSnapshot, PipelineMetrics};
use crate::monitor::ConnectionMonitor;
use crate::rx::rx_loop;
use crate::state::{AtomicLinkState, LinkState};

/// 读线程与属主线程共享的上下文
///
/// 属主持有 `Arc<PipelineContext>`，读线程持有克隆。
/// 所有字段都是线程安全容器，无需外层锁。
pub struct PipelineContext {
    /// 最近一条解析成功的读数（无锁快照）
    pub latest_reading: ArcSwapOption<SensorReading>,
    /// 回调钩子（注册走写锁，触发走读锁）
    pub hooks: RwLock<HookManager>,
    /// 运行计数
    pub metrics: PipelineMetrics,
    /// 链路活性跟踪
    pub monitor: ConnectionMonitor,
    /// 连接状态
    pub state: AtomicLinkState,
    /// 读循环运行标志。属主置 false 请求停止
    pub is_running: AtomicBool,
    /// 致命链路错误（读线程写入一次，属主取走）
    pub link_fault: Mutex<Option<LinkError>>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self {
            latest_reading: ArcSwapOption::empty(),
            hooks: RwLock::new(HookManager::new()),
            metrics: PipelineMetrics::new(),
            monitor: ConnectionMonitor::new(),
            state: AtomicLinkState::default(),
            is_running: AtomicBool::new(false),
            link_fault: Mutex::new(None),
        }
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 传感器流水线
///
/// 持有专用读线程的句柄。`stop()`（或 drop）置停止标志并在
/// 限时内等待线程退出；线路故障导致的自行退出可通过
/// [`Pipeline::take_link_fault`] 查询。
pub struct Pipeline {
    ctx: Arc<PipelineContext>,
    read_thread: Option<JoinHandle<()>>,
    config: PipelineConfig,
}

impl Pipeline {
    /// 在给定链路上启动流水线
    ///
    /// 读线程立即开始消费数据。需要在第一条记录前注册回调时，
    /// 请使用 [`PipelineBuilder`](crate::PipelineBuilder)。
    pub fn start(link: Box<dyn Link>, config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::start_with(Arc::new(PipelineContext::new()), link, config, Vec::new())
    }

    /// 在预构建的上下文上启动，回调在读线程启动前注册完毕
    pub(crate) fn start_with(
        ctx: Arc<PipelineContext>,
        link: Box<dyn Link>,
        config: PipelineConfig,
        callbacks: Vec<Arc<dyn ReadingCallback>>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;

        {
            let mut hooks = ctx.hooks.write();
            for callback in callbacks {
                hooks.add_callback(callback);
            }
        }

        ctx.is_running.store(true, Ordering::Release);
        let thread_ctx = ctx.clone();
        let read_thread = thread::Builder::new()
            .name("vizible-rx".to_string())
            .spawn(move || rx_loop(link, thread_ctx, config))
            .map_err(|e| {
                ctx.is_running.store(false, Ordering::Release);
                ctx.state.set(LinkState::Disconnected, Ordering::Release);
                PipelineError::ReadThread(format!("failed to spawn RX thread: {e}"))
            })?;

        Ok(Self {
            ctx,
            read_thread: Some(read_thread),
            config,
        })
    }

    /// 注册一个读数回调（可在运行中调用）
    pub fn register_callback(&self, callback: Arc<dyn ReadingCallback>) {
        self.ctx.hooks.write().add_callback(callback);
    }

    /// 订阅读数流
    ///
    /// 返回有界接收端；消费不及时只影响本订阅者，新读数被丢弃。
    pub fn subscribe(&self) -> Receiver<SensorReading> {
        let (hook, rx) = ReadingBroadcast::new(self.config.subscriber_capacity);
        self.register_callback(Arc::new(hook));
        rx
    }

    /// 最近一条解析成功的读数
    #[must_use]
    pub fn latest_reading(&self) -> Option<SensorReading> {
        self.ctx.latest_reading.load_full().map(|reading| *reading)
    }

    /// 当前连接状态
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.ctx.state.get(Ordering::Acquire)
    }

    /// 读线程是否仍在运行
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.ctx.is_running.load(Ordering::Acquire)
    }

    /// 运行计数快照
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// 链路活性跟踪器
    pub fn monitor(&self) -> &ConnectionMonitor {
        &self.ctx.monitor
    }

    /// 取走致命链路错误（只能取走一次）
    ///
    /// 读线程因链路故障退出后返回 `Some`；主动 stop 返回 `None`。
    pub fn take_link_fault(&self) -> Option<LinkError> {
        self.ctx.link_fault.lock().take()
    }

    /// 共享上下文（高级用法，例如配合 [`rx_loop`] 自建线程）
    pub fn context(&self) -> &Arc<PipelineContext> {
        &self.ctx
    }

    /// 当前配置
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 停止读线程并等待退出
    ///
    /// 幂等：重复调用或在故障退出后调用都返回 `Ok`。
    pub fn stop(&mut self) -> Result<(), PipelineError> {
        self.ctx.is_running.store(false, Ordering::Release);
        let Some(handle) = self.read_thread.take() else {
            return Ok(());
        };

        info!("Stopping pipeline");
        match handle.join_timeout(Duration::from_millis(self.config.join_timeout_ms)) {
            JoinOutcome::Completed => Ok(()),
            JoinOutcome::Panicked => {
                Err(PipelineError::ReadThread("RX thread panicked".to_string()))
            }
            JoinOutcome::TimedOut => Err(PipelineError::JoinTimeout),
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.ctx.is_running.store(false, Ordering::Release);
        if let Some(handle) = self.read_thread.take() {
            match handle.join_timeout(Duration::from_millis(self.config.join_timeout_ms)) {
                JoinOutcome::Completed => {}
                JoinOutcome::Panicked => error!("RX thread panicked"),
                JoinOutcome::TimedOut => {
                    error!(
                        "RX thread did not stop within {}ms",
                        self.config.join_timeout_ms
                    );
                }
            }
        }
    }
}

enum JoinOutcome {
    Completed,
    Panicked,
    TimedOut,
}

/// 限时 join：避免链路驱动卡死时拖住属主线程
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> JoinOutcome;
}

impl JoinTimeout for JoinHandle<()> {
    fn join_timeout(self, timeout: Duration) -> JoinOutcome {
        let (tx, rx) = std::sync::mpsc::channel();
        let watchdog = thread::spawn(move || {
            let _ = tx.send(self.join().is_ok());
        });
        match rx.recv_timeout(timeout) {
            Ok(true) => {
                let _ = watchdog.join();
                JoinOutcome::Completed
            }
            Ok(false) => {
                let _ = watchdog.join();
                JoinOutcome::Panicked
            }
            // 超时：watchdog 滞留到进程结束，由系统回收
            Err(_) => JoinOutcome::TimedOut,
        }
    }
}
