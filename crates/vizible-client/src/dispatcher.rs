//! 警报分发
//!
//! 每批障碍事件走两步：基础警报在调用线程上同步入队（先于任何
//! 网络动作），补充请求交给单个长驻工作线程（`vizible-enrich`）。
//! 任务带单调递增的纪元号，只有最新纪元的结果才允许升级播报，
//! 迟到的结果直接丢弃。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::Mutex;
use tracing::{debug, warn};
use vizible_pipeline::{ObstacleEvent, ReadingCallback};
use vizible_protocol::{Alert, DetectionSet, SensorReading};

use crate::enrichment::DetectionSource;
use crate::error::AlertError;
use crate::speaker::SerializedSpeaker;
use crate::util::join_bounded;

/// 分发器配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// 单个补充任务的最大请求次数（到达上限即放弃升级）
    pub fetch_attempts: u32,
    /// shutdown 等待补充线程退出的上限（毫秒）
    pub join_timeout_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            fetch_attempts: 1,
            join_timeout_ms: 2000,
        }
    }
}

/// 分发计数快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatcherStats {
    /// 入队的基础警报条数
    pub basic_alerts: u64,
    /// 入队的升级警报条数
    pub enriched_alerts: u64,
    /// 因纪元过期被丢弃的任务 / 结果数
    pub stale_discarded: u64,
    /// 补充请求失败次数（按尝试计）
    pub enrich_failures: u64,
    /// 播报队列满被丢弃的文案数
    pub utterances_dropped: u64,
}

#[derive(Default)]
struct Counters {
    basic_alerts: AtomicU64,
    enriched_alerts: AtomicU64,
    stale_discarded: AtomicU64,
    enrich_failures: AtomicU64,
}

/// 一次分发产生的补充任务
struct EnrichJob {
    epoch: u64,
    reading: SensorReading,
    events: Vec<ObstacleEvent>,
}

struct DispatcherInner {
    speaker: SerializedSpeaker,
    source: Box<dyn DetectionSource>,
    /// 已签发的纪元数；最新任务的纪元等于当前值
    epoch: AtomicU64,
    cancelled: AtomicBool,
    fetch_attempts: u32,
    counters: Counters,
}

impl DispatcherInner {
    fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch.load(Ordering::Acquire)
    }

    /// 限次请求，每次尝试前复核取消标志与纪元
    fn fetch_fresh(&self, job: &EnrichJob) -> Option<DetectionSet> {
        for attempt in 1..=self.fetch_attempts {
            if self.cancelled.load(Ordering::Acquire) {
                return None;
            }
            if !self.is_current(job.epoch) {
                self.counters.stale_discarded.fetch_add(1, Ordering::Relaxed);
                return None;
            }
            match self.source.fetch(&job.reading) {
                Ok(set) => return Some(set),
                Err(e) => {
                    self.counters.enrich_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "Enrichment attempt {}/{} failed: {}",
                        attempt, self.fetch_attempts, e
                    );
                }
            }
        }
        None
    }

    fn run_job(&self, job: EnrichJob) {
        let Some(detections) = self.fetch_fresh(&job) else {
            // 升级失败：已播的基础警报维持原样
            return;
        };

        if self.cancelled.load(Ordering::Acquire) {
            return;
        }
        if !self.is_current(job.epoch) {
            self.counters.stale_discarded.fetch_add(1, Ordering::Relaxed);
            debug!("Discarding enrichment result for superseded epoch {}", job.epoch);
            return;
        }

        for event in &job.events {
            let labels = detections.labels(event.direction);
            if labels.is_empty() {
                continue;
            }
            let alert = Alert::enriched(event.direction, event.distance_cm, labels.to_vec());
            self.speaker.enqueue(alert.phrase());
            self.counters.enriched_alerts.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// 警报分发器
///
/// 实现 [`ReadingCallback`]，直接注册到流水线即可工作。
/// 对读线程的占用仅限于播报入队与任务提交，两者都不阻塞。
pub struct AlertDispatcher {
    inner: Arc<DispatcherInner>,
    job_tx: Mutex<Option<Sender<EnrichJob>>>,
    job_rx: Receiver<EnrichJob>,
    worker: Mutex<Option<JoinHandle<()>>>,
    join_timeout_ms: u64,
}

impl AlertDispatcher {
    pub fn new(
        speaker: SerializedSpeaker,
        source: Box<dyn DetectionSource>,
        config: DispatcherConfig,
    ) -> Result<Self, AlertError> {
        // 容量 1 的任务槽：生产侧覆盖滞留任务，最多一个在排队
        let (job_tx, job_rx) = bounded(1);
        let inner = Arc::new(DispatcherInner {
            speaker,
            source,
            epoch: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            fetch_attempts: config.fetch_attempts.max(1),
            counters: Counters::default(),
        });

        let worker_inner = inner.clone();
        let worker_rx = job_rx.clone();
        let worker = thread::Builder::new()
            .name("vizible-enrich".to_string())
            .spawn(move || enrich_worker(worker_rx, worker_inner))
            .map_err(|e| AlertError::Worker(format!("failed to spawn enrichment worker: {e}")))?;

        Ok(Self {
            inner,
            job_tx: Mutex::new(Some(job_tx)),
            job_rx,
            worker: Mutex::new(Some(worker)),
            join_timeout_ms: config.join_timeout_ms,
        })
    }

    /// 分发一批障碍事件（同一条读数产生）
    pub fn dispatch(&self, reading: &SensorReading, events: &[ObstacleEvent]) {
        if events.is_empty() {
            return;
        }

        // 第一步：基础警报立即入队，不等网络
        for event in events {
            let alert = Alert::basic(event.direction, event.distance_cm);
            self.inner.speaker.enqueue(alert.phrase());
            self.inner.counters.basic_alerts.fetch_add(1, Ordering::Relaxed);
        }

        // 第二步：签发新纪元并提交补充任务
        let epoch = self.inner.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        self.submit(EnrichJob {
            epoch,
            reading: *reading,
            events: events.to_vec(),
        });
    }

    /// 提交任务；槽位被旧任务占着就把旧的换下来
    fn submit(&self, mut job: EnrichJob) {
        let guard = self.job_tx.lock();
        let Some(tx) = guard.as_ref() else {
            return; // 已 shutdown
        };
        loop {
            match tx.try_send(job) {
                Ok(()) => return,
                Err(TrySendError::Full(stale_loser)) => {
                    if self.job_rx.try_recv().is_ok() {
                        self.inner.counters.stale_discarded.fetch_add(1, Ordering::Relaxed);
                    }
                    job = stale_loser;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    /// 计数快照
    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            basic_alerts: self.inner.counters.basic_alerts.load(Ordering::Relaxed),
            enriched_alerts: self.inner.counters.enriched_alerts.load(Ordering::Relaxed),
            stale_discarded: self.inner.counters.stale_discarded.load(Ordering::Relaxed),
            enrich_failures: self.inner.counters.enrich_failures.load(Ordering::Relaxed),
            utterances_dropped: self.inner.speaker.dropped().load(Ordering::Relaxed),
        }
    }

    /// 停止补充线程
    ///
    /// 设置取消标志、关闭任务槽并限时等待工作线程退出。
    /// 在途结果不会再触碰播报队列。幂等。
    pub fn shutdown(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        if let Some(tx) = self.job_tx.lock().take() {
            drop(tx);
        }
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            join_bounded(
                worker,
                Duration::from_millis(self.join_timeout_ms),
                "enrichment",
            );
        }
    }
}

impl Drop for AlertDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl ReadingCallback for AlertDispatcher {
    fn on_reading(&self, _reading: &SensorReading) {}

    fn on_obstacles(&self, reading: &SensorReading, events: &[ObstacleEvent]) {
        self.dispatch(reading, events);
    }
}

fn enrich_worker(jobs: Receiver<EnrichJob>, inner: Arc<DispatcherInner>) {
    debug!("Enrichment worker started");
    while let Ok(job) = jobs.recv() {
        inner.run_job(job);
    }
    debug!("Enrichment worker exited");
}
