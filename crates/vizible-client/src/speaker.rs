//! 播报串行化
//!
//! 基础警报在读线程上入队，补充警报在补充线程上入队。
//! [`SerializedSpeaker`] 把两条路径汇到单个播报线程，保证
//! 两段文案永远不会交叠输出；入队满时丢弃新文案并计数，
//! 绝不阻塞调用方。

use std::mem::ManuallyDrop;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::AlertError;
use crate::util::join_bounded;

/// 默认播报队列容量
pub const DEFAULT_SPEECH_QUEUE_CAPACITY: usize = 16;

/// 播报终端
///
/// 实现方负责真正发声（TTS 引擎、音频设备、stdout…）。
/// `speak` 在专用播报线程上调用，允许阻塞到本句播完。
pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str);
}

/// 单写者播报队列
///
/// 包装任意 [`Speaker`]，用有界通道 + 专用线程（`vizible-speak`）
/// 串行化所有调用。drop 时先关闭通道，再等待剩余条目播完。
pub struct SerializedSpeaker {
    tx: ManuallyDrop<Sender<String>>,
    worker: Option<JoinHandle<()>>,
    dropped: Arc<AtomicU64>,
}

impl SerializedSpeaker {
    /// 以默认队列容量包装一个终端
    pub fn new(sink: Arc<dyn Speaker>) -> Result<Self, AlertError> {
        Self::with_capacity(sink, DEFAULT_SPEECH_QUEUE_CAPACITY)
    }

    pub fn with_capacity(sink: Arc<dyn Speaker>, capacity: usize) -> Result<Self, AlertError> {
        let (tx, rx) = bounded::<String>(capacity);
        let worker = thread::Builder::new()
            .name("vizible-speak".to_string())
            .spawn(move || speech_worker(rx, sink))
            .map_err(|e| AlertError::Worker(format!("failed to spawn speech worker: {e}")))?;
        Ok(Self {
            tx: ManuallyDrop::new(tx),
            worker: Some(worker),
            dropped: Arc::new(AtomicU64::new(0)),
        })
    }

    /// 入队一句播报（非阻塞）
    pub fn enqueue(&self, text: String) {
        match self.tx.try_send(text) {
            Ok(()) => {}
            Err(TrySendError::Full(text)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Speech queue full, dropping utterance: {:?}", text);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// 因队列满被丢弃的文案计数
    pub fn dropped(&self) -> Arc<AtomicU64> {
        self.dropped.clone()
    }
}

impl Drop for SerializedSpeaker {
    fn drop(&mut self) {
        // 先断开发送端让 worker 播完存量后退出，再限时等它
        unsafe {
            ManuallyDrop::drop(&mut self.tx);
        }
        if let Some(worker) = self.worker.take() {
            join_bounded(worker, Duration::from_secs(5), "speech");
        }
    }
}

fn speech_worker(rx: Receiver<String>, sink: Arc<dyn Speaker>) {
    debug!("Speech worker started");
    while let Ok(text) = rx.recv() {
        sink.speak(&text);
    }
    debug!("Speech worker exited");
}

/// 记录式终端：把文案存进内存，测试与无声运行用
#[derive(Default)]
pub struct MemorySpeaker {
    phrases: Mutex<Vec<String>>,
}

impl MemorySpeaker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 到目前为止播过的全部文案
    pub fn phrases(&self) -> Vec<String> {
        self.phrases.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.phrases.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.lock().is_empty()
    }
}

impl Speaker for MemorySpeaker {
    fn speak(&self, text: &str) {
        self.phrases.lock().push(text.to_string());
    }
}

/// 标准输出终端：每句一行，操作台模式用
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSpeaker;

impl Speaker for StdoutSpeaker {
    fn speak(&self, text: &str) {
        println!("[alert] {text}");
    }
}
