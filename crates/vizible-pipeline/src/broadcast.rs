//! 读数广播钩子
//!
//! 把读线程上的回调转成有界通道，供 UI / 日志等订阅方在自己的
//! 线程里消费。发送用 `try_send`：订阅方消费不过来时丢弃新读数
//! 并计数，绝不阻塞读线程。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use vizible_protocol::SensorReading;

use crate::hooks::ReadingCallback;

/// 默认订阅通道容量
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

/// 读数广播钩子（非阻塞）
///
/// 每个订阅者一个实例，互相独立：一个慢订阅者丢自己的读数，
/// 不影响其他订阅者。
pub struct ReadingBroadcast {
    tx: Sender<SensorReading>,
    published: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
}

impl ReadingBroadcast {
    /// 创建广播钩子与对应的接收端
    pub fn new(capacity: usize) -> (Self, Receiver<SensorReading>) {
        let (tx, rx) = bounded(capacity);
        let hook = Self {
            tx,
            published: Arc::new(AtomicU64::new(0)),
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (hook, rx)
    }

    /// 成功投递的读数计数
    pub fn published(&self) -> Arc<AtomicU64> {
        self.published.clone()
    }

    /// 因通道满而丢弃的读数计数
    pub fn dropped(&self) -> Arc<AtomicU64> {
        self.dropped.clone()
    }
}

impl ReadingCallback for ReadingBroadcast {
    fn on_reading(&self, reading: &SensorReading) {
        // 满或已断开都只计数，不阻塞
        match self.tx.try_send(*reading) {
            Ok(()) => {
                self.published.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_delivers_readings() {
        let (hook, rx) = ReadingBroadcast::new(4);
        let reading = SensorReading::new(50, 200, 300);

        hook.on_reading(&reading);
        hook.on_reading(&SensorReading::new(60, 210, 310));

        assert_eq!(rx.try_recv().unwrap(), reading);
        assert_eq!(rx.try_recv().unwrap(), SensorReading::new(60, 210, 310));
        assert_eq!(hook.published().load(Ordering::Relaxed), 2);
        assert_eq!(hook.dropped().load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_full_channel_drops_newest() {
        let (hook, rx) = ReadingBroadcast::new(1);

        hook.on_reading(&SensorReading::new(1, 1, 1));
        hook.on_reading(&SensorReading::new(2, 2, 2)); // 满，丢弃

        assert_eq!(hook.dropped().load(Ordering::Relaxed), 1);
        assert_eq!(rx.try_recv().unwrap(), SensorReading::new(1, 1, 1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_disconnected_receiver_counts_drops() {
        let (hook, rx) = ReadingBroadcast::new(4);
        drop(rx);

        hook.on_reading(&SensorReading::new(1, 2, 3));
        assert_eq!(hook.dropped().load(Ordering::Relaxed), 1);
        assert_eq!(hook.published().load(Ordering::Relaxed), 0);
    }
}
