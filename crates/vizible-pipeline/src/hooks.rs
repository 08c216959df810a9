//! 读数回调钩子
//!
//! 读线程每解析出一条读数，就同步触发一轮回调。
//! 回调在读线程上执行，实现方必须保持轻量：
//! 耗时工作（网络、落盘）应转发到自己的线程/通道后立刻返回。

use std::sync::Arc;

use parking_lot::RwLock;
use vizible_protocol::SensorReading;

use crate::evaluator::ObstacleEvent;

/// 读数回调接口
///
/// `on_reading` 对每条解析成功的读数触发一次；
/// `on_obstacles` 仅在该读数产生至少一个障碍事件时触发，
/// 且保证在下一条读数的任何回调之前完成。
pub trait ReadingCallback: Send + Sync {
    /// 新读数到达
    fn on_reading(&self, reading: &SensorReading);

    /// 本条读数触发的障碍事件（按 front → left → right 排序）
    fn on_obstacles(&self, reading: &SensorReading, events: &[ObstacleEvent]) {
        let _ = (reading, events);
    }
}

/// 钩子管理器
///
/// 持有一组回调并按注册顺序触发。注册可以在流水线运行中进行，
/// 外层用 [`RwLock`] 保护：触发走读锁，注册走写锁。
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn ReadingCallback>>,
}

impl HookManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个回调
    pub fn add_callback(&mut self, callback: Arc<dyn ReadingCallback>) {
        self.callbacks.push(callback);
    }

    /// 清空所有回调
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 已注册回调数量
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// 按注册顺序触发 on_reading
    pub fn trigger_reading(&self, reading: &SensorReading) {
        for callback in &self.callbacks {
            callback.on_reading(reading);
        }
    }

    /// 按注册顺序触发 on_obstacles
    pub fn trigger_obstacles(&self, reading: &SensorReading, events: &[ObstacleEvent]) {
        for callback in &self.callbacks {
            callback.on_obstacles(reading, events);
        }
    }
}

/// 便捷类型：共享的钩子管理器
pub type SharedHooks = RwLock<HookManager>;
