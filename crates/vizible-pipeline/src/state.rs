//! 连接状态定义
//!
//! 把宿主平台的回调式生命周期改写为显式状态值：
//! `Disconnected → Connecting → Streaming → Disconnected`，
//! 由流水线单一持有，其余线程只读。

use std::sync::atomic::{AtomicU8, Ordering};

/// 链路连接状态
///
/// # 状态说明
///
/// - **Disconnected**: 无活动链路（初始态，也是停止/故障后的终态）
/// - **Connecting**: 正在打开链路后端
/// - **Streaming**: 读线程运行中，记录持续流入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum LinkState {
    /// 无活动链路（默认）
    #[default]
    Disconnected = 0,

    /// 链路后端打开中
    Connecting = 1,

    /// 读线程运行中
    Streaming = 2,
}

impl LinkState {
    /// 从 u8 转换；无效值按 Disconnected 处理
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Streaming,
            _ => Self::Disconnected,
        }
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 是否在读取数据
    pub fn is_streaming(self) -> bool {
        self == Self::Streaming
    }

    /// 是否已断开
    pub fn is_disconnected(self) -> bool {
        self == Self::Disconnected
    }
}

/// 连接状态（原子版本，用于线程间共享）
///
/// 读线程在进入/退出时写入，其余线程通过 `get` 只读。
#[derive(Debug)]
pub struct AtomicLinkState {
    inner: AtomicU8,
}

impl AtomicLinkState {
    pub fn new(state: LinkState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    /// 获取当前状态
    pub fn get(&self, ordering: Ordering) -> LinkState {
        LinkState::from_u8(self.inner.load(ordering))
    }

    /// 设置状态
    pub fn set(&self, state: LinkState, ordering: Ordering) {
        self.inner.store(state.as_u8(), ordering);
    }
}

impl Default for AtomicLinkState {
    fn default() -> Self {
        Self::new(LinkState::Disconnected)
    }
}

impl Clone for AtomicLinkState {
    fn clone(&self) -> Self {
        Self::new(self.get(Ordering::Relaxed))
    }
}
