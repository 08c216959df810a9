//! 障碍评估
//!
//! 纯函数：读数 + 阈值 → 障碍事件列表，不持有任何状态。
//! 事件顺序固定为 front → left → right，便于上层按序播报。

use smallvec::SmallVec;
use vizible_protocol::{Direction, SensorReading};

/// 单个方向上的障碍事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleEvent {
    /// 障碍方向
    pub direction: Direction,
    /// 该方向的实测距离（厘米）
    pub distance_cm: u32,
}

/// 评估一条读数，返回所有低于阈值的方向
///
/// 判定为严格小于：`distance < threshold_cm` 才算障碍，
/// 恰好等于阈值不触发。三个方向互相独立，最多产出 3 个事件。
pub fn evaluate(reading: &SensorReading, threshold_cm: u32) -> SmallVec<[ObstacleEvent; 3]> {
    let mut events = SmallVec::new();
    for direction in Direction::ALL {
        let distance_cm = reading.get(direction);
        if distance_cm < threshold_cm {
            events.push(ObstacleEvent {
                direction,
                distance_cm,
            });
        }
    }
    events
}
