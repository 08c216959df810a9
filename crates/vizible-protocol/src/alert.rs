//! 播报文本渲染（Alert Phrasing）
//!
//! 基础播报与升级播报使用固定英文句式，与设备端语音保持一致：
//!
//! ```text
//! Obstruction in front at 50 centimeters
//! box obstacle in front at 50 centimeters
//! pole, bin obstacle in left at 80 centimeters
//! ```

use crate::reading::Direction;

/// 一次待播报的障碍提示
///
/// 两种生命周期形态：*基础*（`objects` 为 `None`，同步产生）与
/// *升级*（`objects` 为 `Some`，检测结果返回后异步产生）。
/// 升级形态由调用方保证标签非空——空标签列表的方向不播报升级。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub direction: Direction,
    pub distance_cm: u32,
    /// `None` = 基础播报；`Some` = 携带检测标签的升级播报
    pub objects: Option<Vec<String>>,
}

impl Alert {
    /// 基础播报（无标签）
    pub fn basic(direction: Direction, distance_cm: u32) -> Self {
        Self {
            direction,
            distance_cm,
            objects: None,
        }
    }

    /// 升级播报（携带检测标签）
    pub fn enriched(direction: Direction, distance_cm: u32, objects: Vec<String>) -> Self {
        Self {
            direction,
            distance_cm,
            objects: Some(objects),
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.objects.is_some()
    }

    /// 渲染为播报文本
    pub fn phrase(&self) -> String {
        match &self.objects {
            None => format!(
                "Obstruction in {} at {} centimeters",
                self.direction, self.distance_cm
            ),
            Some(objects) => format!(
                "{} obstacle in {} at {} centimeters",
                objects.join(", "),
                self.direction,
                self.distance_cm
            ),
        }
    }
}
