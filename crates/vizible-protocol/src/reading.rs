//! 距离读数解析（Sensor Reading）
//!
//! 固定模板：`Front: <int>cm | Left: <int>cm | Right: <int>cm`
//!
//! - 关键字与 `cm` 单位不区分大小写
//! - `:` 之后与 `|` 两侧允许任意空白；关键字与 `:` 之间不允许
//! - 记录去除首尾空白后必须完整匹配，尾部残留即拒绝
//! - 数字为十进制非负整数，超出 `u32` 范围按格式错误处理

use crate::ProtocolError;
use crate::scan::Scanner;
use std::fmt;

/// 传感方向（按评估与播报顺序排列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Front,
    Left,
    Right,
}

impl Direction {
    /// 全部方向，front → left → right
    pub const ALL: [Direction; 3] = [Direction::Front, Direction::Left, Direction::Right];

    /// 播报文本中使用的小写名称
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Front => "front",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次完整的三向距离读数（厘米）
///
/// 仅由 [`SensorReading::parse`] 在记录完整匹配时构造；
/// 不存在部分读数——要么三个字段齐全，要么整条拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReading {
    pub front: u32,
    pub left: u32,
    pub right: u32,
}

impl SensorReading {
    pub fn new(front: u32, left: u32, right: u32) -> Self {
        Self { front, left, right }
    }

    /// 解析一条文本记录
    ///
    /// 任何偏差（字段缺失、乱序、非数字、分隔符错误、尾部残留）
    /// 返回 `MalformedReading`；数字超出范围返回 `DistanceOverflow`。
    /// 两者对流均非致命，调用方丢弃该记录后继续。
    pub fn parse(record: &str) -> Result<Self, ProtocolError> {
        let trimmed = record.trim();
        let mut scanner = Scanner::new(trimmed);

        let front = distance_field(&mut scanner, "front", trimmed)?;
        pipe_separator(&mut scanner, trimmed)?;
        let left = distance_field(&mut scanner, "left", trimmed)?;
        pipe_separator(&mut scanner, trimmed)?;
        let right = distance_field(&mut scanner, "right", trimmed)?;

        if !scanner.is_done() {
            return Err(malformed(trimmed));
        }
        Ok(Self { front, left, right })
    }

    /// 按方向取值
    pub fn get(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Front => self.front,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Front: {}cm | Left: {}cm | Right: {}cm",
            self.front, self.left, self.right
        )
    }
}

fn malformed(record: &str) -> ProtocolError {
    ProtocolError::MalformedReading(record.to_string())
}

/// `<keyword>:\s*<digits>cm`
fn distance_field(
    scanner: &mut Scanner<'_>,
    name: &'static str,
    record: &str,
) -> Result<u32, ProtocolError> {
    if !scanner.keyword_ci(name) || !scanner.tag(':') {
        return Err(malformed(record));
    }
    scanner.skip_ws();
    let digits = scanner.digits().ok_or_else(|| malformed(record))?;
    let value = digits.parse::<u32>().map_err(|_| ProtocolError::DistanceOverflow {
        field: name,
        digits: digits.to_string(),
    })?;
    if !scanner.keyword_ci("cm") {
        return Err(malformed(record));
    }
    Ok(value)
}

/// `\s*\|\s*`
fn pipe_separator(scanner: &mut Scanner<'_>, record: &str) -> Result<(), ProtocolError> {
    scanner.skip_ws();
    if !scanner.tag('|') {
        return Err(malformed(record));
    }
    scanner.skip_ws();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_record() {
        let reading = SensorReading::parse("Front: 12cm | Left: 14cm | Right: 15cm").unwrap();
        assert_eq!(reading, SensorReading::new(12, 14, 15));
    }

    #[test]
    fn test_parse_compact_lowercase() {
        let reading = SensorReading::parse("front:12cm|left:14cm|right:15cm").unwrap();
        assert_eq!(reading, SensorReading::new(12, 14, 15));
    }

    #[test]
    fn test_parse_mixed_case_and_padding() {
        let reading =
            SensorReading::parse("  FRONT:  7cm  |  lEfT: 0cm |Right:300CM  ").unwrap();
        assert_eq!(reading, SensorReading::new(7, 0, 300));
    }

    #[test]
    fn test_parse_missing_field_rejected() {
        let err = SensorReading::parse("Front: 12cm | Left: 14cm").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedReading(_)));
    }

    #[test]
    fn test_parse_out_of_order_rejected() {
        let err = SensorReading::parse("Left: 14cm | Front: 12cm | Right: 15cm").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedReading(_)));
    }

    #[test]
    fn test_parse_non_numeric_rejected() {
        let err = SensorReading::parse("Front: abccm | Left: 14cm | Right: 15cm").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedReading(_)));
    }

    #[test]
    fn test_parse_negative_rejected() {
        let err = SensorReading::parse("Front: -5cm | Left: 14cm | Right: 15cm").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedReading(_)));
    }

    #[test]
    fn test_parse_trailing_garbage_rejected() {
        let err =
            SensorReading::parse("Front: 12cm | Left: 14cm | Right: 15cm trailing").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedReading(_)));
    }

    #[test]
    fn test_parse_space_before_colon_rejected() {
        let err = SensorReading::parse("Front : 12cm | Left: 14cm | Right: 15cm").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedReading(_)));
    }

    #[test]
    fn test_parse_blank_record_rejected() {
        assert!(SensorReading::parse("").is_err());
        assert!(SensorReading::parse("   ").is_err());
    }

    #[test]
    fn test_parse_overflow_rejected() {
        let err =
            SensorReading::parse("Front: 99999999999cm | Left: 14cm | Right: 15cm").unwrap_err();
        match err {
            ProtocolError::DistanceOverflow { field, digits } => {
                assert_eq!(field, "front");
                assert_eq!(digits, "99999999999");
            }
            other => panic!("expected DistanceOverflow, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_leading_zeros_accepted() {
        let reading = SensorReading::parse("Front: 007cm | Left: 014cm | Right: 0cm").unwrap();
        assert_eq!(reading, SensorReading::new(7, 14, 0));
    }

    #[test]
    fn test_get_by_direction() {
        let reading = SensorReading::new(1, 2, 3);
        assert_eq!(reading.get(Direction::Front), 1);
        assert_eq!(reading.get(Direction::Left), 2);
        assert_eq!(reading.get(Direction::Right), 3);
    }

    #[test]
    fn test_direction_order_and_names() {
        let names: Vec<_> = Direction::ALL.iter().map(|d| d.as_str()).collect();
        assert_eq!(names, vec!["front", "left", "right"]);
        assert_eq!(Direction::Front.to_string(), "front");
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let reading = SensorReading::new(50, 200, 300);
        let parsed = SensorReading::parse(&reading.to_string()).unwrap();
        assert_eq!(parsed, reading);
    }
}
