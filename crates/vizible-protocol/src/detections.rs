//! 检测结果载荷（Detection Payload）
//!
//! 后端以单个字符串返回三个方向的物体标签：
//!
//! ```text
//! Front:{car,truck} | Right:{} | Left:{pole}
//! ```
//!
//! - 分组顺序固定为 Front、Right、Left（与读数模板的顺序不同）
//! - 花括号体内条目以 `,` 分隔，逐项去除首尾空白，空条目丢弃
//! - 条目顺序与重复原样保留，花括号体内不允许出现 `}`
//! - `encode` 产出同一形态，可与 `parse` 往返

use crate::ProtocolError;
use crate::reading::Direction;
use crate::scan::Scanner;

/// 三个方向的物体标签集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionSet {
    pub front: Vec<String>,
    pub right: Vec<String>,
    pub left: Vec<String>,
}

impl DetectionSet {
    /// 解析线上载荷
    ///
    /// 载荷去除首尾空白后必须完整匹配三组模板；
    /// 任何偏差返回 `MalformedDetections`。
    pub fn parse(payload: &str) -> Result<Self, ProtocolError> {
        let trimmed = payload.trim();
        let mut scanner = Scanner::new(trimmed);

        let front = label_group(&mut scanner, "front", trimmed)?;
        group_separator(&mut scanner, trimmed)?;
        let right = label_group(&mut scanner, "right", trimmed)?;
        group_separator(&mut scanner, trimmed)?;
        let left = label_group(&mut scanner, "left", trimmed)?;

        if !scanner.is_done() {
            return Err(malformed(trimmed));
        }
        Ok(Self { front, right, left })
    }

    /// 编码回线上形态（与 `parse` 往返一致）
    pub fn encode(&self) -> String {
        format!(
            "Front:{{{}}} | Right:{{{}}} | Left:{{{}}}",
            self.front.join(","),
            self.right.join(","),
            self.left.join(","),
        )
    }

    /// 按方向取标签
    pub fn labels(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Front => &self.front,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    /// 三个方向是否都没有标签
    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.right.is_empty() && self.left.is_empty()
    }
}

fn malformed(payload: &str) -> ProtocolError {
    ProtocolError::MalformedDetections(payload.to_string())
}

/// `<keyword>:\s*{<body>}`
fn label_group(
    scanner: &mut Scanner<'_>,
    name: &'static str,
    payload: &str,
) -> Result<Vec<String>, ProtocolError> {
    if !scanner.keyword_ci(name) || !scanner.tag(':') {
        return Err(malformed(payload));
    }
    scanner.skip_ws();
    if !scanner.tag('{') {
        return Err(malformed(payload));
    }
    let body = scanner.until('}').ok_or_else(|| malformed(payload))?;
    Ok(split_labels(body))
}

/// `\s*\|\s*`
fn group_separator(scanner: &mut Scanner<'_>, payload: &str) -> Result<(), ProtocolError> {
    scanner.skip_ws();
    if !scanner.tag('|') {
        return Err(malformed(payload));
    }
    scanner.skip_ws();
    Ok(())
}

fn split_labels(body: &str) -> Vec<String> {
    body.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}
