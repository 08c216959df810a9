//! 轻量文本扫描器（crate 内部）
//!
//! `reading` 与 `detections` 两套固定模板共用的顺序匹配原语。
//! 扫描器本身不产生错误类型，匹配失败返回 `false`/`None`，
//! 由调用方映射为各自的 `ProtocolError` 变体。

/// 顺序扫描器：持有原始记录的剩余切片，逐段消费
pub(crate) struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    /// 消费一个不区分大小写的关键字（`front`、`cm` 等）
    pub(crate) fn keyword_ci(&mut self, name: &str) -> bool {
        match self.rest.get(..name.len()) {
            Some(head) if head.eq_ignore_ascii_case(name) => {
                self.rest = &self.rest[name.len()..];
                true
            }
            _ => false,
        }
    }

    /// 消费单个确定字符
    pub(crate) fn tag(&mut self, ch: char) -> bool {
        match self.rest.strip_prefix(ch) {
            Some(stripped) => {
                self.rest = stripped;
                true
            }
            None => false,
        }
    }

    /// 跳过任意空白（可为空）
    pub(crate) fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// 消费一段非空的十进制数字，返回数字切片
    pub(crate) fn digits(&mut self) -> Option<&'a str> {
        let len = self.rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        if len == 0 {
            return None;
        }
        let (digits, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(digits)
    }

    /// 消费至 `ch`（含），返回其前的内容；找不到则不消费
    pub(crate) fn until(&mut self, ch: char) -> Option<&'a str> {
        let pos = self.rest.find(ch)?;
        let body = &self.rest[..pos];
        self.rest = &self.rest[pos + ch.len_utf8()..];
        Some(body)
    }

    /// 输入是否已全部消费（完整匹配检查）
    pub(crate) fn is_done(&self) -> bool {
        self.rest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_ci_matches_any_case() {
        let mut s = Scanner::new("FrOnT:rest");
        assert!(s.keyword_ci("front"));
        assert!(s.tag(':'));
        assert!(!s.is_done());
    }

    #[test]
    fn test_keyword_ci_rejects_mismatch() {
        let mut s = Scanner::new("back:");
        assert!(!s.keyword_ci("front"));
        // 失败时不消费
        assert!(s.keyword_ci("back"));
    }

    #[test]
    fn test_digits_stop_at_non_digit() {
        let mut s = Scanner::new("042cm");
        assert_eq!(s.digits(), Some("042"));
        assert!(s.keyword_ci("cm"));
        assert!(s.is_done());
    }

    #[test]
    fn test_digits_empty_is_none() {
        let mut s = Scanner::new("cm");
        assert_eq!(s.digits(), None);
    }

    #[test]
    fn test_until_consumes_terminator() {
        let mut s = Scanner::new("a,b} | tail");
        assert_eq!(s.until('}'), Some("a,b"));
        s.skip_ws();
        assert!(s.tag('|'));
    }

    #[test]
    fn test_until_missing_terminator() {
        let mut s = Scanner::new("no close");
        assert_eq!(s.until('}'), None);
        // 失败时不消费
        assert!(s.keyword_ci("no"));
    }
}
