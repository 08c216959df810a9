//! 行帧解码（Line Framing）
//!
//! 将无边界的字节流切分为以 `\n` 终止的文本记录：
//!
//! - 跨 `feed` 调用保留最后一个 `\n` 之后的尾部（字节精确切片）
//! - 记录去除尾部 `\r`；空行原样产出，由上层解析自行拒绝
//! - 未终止内容超过上限时整行丢弃并上报 `Oversized`（非致命，流继续）
//!
//! # 分块无关性
//!
//! 同一字节序列无论按何种块边界馈入，产出的记录序列完全一致。
//! 为保持该性质，超限行无论终止符是否已经到达都整行丢弃：
//! 上报一次 `Oversized` 后持续丢弃至下一个 `\n`，被截断的尾巴
//! 不会作为伪记录泄出。

use crate::ProtocolError;
use crate::constants::DEFAULT_MAX_RECORD_BYTES;
use bytes::{Buf, BytesMut};

/// 行解码器
///
/// 内部累积缓冲只保存未终止的尾部，上限为 `max_record_bytes`；
/// 已终止的记录在 `feed` 返回的迭代器中逐条取走。
#[derive(Debug)]
pub struct LineDecoder {
    /// 累积缓冲（最后一个 `\n` 之后的未消费尾部）
    buf: BytesMut,

    /// 单行内容的字节上限
    max_record_bytes: usize,

    /// 超限后丢弃至下一个 `\n` 的进行中标志
    skipping: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECORD_BYTES)
    }
}

impl LineDecoder {
    /// 创建解码器，`max_record_bytes` 为单行内容上限
    pub fn new(max_record_bytes: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(max_record_bytes.min(4096)),
            max_record_bytes,
            skipping: false,
        }
    }

    /// 馈入一段字节，返回完整记录的借用迭代器
    ///
    /// 迭代器逐条产出 `Ok(record)` 或 `Err(ProtocolError::Oversized)`；
    /// 未终止的尾部保留到下一次 `feed`。迭代器必须耗尽后才能再次
    /// `feed`（借用关系由编译器保证）。
    pub fn feed(&mut self, chunk: &[u8]) -> Records<'_> {
        self.buf.extend_from_slice(chunk);
        Records { decoder: self }
    }

    /// 当前缓冲中未终止的字节数
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// 清空缓冲与丢弃状态（断链重连后复位）
    pub fn reset(&mut self) {
        self.buf.clear();
        self.skipping = false;
    }

    fn newline_at(&self) -> Option<usize> {
        self.buf.iter().position(|&b| b == b'\n')
    }
}

/// `LineDecoder::feed` 的记录迭代器
#[derive(Debug)]
pub struct Records<'a> {
    decoder: &'a mut LineDecoder,
}

impl Iterator for Records<'_> {
    type Item = Result<String, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let dec = &mut *self.decoder;
            match dec.newline_at() {
                // 越过被丢弃行的剩余部分，之后继续正常切分
                Some(pos) if dec.skipping => {
                    dec.buf.advance(pos + 1);
                    dec.skipping = false;
                }
                // 终止符已到达但整行超限：连同终止符一起丢弃
                Some(pos) if pos > dec.max_record_bytes => {
                    dec.buf.advance(pos + 1);
                    return Some(Err(ProtocolError::Oversized { dropped: pos }));
                }
                Some(pos) => {
                    let mut line = dec.buf.split_to(pos + 1);
                    line.truncate(line.len() - 1);
                    if line.last() == Some(&b'\r') {
                        line.truncate(line.len() - 1);
                    }
                    return Some(Ok(String::from_utf8_lossy(&line).into_owned()));
                }
                None if dec.skipping => {
                    dec.buf.clear();
                    return None;
                }
                // 未终止内容越过上限：丢弃并进入跳过状态
                None if dec.buf.len() > dec.max_record_bytes => {
                    let dropped = dec.buf.len();
                    dec.buf.clear();
                    dec.skipping = true;
                    return Some(Err(ProtocolError::Oversized { dropped }));
                }
                None => return None,
            }
        }
    }
}
