//! Mock 链路（无硬件依赖）
//!
//! 测试侧通过 [`MockHandle`] 向脚本队列推送字节块或错误；
//! 流水线侧把 [`MockLink`] 当普通链路读。队列排空后读返回
//! `Timeout`（模拟安静的链路），`close()` 之后返回 `Closed`。

use crate::{Link, LinkError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug)]
enum MockStep {
    Chunk(Vec<u8>),
    Error(LinkError),
}

#[derive(Debug, Default)]
struct MockShared {
    script: Mutex<VecDeque<MockStep>>,
    closed: AtomicBool,
}

/// 测试侧句柄：向 Mock 链路馈入数据/错误
#[derive(Clone)]
pub struct MockHandle {
    shared: Arc<MockShared>,
}

impl MockHandle {
    /// 推送一段字节（空块忽略）
    pub fn push_chunk(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.shared
            .script
            .lock()
            .push_back(MockStep::Chunk(bytes.to_vec()));
    }

    /// 推送一个读错误（队列中既有内容先被读完）
    pub fn push_error(&self, err: LinkError) {
        self.shared.script.lock().push_back(MockStep::Error(err));
    }

    /// 脚本排空后，后续读返回 `Closed`
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);
    }

    /// 尚未被读走的脚本步数
    pub fn pending_steps(&self) -> usize {
        self.shared.script.lock().len()
    }
}

/// Mock 字节流链路
pub struct MockLink {
    shared: Arc<MockShared>,
    read_timeout: Duration,
}

impl MockLink {
    /// 创建链路与其测试句柄
    pub fn new() -> (Self, MockHandle) {
        let shared = Arc::new(MockShared::default());
        (
            Self {
                shared: shared.clone(),
                read_timeout: Duration::from_millis(5),
            },
            MockHandle { shared },
        )
    }

    /// 便捷构造：预置一组字节块
    pub fn with_chunks<I, C>(chunks: I) -> (Self, MockHandle)
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let (link, handle) = Self::new();
        for chunk in chunks {
            handle.push_chunk(chunk.as_ref());
        }
        (link, handle)
    }
}

impl Link for MockLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        let step = self.shared.script.lock().pop_front();
        match step {
            Some(MockStep::Chunk(mut chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    let rest = chunk.split_off(n);
                    self.shared
                        .script
                        .lock()
                        .push_front(MockStep::Chunk(rest));
                }
                Ok(n)
            }
            Some(MockStep::Error(err)) => Err(err),
            None => {
                if self.shared.closed.load(Ordering::Acquire) {
                    return Err(LinkError::Closed);
                }
                // 模拟真实链路的阻塞读，避免测试忙转
                std::thread::sleep(self.read_timeout);
                Err(LinkError::Timeout)
            }
        }
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), LinkError> {
        self.read_timeout = timeout;
        Ok(())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
