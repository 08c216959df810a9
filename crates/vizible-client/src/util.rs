//! 后台线程收尾辅助

use std::thread::JoinHandle;
use std::time::Duration;

use tracing::error;

/// 限时 join 一个后台线程
///
/// 超时返回 `false` 并放弃该线程（滞留到进程结束），绝不无限期
/// 阻塞调用方。`name` 只用于日志。
pub(crate) fn join_bounded(handle: JoinHandle<()>, timeout: Duration, name: &str) -> bool {
    let (tx, rx) = std::sync::mpsc::channel();
    let watchdog = std::thread::spawn(move || {
        let _ = tx.send(handle.join().is_ok());
    });
    match rx.recv_timeout(timeout) {
        Ok(clean) => {
            let _ = watchdog.join();
            if !clean {
                error!("{} thread panicked", name);
            }
            clean
        }
        Err(_) => {
            error!("{} thread did not stop within {:?}", name, timeout);
            false
        }
    }
}
