//! TCP 链路后端
//!
//! 面向模拟器与台架：传感设备（或其模拟器）监听一个 TCP 端口，
//! 行协议与串口完全一致。读超时由 `set_read_timeout` 驱动。

use crate::{Link, LinkDeviceError, LinkDeviceErrorKind, LinkError};
use std::io::Read;
use std::net::TcpStream;
use std::time::Duration;
use tracing::info;

/// TCP 字节流链路
#[derive(Debug)]
pub struct TcpLink {
    stream: TcpStream,
    peer: String,
}

impl TcpLink {
    /// 连接到 `addr`（`host:port`）
    pub fn connect(addr: &str, read_timeout: Duration) -> Result<Self, LinkError> {
        let stream = TcpStream::connect(addr).map_err(|e| {
            LinkDeviceError::new(
                LinkDeviceErrorKind::Backend,
                format!("connect {}: {}", addr, e),
            )
        })?;
        stream.set_read_timeout(Some(read_timeout))?;
        let _ = stream.set_nodelay(true);

        info!("TCP link connected: {}", addr);

        Ok(Self {
            stream,
            peer: addr.to_string(),
        })
    }

    /// 包装一条已建立的连接（监听端测试用）
    pub fn from_stream(stream: TcpStream, read_timeout: Duration) -> Result<Self, LinkError> {
        stream.set_read_timeout(Some(read_timeout))?;
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        Ok(Self { stream, peer })
    }
}

impl Link for TcpLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        match self.stream.read(buf) {
            Ok(0) => Err(LinkError::Closed),
            Ok(n) => Ok(n),
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock
                        | std::io::ErrorKind::TimedOut
                        | std::io::ErrorKind::Interrupted
                ) =>
            {
                Err(LinkError::Timeout)
            }
            Err(e) => Err(LinkError::Io(e)),
        }
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), LinkError> {
        self.stream.set_read_timeout(Some(timeout))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("tcp:{}", self.peer)
    }
}
