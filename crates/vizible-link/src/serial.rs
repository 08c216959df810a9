//! 串口链路后端
//!
//! 蓝牙 SPP 在宿主侧绑定为 rfcomm 设备节点后，与普通串口无异。
//! 固定 8-N-1、无流控；读超时映射为 `LinkError::Timeout`。

use crate::{Link, LinkDeviceError, LinkDeviceErrorKind, LinkError};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::Read;
use std::time::Duration;
use tracing::info;

/// 默认读超时：停机检查的节拍
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(50);

/// 串口字节流链路
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialLink {
    /// 打开串口设备节点
    ///
    /// # 参数
    ///
    /// - `path`: 设备节点（如 `/dev/rfcomm0`）
    /// - `baud_rate`: 波特率（SPP 常用 115200）
    /// - `read_timeout`: 单次读的超时边界
    pub fn open(path: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self, LinkError> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(read_timeout)
            .open()
            .map_err(|e| device_error(path, &e))?;

        info!("Serial link opened: {} @ {} baud", path, baud_rate);

        Ok(Self {
            port,
            path: path.to_string(),
        })
    }
}

impl Link for SerialLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        match self.port.read(buf) {
            // 部分平台把读超时表现为零长度读，统一归入超时边界
            Ok(0) => Err(LinkError::Timeout),
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(LinkError::Timeout),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => Err(LinkError::Timeout),
            Err(e) => Err(LinkError::Io(e)),
        }
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), LinkError> {
        self.port
            .set_timeout(timeout)
            .map_err(|e| device_error(&self.path, &e).into())
    }

    fn describe(&self) -> String {
        format!("serial:{}", self.path)
    }
}

fn device_error(path: &str, err: &serialport::Error) -> LinkDeviceError {
    let kind = match err.kind() {
        serialport::ErrorKind::NoDevice => LinkDeviceErrorKind::NotFound,
        serialport::ErrorKind::InvalidInput => LinkDeviceErrorKind::UnsupportedConfig,
        serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
            LinkDeviceErrorKind::AccessDenied
        }
        _ => LinkDeviceErrorKind::Backend,
    };
    LinkDeviceError::new(kind, format!("{}: {}", path, err))
}
