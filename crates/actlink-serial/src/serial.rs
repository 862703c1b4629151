//! 硬件串口通道（基于 `serialport` crate）

use crate::{ByteChannel, ChannelError};
use serialport::{ClearBuffer, SerialPort};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// 单字节读取超时
///
/// 只在 `available() > 0` 之后读取，正常情况下不会触发。
const READ_TIMEOUT: Duration = Duration::from_millis(10);

fn serial_error(e: serialport::Error) -> ChannelError {
    ChannelError::Serial(e.to_string())
}

/// 硬件串口通道
pub struct SerialPortChannel {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialPortChannel {
    /// 打开串口
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use actlink_serial::SerialPortChannel;
    ///
    /// let channel = SerialPortChannel::open("/dev/ttyUSB0", 115_200).unwrap();
    /// ```
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, ChannelError> {
        let port = serialport::new(path, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(serial_error)?;
        info!(path, baud_rate, "serial port opened");
        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    /// 串口路径
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Debug for SerialPortChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortChannel").field("path", &self.path).finish()
    }
}

impl ByteChannel for SerialPortChannel {
    fn begin(&mut self, baud_rate: u32) -> Result<(), ChannelError> {
        self.port.set_baud_rate(baud_rate).map_err(serial_error)?;
        debug!(path = %self.path, baud_rate, "baud rate set");
        Ok(())
    }

    fn available(&mut self) -> Result<usize, ChannelError> {
        let n = self.port.bytes_to_read().map_err(serial_error)?;
        Ok(n as usize)
    }

    fn read_byte(&mut self) -> Result<u8, ChannelError> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(1) => Ok(buf[0]),
            Ok(_) => Err(ChannelError::Empty),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(ChannelError::Empty),
            Err(e) => Err(e.into()),
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), ChannelError> {
        self.port.write_all(&[byte])?;
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        self.port.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ChannelError> {
        self.port.flush()?;
        Ok(())
    }

    fn clear_input(&mut self) -> Result<usize, ChannelError> {
        let pending = self.available()?;
        self.port.clear(ClearBuffer::Input).map_err(serial_error)?;
        Ok(pending)
    }
}

/// 列出系统中的串口
pub fn list_ports() -> Result<Vec<String>, ChannelError> {
    let ports = serialport::available_ports().map_err(serial_error)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
