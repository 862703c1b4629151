//! # actlink Serial Channel Layer
//!
//! 字节通道抽象层：协议层只看到"可读字节数 / 读一个字节 / 写一个字节"，
//! 不关心底层是硬件串口还是内存模拟。
//!
//! 通道通过依赖注入传给上层（`FramePoller<C: ByteChannel>`），
//! 不存在全局单例。

use thiserror::Error;

pub mod mock;

#[cfg(feature = "serial-backend")]
pub mod serial;

pub use mock::MockChannel;

#[cfg(feature = "serial-backend")]
pub use serial::{SerialPortChannel, list_ports};

/// 默认波特率
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// 通道层统一错误类型
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serial port error: {0}")]
    Serial(String),
    /// 在 `available() == 0` 时调用了 `read_byte()`
    #[error("No byte available")]
    Empty,
    #[error("Channel not started")]
    NotStarted,
}

impl ChannelError {
    /// 是否为硬件/设备层面的致命错误
    ///
    /// `Empty` 只是调用顺序问题，不影响链路。
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ChannelError::Empty)
    }
}

/// 双工字节通道
///
/// 所有方法都不阻塞：没有数据时 `available()` 返回 0，
/// 由调用方在下一次轮询时重试。
pub trait ByteChannel {
    /// 以指定波特率启动通道
    fn begin(&mut self, _baud_rate: u32) -> Result<(), ChannelError> {
        Ok(())
    }

    /// 当前可读字节数
    fn available(&mut self) -> Result<usize, ChannelError>;

    /// 读取一个字节（仅在 `available() > 0` 时有效）
    fn read_byte(&mut self) -> Result<u8, ChannelError>;

    /// 写入一个字节
    fn write_byte(&mut self, byte: u8) -> Result<(), ChannelError>;

    /// 写入多个字节
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        for &b in bytes {
            self.write_byte(b)?;
        }
        Ok(())
    }

    /// 刷新发送缓冲
    fn flush(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }

    /// 丢弃所有已缓冲的接收字节，返回丢弃数量
    fn clear_input(&mut self) -> Result<usize, ChannelError> {
        let mut dropped = 0;
        while self.available()? > 0 {
            self.read_byte()?;
            dropped += 1;
        }
        Ok(dropped)
    }
}

impl<C: ByteChannel + ?Sized> ByteChannel for &mut C {
    fn begin(&mut self, baud_rate: u32) -> Result<(), ChannelError> {
        (**self).begin(baud_rate)
    }

    fn available(&mut self) -> Result<usize, ChannelError> {
        (**self).available()
    }

    fn read_byte(&mut self) -> Result<u8, ChannelError> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), ChannelError> {
        (**self).write_byte(byte)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> Result<(), ChannelError> {
        (**self).flush()
    }

    fn clear_input(&mut self) -> Result<usize, ChannelError> {
        (**self).clear_input()
    }
}

impl<C: ByteChannel + ?Sized> ByteChannel for Box<C> {
    fn begin(&mut self, baud_rate: u32) -> Result<(), ChannelError> {
        (**self).begin(baud_rate)
    }

    fn available(&mut self) -> Result<usize, ChannelError> {
        (**self).available()
    }

    fn read_byte(&mut self) -> Result<u8, ChannelError> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), ChannelError> {
        (**self).write_byte(byte)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> Result<(), ChannelError> {
        (**self).flush()
    }

    fn clear_input(&mut self) -> Result<usize, ChannelError> {
        (**self).clear_input()
    }
}
