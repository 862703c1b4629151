//! actlink SDK - 串口执行器链路与位置环控制
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **通道层** (`serial`): 字节通道抽象，硬件串口与内存模拟
//! - **协议层** (`protocol`): 64 位帧编解码，CRC-6 校验
//! - **驱动层** (`driver`): 轮询式收发，字节流重同步
//! - **控制层** (`control`): 窗口式增量 PID
//!
//! # 快速开始
//!
//! ```rust
//! use actlink_sdk::prelude::*;
//!
//! let word = encode(10, &[200, 5, 37]);
//! let mut link = FramePoller::new(MockChannel::with_rx(&word.to_be_bytes()), LinkConfig::default())?;
//! link.begin()?;
//! assert!(link.poll_message()?.is_some());
//! # Ok::<(), DriverError>(())
//! ```

pub mod config;
pub mod logging;
pub mod prelude;

pub use actlink_control as control;
pub use actlink_driver as driver;
pub use actlink_protocol as protocol;
pub use actlink_serial as serial;

pub use config::ActlinkConfig;
pub use logging::{init_logger, init_logger_with};

pub use actlink_control::{ConfigError, PidController};
pub use actlink_driver::{DriverError, FramePoller, LinkConfig};
pub use actlink_protocol::{DecodeError, Message, ProtocolError};
pub use actlink_serial::{ByteChannel, ChannelError};

/// 打开硬件串口并启动链路
#[cfg(feature = "serial-backend")]
pub fn open_serial(
    path: &str,
    config: LinkConfig,
) -> Result<FramePoller<actlink_serial::SerialPortChannel>, DriverError> {
    let channel = actlink_serial::SerialPortChannel::open(path, config.baud_rate)?;
    let mut link = FramePoller::new(channel, config)?;
    link.begin()?;
    Ok(link)
}
