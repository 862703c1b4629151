//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use actlink_sdk::prelude::*;
//! ```

// 协议层
pub use actlink_protocol::{
    CaptureKind, CaptureRequest, ControlMode, Cylinder, GainReport, GainRequest, GainSetting,
    Message, ParsedFrame, SensorReport, TargetCommand, ValidationMode, decode, encode,
};

// 通道层
pub use actlink_serial::{ByteChannel, MockChannel};

// 驱动层
pub use actlink_driver::{FramePoller, LinkConfig, LinkMetrics, TransportMode};

// 控制层
pub use actlink_control::{Clock, ManualClock, MonotonicClock, PidConfig, PidController};

// 错误类型
pub use actlink_control::ConfigError;
pub use actlink_driver::DriverError;
pub use actlink_protocol::{DecodeError, ProtocolError};
pub use actlink_serial::ChannelError;

pub use crate::ActlinkConfig;
