//! 驱动层错误类型定义

use actlink_protocol::{DecodeError, ProtocolError};
use actlink_serial::ChannelError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 字节通道错误
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// 帧解码错误（帧已丢弃，链路继续）
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// 协议层错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 配置无效
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl DriverError {
    /// 是否可恢复
    ///
    /// 解码错误只影响当前帧；通道错误意味着硬件问题。
    pub fn is_recoverable(&self) -> bool {
        match self {
            DriverError::Decode(_) => true,
            DriverError::Protocol(_) => true,
            DriverError::Channel(e) => !e.is_fatal(),
            DriverError::InvalidConfig(_) => false,
        }
    }

    /// 取出解码错误（如果是）
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            DriverError::Decode(e) => Some(e),
            _ => None,
        }
    }
}
