//! # actlink Protocol
//!
//! 执行器/控制器串口链路的帧协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `crc`: CRC-6 校验引擎
//! - `layout`: 格式码 → 字段位宽表
//! - `codec`: 64 位帧的打包/解包
//! - `messages`: 已知格式的强类型消息
//! - `text`: base64 文本行传输
//!
//! ## 帧结构
//!
//! ```text
//!  63      58 57                                   6 5      0
//! +----------+--------------------------------------+--------+
//! |  format  |  field1 | field2 | ... | field8       | CRC-6  |
//! +----------+--------------------------------------+--------+
//! ```
//!
//! 所有字段按 MSB 优先（大端）排列，线上传输同样是高字节在前。

pub mod codec;
pub mod crc;
pub mod layout;
pub mod messages;
pub mod text;

// 重新导出常用类型
pub use codec::*;
pub use crc::*;
pub use layout::*;
pub use messages::*;

use thiserror::Error;

/// 帧解码错误
///
/// 所有解码失败都是可恢复的：调用方丢弃该帧，等待下一帧。
/// 不会出现"部分应用"的帧。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// CRC-6 校验失败
    #[error("Checksum mismatch: computed 0x{expected:02X}, stored 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// 旧版校验模式：保留位不为 0
    #[error("Reserved bits set: 0x{bits:02X}")]
    ReservedBitsSet { bits: u8 },

    /// 文本行解码后长度不是 8 字节
    #[error("Malformed text frame: decoded length {len}, expected 8")]
    MalformedTextFrame { len: usize },

    /// 重同步预算耗尽，仍未找到有效帧
    #[error("Resync exhausted after {attempts} attempts")]
    ResyncExhausted { attempts: u32 },
}

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Field {index} overflows {width} bits: {value}")]
    FieldOverflow { index: usize, width: u8, value: u16 },

    #[error("Too many fields for format {format}: expected at most {expected}, got {actual}")]
    TooManyFields {
        format: u8,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown format: {0}")]
    UnknownFormat(u8),

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: u16 },
}
