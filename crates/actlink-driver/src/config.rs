//! 链路配置

use crate::error::DriverError;
use crate::resync::DEFAULT_RESYNC_BUDGET;
use actlink_protocol::ValidationMode;
use actlink_serial::DEFAULT_BAUD_RATE;
use serde::{Deserialize, Serialize};

/// 传输方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// 原始字节流，CRC-6 滑动窗口重同步（默认）
    #[default]
    RawResync,
    /// 原始字节流，每次对齐读取 8 字节，失败时清空缓冲
    RawAligned,
    /// base64 文本行
    Text,
}

/// 链路配置
///
/// # Example
///
/// ```
/// use actlink_driver::{LinkConfig, TransportMode};
///
/// // 默认：115200 波特，原始字节流 + 重同步，32 次尝试
/// let config = LinkConfig::default();
/// assert_eq!(config.transport, TransportMode::RawResync);
///
/// let config = LinkConfig {
///     transport: TransportMode::Text,
///     ..LinkConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// 串口波特率
    pub baud_rate: u32,
    /// 传输方式
    pub transport: TransportMode,
    /// 帧校验模式
    pub validation: ValidationMode,
    /// 每个重同步周期最多的 CRC 校验次数
    pub resync_budget: u32,
    /// 文本模式下单行最大字节数（超过则丢弃该行）
    pub max_line_len: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            transport: TransportMode::RawResync,
            validation: ValidationMode::Crc6,
            resync_budget: DEFAULT_RESYNC_BUDGET,
            max_line_len: 64,
        }
    }
}

impl LinkConfig {
    /// 检查配置组合是否有效
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.baud_rate == 0 {
            return Err(DriverError::InvalidConfig("baud_rate must be > 0".to_string()));
        }
        if self.resync_budget == 0 {
            return Err(DriverError::InvalidConfig(
                "resync_budget must be > 0".to_string(),
            ));
        }
        if self.transport == TransportMode::Text && self.max_line_len < 12 {
            return Err(DriverError::InvalidConfig(format!(
                "max_line_len {} cannot hold a 12-character frame",
                self.max_line_len
            )));
        }
        // 没有 CRC 就无法判断对齐位置
        if self.transport == TransportMode::RawResync
            && self.validation == ValidationMode::ReservedBits
        {
            return Err(DriverError::InvalidConfig(
                "raw_resync transport requires crc6 validation".to_string(),
            ));
        }
        Ok(())
    }
}
