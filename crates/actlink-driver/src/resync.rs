//! CRC-6 滑动窗口重同步
//!
//! 原始字节流没有帧边界。接收端读 8 字节作为候选帧，CRC 不通过时
//! 左移 8 位、从通道补入一个新字节，再次校验。每个周期最多校验
//! `budget` 次；耗尽或通道暂时无数据时清空输入缓冲，下一周期从
//! 新到达的字节重新开始。

use crate::error::DriverError;
use crate::metrics::LinkMetrics;
use actlink_protocol::{DecodeError, ParsedFrame, crc_matches, decode, from_wire};
use actlink_serial::ByteChannel;
use tracing::{trace, warn};

/// 默认每周期 CRC 校验次数（含第一次对齐校验）
pub const DEFAULT_RESYNC_BUDGET: u32 = 32;

/// 候选窗口长度（字节）
pub const FRAME_BYTES: usize = 8;

/// 重同步器
///
/// 无内部缓冲：候选窗口只在单次 `poll` 内存在，失败后剩余字节全部丢弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resynchronizer {
    budget: u32,
}

impl Default for Resynchronizer {
    fn default() -> Self {
        Self::new(DEFAULT_RESYNC_BUDGET)
    }
}

impl Resynchronizer {
    /// 创建重同步器（`budget` 为 0 时按 1 处理）
    pub fn new(budget: u32) -> Self {
        Self {
            budget: budget.max(1),
        }
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// 尝试从通道中取出一帧
    ///
    /// # 返回
    ///
    /// - `Ok(Some(frame))`：找到 CRC 正确的窗口，窗口之后的字节留在通道中
    /// - `Ok(None)`：可读字节不足 8 个，未消耗任何数据
    /// - `Err(Decode(ResyncExhausted))`：本周期失败，输入缓冲已清空
    pub fn poll<C: ByteChannel>(
        &self,
        channel: &mut C,
        metrics: &LinkMetrics,
    ) -> Result<Option<ParsedFrame>, DriverError> {
        match self.poll_word(channel, metrics)? {
            Some(word) => Ok(Some(decode(word)?)),
            None => Ok(None),
        }
    }

    /// 同 [`poll`](Self::poll)，返回 CRC 校验通过的原始 64 位帧
    pub fn poll_word<C: ByteChannel>(
        &self,
        channel: &mut C,
        metrics: &LinkMetrics,
    ) -> Result<Option<u64>, DriverError> {
        if channel.available()? < FRAME_BYTES {
            return Ok(None);
        }

        let mut window = [0u8; FRAME_BYTES];
        for byte in window.iter_mut() {
            *byte = channel.read_byte()?;
        }
        let mut word = from_wire(window);

        let mut attempts = 0u32;
        let mut shifts = 0u64;
        loop {
            attempts += 1;
            if crc_matches(word) {
                if shifts > 0 {
                    trace!(shifts, "resynchronized");
                    LinkMetrics::add(&metrics.resync_shifts, shifts);
                }
                return Ok(Some(word));
            }
            if attempts >= self.budget || channel.available()? == 0 {
                break;
            }
            word = (word << 8) | u64::from(channel.read_byte()?);
            shifts += 1;
        }

        LinkMetrics::add(&metrics.resync_shifts, shifts);
        let flushed = channel.clear_input()?;
        LinkMetrics::add(&metrics.bytes_flushed, flushed as u64);
        LinkMetrics::add(&metrics.resync_exhausted, 1);
        warn!(attempts, flushed, "resync exhausted, input flushed");

        Err(DecodeError::ResyncExhausted { attempts }.into())
    }
}
