//! CRC-6 校验引擎
//!
//! 逐位多项式除法，MSB 优先处理整个 64 位字。
//! 编码端与解码端（含重同步）使用完全相同的计算。

/// CRC-6 生成多项式（`0b111111`）
pub const CRC6_POLY: u8 = 0b11_1111;

/// 帧中 CRC 字段的掩码（低 6 位）
pub const CRC_MASK: u64 = 0x3F;

/// 计算 64 位字的 CRC-6
///
/// 维护一个 6 位移位寄存器。每个输入位与寄存器第 5 位异或，
/// 结果为 1 时在左移后异或多项式。
///
/// 纯函数，无副作用，不会失败。
///
/// # 示例
///
/// ```
/// use actlink_protocol::crc::{crc6, CRC6_POLY};
///
/// assert_eq!(crc6(0, CRC6_POLY), 0);
/// assert_eq!(crc6(0x2B20_1494_0000_0000, CRC6_POLY), 0x36);
/// ```
pub fn crc6(word: u64, polynomial: u8) -> u8 {
    let poly = polynomial & 0x3F;
    let mut reg: u8 = 0;

    for i in (0..64).rev() {
        let bit = ((word >> i) & 1) as u8;
        let feedback = bit ^ ((reg >> 5) & 1);
        reg = (reg << 1) & 0x3F;
        if feedback != 0 {
            reg ^= poly;
        }
    }

    reg
}

/// 计算帧的 CRC（CRC 字段清零后计算高 58 位）
#[inline]
pub fn frame_crc(word: u64) -> u8 {
    crc6(word & !CRC_MASK, CRC6_POLY)
}

/// 取出帧中存储的 CRC（低 6 位）
#[inline]
pub fn stored_crc(word: u64) -> u8 {
    (word & CRC_MASK) as u8
}

/// 帧的 CRC 是否与存储值一致
#[inline]
pub fn crc_matches(word: u64) -> bool {
    frame_crc(word) == stored_crc(word)
}
