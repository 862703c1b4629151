//! 帧编解码
//!
//! 64 位帧 = 6 位格式码 + 按位宽表切分的字段 + 低位校验。
//! 编码和解码都按位宽表循环，从 bit 58 开始向下累计偏移，
//! 两侧偏移完全对称，保证往返一致。

use crate::crc::{CRC_MASK, crc_matches, frame_crc, stored_crc};
use crate::layout::{FORMAT_SHIFT, FieldLayout, MAX_FIELDS, PAYLOAD_BITS, field_mask};
use crate::{DecodeError, ProtocolError};

/// 旧版校验模式下必须为 0 的保留位（低 5 位）
pub const RESERVED_MASK: u64 = 0x1F;

/// 解码校验模式
///
/// 同一部署中只启用一种模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ValidationMode {
    /// 低 6 位为 CRC-6（默认）
    #[default]
    Crc6,
    /// 旧版：低 5 位保留且必须为 0，无 CRC
    ReservedBits,
}

/// 解析后的帧
///
/// 按值返回，调用方自行持有；未被布局使用的字段为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedFrame {
    /// 格式码（0-63）
    pub format: u8,
    /// field1..field8
    pub fields: [u16; MAX_FIELDS],
}

impl ParsedFrame {
    /// 第 `n` 个字段（1 起始，与协议文档编号一致）
    ///
    /// `n` 超出 1..=8 时返回 0。
    pub fn field(&self, n: usize) -> u16 {
        n.checked_sub(1)
            .and_then(|i| self.fields.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// 该帧的格式是否在位宽表中
    pub fn is_known_format(&self) -> bool {
        FieldLayout::for_format(self.format).is_known()
    }

    /// 重新编码为带 CRC 的 64 位帧
    pub fn to_word(&self) -> u64 {
        encode_fields(self.format, self.fields)
    }
}

/// 按布局把字段打包到高 58 位（不含校验）
fn pack(format: u8, values: &[u16]) -> u64 {
    let layout = FieldLayout::for_format(format);
    let mut word = u64::from(format & 0x3F) << FORMAT_SHIFT;
    let mut offset = PAYLOAD_BITS;

    for (index, &width) in layout.widths().iter().enumerate() {
        if width == 0 {
            continue;
        }
        offset -= u32::from(width);
        let value = values.get(index).copied().unwrap_or(0);
        let masked = u64::from(value) & field_mask(width);
        if masked != u64::from(value) {
            tracing::debug!(
                format,
                field = index + 1,
                width,
                value,
                kept = masked,
                "field value truncated to its width"
            );
        }
        word |= masked << offset;
    }

    word
}

/// 编码一帧（CRC-6 模式）
///
/// - 未知格式只写入格式码（加 CRC）
/// - 超出位宽的值静默截断为 `value mod 2^width`
/// - 多于布局字段数的值被忽略，缺少的值视为 0
///
/// 永不 panic。需要范围检查时使用 [`encode_checked`]。
///
/// # 示例
///
/// ```
/// use actlink_protocol::codec::{decode, encode};
///
/// let word = encode(10, &[200, 5, 37]);
/// assert_eq!(word, 0x2B20_1494_0000_0036);
///
/// let frame = decode(word).unwrap();
/// assert_eq!(frame.fields[..3], [200, 5, 37]);
/// ```
pub fn encode(format: u8, values: &[u16]) -> u64 {
    let word = pack(format, values);
    word | u64::from(frame_crc(word))
}

/// 编码一帧（固定 8 字段形式）
pub fn encode_fields(format: u8, fields: [u16; MAX_FIELDS]) -> u64 {
    encode(format, &fields)
}

/// 编码一帧，拒绝会被截断的输入
pub fn encode_checked(format: u8, values: &[u16]) -> Result<u64, ProtocolError> {
    let layout = FieldLayout::for_format(format);
    let count = layout.field_count();
    if values.len() > count {
        return Err(ProtocolError::TooManyFields {
            format,
            expected: count,
            actual: values.len(),
        });
    }
    for (index, &value) in values.iter().enumerate() {
        let width = layout.width(index);
        if u64::from(value) & !field_mask(width) != 0 {
            return Err(ProtocolError::FieldOverflow {
                index: index + 1,
                width,
                value,
            });
        }
    }
    Ok(encode(format, values))
}

/// 编码一帧（旧版模式：低位保留为 0，不附加 CRC）
pub fn encode_legacy(format: u8, values: &[u16]) -> u64 {
    pack(format, values)
}

/// 从帧中提取格式码
#[inline]
pub fn format_of(word: u64) -> u8 {
    ((word >> FORMAT_SHIFT) & 0x3F) as u8
}

fn unpack(word: u64) -> ParsedFrame {
    let format = format_of(word);
    let layout = FieldLayout::for_format(format);
    let mut fields = [0u16; MAX_FIELDS];
    let mut offset = PAYLOAD_BITS;

    for (slot, &width) in fields.iter_mut().zip(layout.widths()) {
        if width == 0 {
            continue;
        }
        offset -= u32::from(width);
        *slot = ((word >> offset) & field_mask(width)) as u16;
    }

    ParsedFrame { format, fields }
}

/// 解码一帧（CRC-6 模式）
///
/// 未知格式解码为全 0 字段，不视为错误。
pub fn decode(word: u64) -> Result<ParsedFrame, DecodeError> {
    decode_with(word, ValidationMode::Crc6)
}

/// 按指定校验模式解码一帧
pub fn decode_with(word: u64, mode: ValidationMode) -> Result<ParsedFrame, DecodeError> {
    let frame = unpack(word);

    match mode {
        ValidationMode::Crc6 => {
            if !crc_matches(word) {
                return Err(DecodeError::ChecksumMismatch {
                    expected: frame_crc(word),
                    actual: stored_crc(word),
                });
            }
        },
        ValidationMode::ReservedBits => {
            let bits = (word & RESERVED_MASK) as u8;
            if bits != 0 {
                return Err(DecodeError::ReservedBitsSet { bits });
            }
        },
    }

    Ok(frame)
}

/// 按指定校验模式编码一帧
pub fn encode_with(format: u8, values: &[u16], mode: ValidationMode) -> u64 {
    match mode {
        ValidationMode::Crc6 => encode(format, values),
        ValidationMode::ReservedBits => encode_legacy(format, values),
    }
}

/// 帧的 8 字节线上表示（MSB 优先）
#[inline]
pub fn to_wire(word: u64) -> [u8; 8] {
    word.to_be_bytes()
}

/// 从 8 字节线上表示还原帧
#[inline]
pub fn from_wire(bytes: [u8; 8]) -> u64 {
    u64::from_be_bytes(bytes)
}

/// 64 位二进制字符串（MSB 优先），用于调试输出
pub fn to_bit_string(word: u64) -> String {
    format!("{word:064b}")
}

/// 清除 CRC 字段
#[inline]
pub fn strip_crc(word: u64) -> u64 {
    word & !CRC_MASK
}
