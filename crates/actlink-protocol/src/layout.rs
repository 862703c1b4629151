//! 字段位宽表
//!
//! 格式码（6 位）→ 最多 8 个字段的位宽。编码和解码共用同一张表。

/// 格式码位数
pub const FORMAT_BITS: u32 = 6;
/// 格式码在帧中的偏移（bits [63:58]）
pub const FORMAT_SHIFT: u32 = 58;
/// 格式码之后的载荷位数
pub const PAYLOAD_BITS: u32 = 58;
/// CRC 位数（占用载荷的低 6 位）
pub const CRC_BITS: u32 = 6;
/// 每帧最多字段数
pub const MAX_FIELDS: usize = 8;
/// 单个字段最大位宽
pub const MAX_FIELD_BITS: u8 = 16;
/// 格式码数量（0-63）
pub const FORMAT_COUNT: usize = 64;

/// 目标指令：4 个模式位 + 4 个 12 位数值
pub const FORMAT_TARGET_COMMAND: u8 = 63;
/// 增益查询
pub const FORMAT_GAIN_REQUEST: u8 = 1;
/// 采集请求
pub const FORMAT_CAPTURE_REQUEST: u8 = 50;
/// 增益设置（气缸 0-3）
pub const FORMATS_GAIN_SETTING: [u8; 4] = [10, 20, 30, 40];
/// 增益回报（气缸 0-3）
pub const FORMATS_GAIN_REPORT: [u8; 4] = [11, 21, 31, 41];
/// 传感器回报（气缸 0-3）
pub const FORMATS_SENSOR_REPORT: [u8; 4] = [5, 6, 7, 8];

const W_TARGET: [u8; MAX_FIELDS] = [1, 1, 1, 1, 12, 12, 12, 12];
const W_GAIN_REQUEST: [u8; MAX_FIELDS] = [1, 1, 1, 1, 1, 1, 1, 1];
const W_CAPTURE: [u8; MAX_FIELDS] = [1, 1, 1, 1, 1, 1, 0, 0];
const W_GAIN_SETTING: [u8; MAX_FIELDS] = [8, 8, 8, 0, 0, 0, 0, 0];
const W_GAIN_REPORT: [u8; MAX_FIELDS] = [8, 8, 8, 12, 12, 0, 0, 0];
const W_SENSOR: [u8; MAX_FIELDS] = [12, 12, 12, 0, 0, 0, 0, 0];

/// 格式码 → 位宽的数据表条目
const ENTRIES: &[(&[u8], [u8; MAX_FIELDS])] = &[
    (&[FORMAT_TARGET_COMMAND], W_TARGET),
    (&[FORMAT_GAIN_REQUEST], W_GAIN_REQUEST),
    (&[FORMAT_CAPTURE_REQUEST], W_CAPTURE),
    (&FORMATS_GAIN_SETTING, W_GAIN_SETTING),
    (&FORMATS_GAIN_REPORT, W_GAIN_REPORT),
    (&FORMATS_SENSOR_REPORT, W_SENSOR),
];

const fn build_table() -> [FieldLayout; FORMAT_COUNT] {
    let mut table = [FieldLayout::UNKNOWN; FORMAT_COUNT];
    let mut e = 0;
    while e < ENTRIES.len() {
        let (formats, widths) = ENTRIES[e];
        let mut f = 0;
        while f < formats.len() {
            table[formats[f] as usize] = FieldLayout {
                widths,
                known: true,
            };
            f += 1;
        }
        e += 1;
    }
    table
}

static LAYOUTS: [FieldLayout; FORMAT_COUNT] = build_table();

/// 单个格式的字段布局
///
/// 位宽为 0 的字段不占用任何位，解码结果恒为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    widths: [u8; MAX_FIELDS],
    known: bool,
}

impl FieldLayout {
    /// 未知格式的哨兵布局（全 0）
    pub const UNKNOWN: FieldLayout = FieldLayout {
        widths: [0; MAX_FIELDS],
        known: false,
    };

    /// 查询格式码对应的布局
    ///
    /// 格式码只取低 6 位；未知格式返回 [`FieldLayout::UNKNOWN`]。
    pub fn for_format(format: u8) -> FieldLayout {
        LAYOUTS[(format & 0x3F) as usize]
    }

    /// 各字段位宽（声明顺序）
    pub fn widths(&self) -> &[u8; MAX_FIELDS] {
        &self.widths
    }

    /// 第 `index` 个字段的位宽（越界返回 0）
    pub fn width(&self, index: usize) -> u8 {
        self.widths.get(index).copied().unwrap_or(0)
    }

    /// 所有字段位宽之和
    pub fn total_bits(&self) -> u32 {
        self.widths.iter().map(|&w| u32::from(w)).sum()
    }

    /// 实际使用的字段数（到最后一个非零位宽为止）
    pub fn field_count(&self) -> usize {
        self.widths.iter().rposition(|&w| w > 0).map_or(0, |i| i + 1)
    }

    /// 是否为已识别的格式
    pub fn is_known(&self) -> bool {
        self.known
    }
}

/// 字段掩码：`width` 位全 1
#[inline]
pub(crate) fn field_mask(width: u8) -> u64 {
    if width == 0 { 0 } else { (1u64 << width) - 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_layouts() {
        assert_eq!(
            FieldLayout::for_format(63).widths(),
            &[1, 1, 1, 1, 12, 12, 12, 12]
        );
        assert_eq!(FieldLayout::for_format(1).widths(), &[1; 8]);
        assert_eq!(
            FieldLayout::for_format(50).widths(),
            &[1, 1, 1, 1, 1, 1, 0, 0]
        );
        for f in [10, 20, 30, 40] {
            assert_eq!(
                FieldLayout::for_format(f).widths(),
                &[8, 8, 8, 0, 0, 0, 0, 0]
            );
        }
        for f in [11, 21, 31, 41] {
            assert_eq!(
                FieldLayout::for_format(f).widths(),
                &[8, 8, 8, 12, 12, 0, 0, 0]
            );
        }
        for f in [5, 6, 7, 8] {
            assert_eq!(
                FieldLayout::for_format(f).widths(),
                &[12, 12, 12, 0, 0, 0, 0, 0]
            );
        }
    }

    #[test]
    fn test_unknown_layout() {
        for f in [0, 2, 9, 42, 62] {
            let layout = FieldLayout::for_format(f);
            assert!(!layout.is_known());
            assert_eq!(layout.total_bits(), 0);
            assert_eq!(layout.field_count(), 0);
        }
    }

    #[test]
    fn test_layouts_leave_room_for_crc() {
        for f in 0..FORMAT_COUNT as u8 {
            let layout = FieldLayout::for_format(f);
            assert!(layout.total_bits() <= PAYLOAD_BITS - CRC_BITS, "format {f}");
            assert!(layout.widths().iter().all(|&w| w <= MAX_FIELD_BITS));
        }
    }

    #[test]
    fn test_field_count() {
        assert_eq!(FieldLayout::for_format(63).field_count(), 8);
        assert_eq!(FieldLayout::for_format(50).field_count(), 6);
        assert_eq!(FieldLayout::for_format(11).field_count(), 5);
        assert_eq!(FieldLayout::for_format(5).field_count(), 3);
    }

    #[test]
    fn test_format_is_masked() {
        assert_eq!(FieldLayout::for_format(0x40 | 10), FieldLayout::for_format(10));
    }

    #[test]
    fn test_field_mask() {
        assert_eq!(field_mask(0), 0);
        assert_eq!(field_mask(1), 1);
        assert_eq!(field_mask(12), 0xFFF);
        assert_eq!(field_mask(16), 0xFFFF);
    }
}
