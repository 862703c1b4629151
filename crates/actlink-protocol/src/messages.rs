//! 强类型消息
//!
//! 已知格式的应用层视图。只负责 `ParsedFrame` ⇄ 结构体的转换，
//! 不决定发送什么内容。
//!
//! | 格式 | 方向 | 消息 |
//! |------|------|------|
//! | 63 | 主机 → 执行器 | [`TargetCommand`] |
//! | 1 | 主机 → 执行器 | [`GainRequest`] |
//! | 50 | 主机 → 执行器 | [`CaptureRequest`] |
//! | 10/20/30/40 | 主机 → 执行器 | [`GainSetting`] |
//! | 11/21/31/41 | 执行器 → 主机 | [`GainReport`] |
//! | 5/6/7/8 | 执行器 → 主机 | [`SensorReport`] |

use crate::ProtocolError;
use crate::codec::{ParsedFrame, decode, encode};
use crate::layout::{
    FORMAT_CAPTURE_REQUEST, FORMAT_GAIN_REQUEST, FORMAT_TARGET_COMMAND, FORMATS_GAIN_REPORT,
    FORMATS_GAIN_SETTING, FORMATS_SENSOR_REPORT,
};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 气缸编号（0-3）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Cylinder {
    C0 = 0,
    C1 = 1,
    C2 = 2,
    C3 = 3,
}

impl Cylinder {
    /// 全部气缸
    pub const ALL: [Cylinder; 4] = [Cylinder::C0, Cylinder::C1, Cylinder::C2, Cylinder::C3];

    /// 数组下标
    pub fn index(self) -> usize {
        u8::from(self) as usize
    }

    fn from_index(index: usize) -> Option<Cylinder> {
        u8::try_from(index).ok().and_then(|i| Cylinder::try_from(i).ok())
    }
}

/// 单个气缸的控制模式（格式 63 的模式位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlMode {
    /// 位置目标（闭环）
    #[default]
    Position,
    /// 直接阀门指令（开环）
    Command,
}

impl ControlMode {
    fn bit(self) -> u16 {
        match self {
            ControlMode::Position => 0,
            ControlMode::Command => 1,
        }
    }

    fn from_bit(bit: u16) -> ControlMode {
        if bit == 0 {
            ControlMode::Position
        } else {
            ControlMode::Command
        }
    }
}

/// 采集位置（格式 50 的 2 位字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CaptureKind {
    /// 零点偏移
    Offset = 0b01,
    /// 行程
    Stroke = 0b10,
}

/// 目标指令（格式 63）
///
/// 4 个 1 位模式字段 + 4 个 12 位数值字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetCommand {
    pub modes: [ControlMode; 4],
    pub values: [u16; 4],
}

impl TargetCommand {
    /// 全部气缸使用同一模式
    pub fn uniform(mode: ControlMode, values: [u16; 4]) -> Self {
        Self {
            modes: [mode; 4],
            values,
        }
    }

    pub fn to_frame(&self) -> u64 {
        let mut fields = [0u16; 8];
        for i in 0..4 {
            fields[i] = self.modes[i].bit();
            fields[4 + i] = self.values[i];
        }
        encode(FORMAT_TARGET_COMMAND, &fields)
    }

    fn from_parsed(frame: &ParsedFrame) -> Self {
        let mut cmd = TargetCommand::default();
        for i in 0..4 {
            cmd.modes[i] = ControlMode::from_bit(frame.fields[i]);
            cmd.values[i] = frame.fields[4 + i];
        }
        cmd
    }
}

/// 增益查询（格式 1）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainRequest {
    pub cylinder: Cylinder,
}

impl GainRequest {
    pub fn to_frame(&self) -> u64 {
        encode(FORMAT_GAIN_REQUEST, &one_hot(self.cylinder))
    }
}

/// 采集请求（格式 50）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureRequest {
    pub cylinder: Cylinder,
    pub kind: CaptureKind,
}

impl CaptureRequest {
    pub fn to_frame(&self) -> u64 {
        let select = one_hot(self.cylinder);
        let kind = u8::from(self.kind);
        let fields = [
            select[0],
            select[1],
            select[2],
            select[3],
            u16::from((kind >> 1) & 1),
            u16::from(kind & 1),
        ];
        encode(FORMAT_CAPTURE_REQUEST, &fields)
    }
}

/// 增益设置（格式 10/20/30/40）
///
/// `p`/`i`/`d` 为 0-255 的增益旋钮值，执行器端按平方缩放。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainSetting {
    pub cylinder: Cylinder,
    pub p: u8,
    pub i: u8,
    pub d: u8,
}

impl GainSetting {
    pub fn to_frame(&self) -> u64 {
        encode(
            FORMATS_GAIN_SETTING[self.cylinder.index()],
            &[u16::from(self.p), u16::from(self.i), u16::from(self.d)],
        )
    }
}

/// 增益回报（格式 11/21/31/41）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainReport {
    pub cylinder: Cylinder,
    pub p: u8,
    pub i: u8,
    pub d: u8,
    /// 采集到的行程最大值（12 位）
    pub capture_max: u16,
    /// 采集到的行程最小值（12 位）
    pub capture_min: u16,
}

impl GainReport {
    pub fn to_frame(&self) -> u64 {
        encode(
            FORMATS_GAIN_REPORT[self.cylinder.index()],
            &[
                u16::from(self.p),
                u16::from(self.i),
                u16::from(self.d),
                self.capture_max,
                self.capture_min,
            ],
        )
    }
}

/// 传感器回报（格式 5/6/7/8）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReport {
    pub cylinder: Cylinder,
    /// 当前位置（12 位 ADC）
    pub position: u16,
    /// 电压（12 位 ADC）
    pub voltage: u16,
    /// 当前阀门指令
    pub command: u16,
}

impl SensorReport {
    pub fn to_frame(&self) -> u64 {
        encode(
            FORMATS_SENSOR_REPORT[self.cylinder.index()],
            &[self.position, self.voltage, self.command],
        )
    }
}

/// 所有已知消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Message {
    TargetCommand(TargetCommand),
    GainRequest(GainRequest),
    CaptureRequest(CaptureRequest),
    GainSetting(GainSetting),
    GainReport(GainReport),
    SensorReport(SensorReport),
}

impl Message {
    /// 编码为带 CRC 的 64 位帧
    pub fn to_frame(&self) -> u64 {
        match self {
            Message::TargetCommand(m) => m.to_frame(),
            Message::GainRequest(m) => m.to_frame(),
            Message::CaptureRequest(m) => m.to_frame(),
            Message::GainSetting(m) => m.to_frame(),
            Message::GainReport(m) => m.to_frame(),
            Message::SensorReport(m) => m.to_frame(),
        }
    }

    /// 解码 64 位帧并转换为消息
    pub fn decode(word: u64) -> Result<Message, ProtocolError> {
        let frame = decode(word)?;
        Message::try_from(&frame)
    }
}

impl TryFrom<&ParsedFrame> for Message {
    type Error = ProtocolError;

    fn try_from(frame: &ParsedFrame) -> Result<Self, Self::Error> {
        let f = &frame.fields;
        let format = frame.format;

        if format == FORMAT_TARGET_COMMAND {
            return Ok(Message::TargetCommand(TargetCommand::from_parsed(frame)));
        }
        if format == FORMAT_GAIN_REQUEST {
            let cylinder = from_one_hot(&f[..4])?;
            return Ok(Message::GainRequest(GainRequest { cylinder }));
        }
        if format == FORMAT_CAPTURE_REQUEST {
            let cylinder = from_one_hot(&f[..4])?;
            let raw = (f[4] << 1) | f[5];
            let kind = CaptureKind::try_from(raw as u8).map_err(|_| ProtocolError::InvalidValue {
                field: "capture_kind".to_string(),
                value: raw,
            })?;
            return Ok(Message::CaptureRequest(CaptureRequest { cylinder, kind }));
        }
        if let Some(cylinder) = slot(&FORMATS_GAIN_SETTING, format) {
            return Ok(Message::GainSetting(GainSetting {
                cylinder,
                p: f[0] as u8,
                i: f[1] as u8,
                d: f[2] as u8,
            }));
        }
        if let Some(cylinder) = slot(&FORMATS_GAIN_REPORT, format) {
            return Ok(Message::GainReport(GainReport {
                cylinder,
                p: f[0] as u8,
                i: f[1] as u8,
                d: f[2] as u8,
                capture_max: f[3],
                capture_min: f[4],
            }));
        }
        if let Some(cylinder) = slot(&FORMATS_SENSOR_REPORT, format) {
            return Ok(Message::SensorReport(SensorReport {
                cylinder,
                position: f[0],
                voltage: f[1],
                command: f[2],
            }));
        }

        Err(ProtocolError::UnknownFormat(format))
    }
}

/// 格式码在格式组中的位置即气缸编号
fn slot(formats: &[u8; 4], format: u8) -> Option<Cylinder> {
    formats
        .iter()
        .position(|&f| f == format)
        .and_then(Cylinder::from_index)
}

/// 气缸选择：field1 对应气缸 0
fn one_hot(cylinder: Cylinder) -> [u16; 4] {
    let mut select = [0u16; 4];
    select[cylinder.index()] = 1;
    select
}

fn from_one_hot(bits: &[u16]) -> Result<Cylinder, ProtocolError> {
    let set: Vec<usize> = bits
        .iter()
        .enumerate()
        .filter(|(_, b)| **b != 0)
        .map(|(i, _)| i)
        .collect();

    match set.as_slice() {
        [index] => Cylinder::from_index(*index).ok_or(ProtocolError::InvalidValue {
            field: "cylinder_select".to_string(),
            value: *index as u16,
        }),
        _ => {
            let mask = bits
                .iter()
                .fold(0u16, |acc, &b| (acc << 1) | (b & 1));
            Err(ProtocolError::InvalidValue {
                field: "cylinder_select".to_string(),
                value: mask,
            })
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;

    fn roundtrip(msg: Message) -> Message {
        Message::decode(msg.to_frame()).unwrap()
    }

    #[test]
    fn test_target_command() {
        let cmd = TargetCommand {
            modes: [
                ControlMode::Command,
                ControlMode::Position,
                ControlMode::Command,
                ControlMode::Position,
            ],
            values: [4095, 2048, 100, 7],
        };
        assert_eq!(cmd.to_frame(), 0xFEBF_FE00_0190_01C8);
        assert_eq!(roundtrip(Message::TargetCommand(cmd)), Message::TargetCommand(cmd));
    }

    #[test]
    fn test_target_command_uniform() {
        let cmd = TargetCommand::uniform(ControlMode::Command, [1, 2, 3, 4]);
        let frame = decode(cmd.to_frame()).unwrap();
        assert_eq!(frame.fields, [1, 1, 1, 1, 1, 2, 3, 4]);
    }

    #[test]
    fn test_gain_request_one_hot() {
        let req = GainRequest {
            cylinder: Cylinder::C0,
        };
        assert_eq!(req.to_frame(), 0x0600_0000_0000_0003);

        for cylinder in Cylinder::ALL {
            let msg = Message::GainRequest(GainRequest { cylinder });
            assert_eq!(roundtrip(msg), msg);
        }
    }

    #[test]
    fn test_gain_request_rejects_multiple_bits() {
        let word = encode(FORMAT_GAIN_REQUEST, &[1, 1, 0, 0]);
        assert_eq!(
            Message::decode(word),
            Err(ProtocolError::InvalidValue {
                field: "cylinder_select".to_string(),
                value: 0b1100,
            })
        );
        let word = encode(FORMAT_GAIN_REQUEST, &[]);
        assert!(Message::decode(word).is_err());
    }

    #[test]
    fn test_capture_request() {
        let req = CaptureRequest {
            cylinder: Cylinder::C1,
            kind: CaptureKind::Offset,
        };
        assert_eq!(req.to_frame(), 0xC910_0000_0000_0020);

        let frame = decode(req.to_frame()).unwrap();
        assert_eq!(frame.fields[..6], [0, 1, 0, 0, 0, 1]);

        let msg = Message::CaptureRequest(CaptureRequest {
            cylinder: Cylinder::C3,
            kind: CaptureKind::Stroke,
        });
        assert_eq!(roundtrip(msg), msg);
    }

    #[test]
    fn test_capture_request_invalid_kind() {
        let word = encode(FORMAT_CAPTURE_REQUEST, &[1, 0, 0, 0, 1, 1]);
        assert!(matches!(
            Message::decode(word),
            Err(ProtocolError::InvalidValue { value: 0b11, .. })
        ));
    }

    #[test]
    fn test_gain_setting_format_per_cylinder() {
        for (cylinder, format) in Cylinder::ALL.into_iter().zip([10, 20, 30, 40]) {
            let setting = GainSetting {
                cylinder,
                p: 200,
                i: 5,
                d: 37,
            };
            let frame = decode(setting.to_frame()).unwrap();
            assert_eq!(frame.format, format);
            assert_eq!(roundtrip(Message::GainSetting(setting)), Message::GainSetting(setting));
        }
    }

    #[test]
    fn test_gain_report() {
        let report = GainReport {
            cylinder: Cylinder::C0,
            p: 10,
            i: 20,
            d: 30,
            capture_max: 4000,
            capture_min: 100,
        };
        assert_eq!(report.to_frame(), 0x2C28_507B_E801_9002);
        assert_eq!(roundtrip(Message::GainReport(report)), Message::GainReport(report));
    }

    #[test]
    fn test_sensor_report() {
        let report = SensorReport {
            cylinder: Cylinder::C0,
            position: 1000,
            voltage: 2000,
            command: 3000,
        };
        assert_eq!(report.to_frame(), 0x14FA_1F42_EE00_002C);

        let msg = Message::SensorReport(SensorReport {
            cylinder: Cylinder::C3,
            ..report
        });
        assert_eq!(decode(msg.to_frame()).unwrap().format, 8);
        assert_eq!(roundtrip(msg), msg);
    }

    #[test]
    fn test_unknown_format() {
        assert_eq!(
            Message::decode(encode(42, &[])),
            Err(ProtocolError::UnknownFormat(42))
        );
    }

    #[test]
    fn test_decode_propagates_checksum_error() {
        let word = GainRequest {
            cylinder: Cylinder::C2,
        }
        .to_frame()
            ^ (1 << 40);
        assert!(matches!(Message::decode(word), Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_cylinder_try_from() {
        assert_eq!(Cylinder::try_from(2u8).unwrap(), Cylinder::C2);
        assert!(Cylinder::try_from(4u8).is_err());
        assert_eq!(Cylinder::C3.index(), 3);
    }
}
