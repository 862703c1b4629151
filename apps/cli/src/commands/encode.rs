//! 编码命令

use actlink_sdk::protocol::text::encode_line;
use actlink_sdk::protocol::{
    FORMAT_COUNT, ValidationMode, encode_checked, encode_with, strip_crc,
};
use anyhow::{Result, bail};
use clap::Args;

/// 编码命令参数
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// 格式码（0-63）
    pub format: u8,

    /// 字段值，按布局顺序
    #[arg(num_args = 0..)]
    pub values: Vec<u16>,

    /// 同时输出 base64 文本行
    #[arg(long)]
    pub text: bool,

    /// 旧版模式：不附加 CRC，低位保留为 0
    #[arg(long)]
    pub legacy: bool,

    /// 超出位宽的值按低位截断，而不是报错
    #[arg(long)]
    pub truncate: bool,
}

impl EncodeCommand {
    /// 计算帧
    pub fn word(&self) -> Result<u64> {
        if usize::from(self.format) >= FORMAT_COUNT {
            bail!("format {} out of range 0-63", self.format);
        }
        let mode = if self.legacy {
            ValidationMode::ReservedBits
        } else {
            ValidationMode::Crc6
        };
        if self.truncate {
            return Ok(encode_with(self.format, &self.values, mode));
        }
        let word = encode_checked(self.format, &self.values)?;
        Ok(match mode {
            ValidationMode::Crc6 => word,
            ValidationMode::ReservedBits => strip_crc(word),
        })
    }

    pub fn execute(&self) -> Result<()> {
        let word = self.word()?;
        println!("0x{word:016X}");
        if self.text {
            println!("{}", encode_line(word));
        }
        Ok(())
    }
}
