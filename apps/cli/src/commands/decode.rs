//! 解码命令

use crate::utils::{frame_json, frame_line, parse_word};
use actlink_sdk::protocol::{ValidationMode, decode_with, text::decode_line, to_bit_string};
use anyhow::Result;
use clap::Args;

/// 解码命令参数
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// 64 位帧（十六进制；`--text` 时为 base64 文本）
    pub word: String,

    /// 输入为 base64 文本行
    #[arg(long)]
    pub text: bool,

    /// 旧版模式：校验低 5 位保留位为 0
    #[arg(long)]
    pub legacy: bool,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,

    /// 同时输出 64 位二进制
    #[arg(long)]
    pub bits: bool,
}

impl DecodeCommand {
    pub fn execute(&self) -> Result<()> {
        let word = if self.text {
            decode_line(&self.word)?
        } else {
            parse_word(&self.word)?
        };
        let mode = if self.legacy {
            ValidationMode::ReservedBits
        } else {
            ValidationMode::Crc6
        };
        let frame = decode_with(word, mode)?;

        if self.json {
            println!("{}", frame_json(word, &frame));
        } else {
            println!("{}", frame_line(&frame));
        }
        if self.bits {
            println!("{}", to_bit_string(word));
        }
        Ok(())
    }
}
