//! CRC 命令

use crate::utils::parse_word;
use actlink_sdk::protocol::{frame_crc, stored_crc};
use anyhow::Result;
use clap::Args;

/// CRC 命令参数
#[derive(Args, Debug)]
pub struct CrcCommand {
    /// 64 位帧（十六进制）
    pub word: String,
}

impl CrcCommand {
    pub fn execute(&self) -> Result<()> {
        let word = parse_word(&self.word)?;
        let computed = frame_crc(word);
        let stored = stored_crc(word);
        let status = if computed == stored { "ok" } else { "mismatch" };
        println!("computed 0x{computed:02X} stored 0x{stored:02X} {status}");
        Ok(())
    }
}
