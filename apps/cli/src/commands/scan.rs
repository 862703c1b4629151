//! 抓包扫描命令
//!
//! 把十六进制字节转储灌入内存通道，按真实链路的方式逐帧恢复。

use crate::utils::{frame_json, frame_line, parse_hex_dump};
use actlink_sdk::driver::{FramePoller, LinkConfig, TransportMode};
use actlink_sdk::serial::MockChannel;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tracing::info;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanTransport {
    Resync,
    Aligned,
    Text,
}

impl From<ScanTransport> for TransportMode {
    fn from(t: ScanTransport) -> Self {
        match t {
            ScanTransport::Resync => TransportMode::RawResync,
            ScanTransport::Aligned => TransportMode::RawAligned,
            ScanTransport::Text => TransportMode::Text,
        }
    }
}

/// 扫描命令参数
#[derive(Args, Debug)]
pub struct ScanCommand {
    /// 抓包文件（十六进制字节；`--transport text` 时为原始文本）
    pub file: PathBuf,

    /// 传输方式
    #[arg(short, long, value_enum, default_value_t = ScanTransport::Resync)]
    pub transport: ScanTransport,

    /// 每周期最多 CRC 校验次数
    #[arg(long, default_value_t = actlink_sdk::driver::DEFAULT_RESYNC_BUDGET)]
    pub budget: u32,

    /// 每帧输出一行 JSON
    #[arg(long)]
    pub json: bool,
}

impl ScanCommand {
    pub fn execute(&self) -> Result<()> {
        let content = std::fs::read_to_string(&self.file)
            .with_context(|| format!("failed to read {}", self.file.display()))?;
        let bytes = match self.transport {
            ScanTransport::Text => content.into_bytes(),
            _ => parse_hex_dump(&content)?,
        };
        info!(bytes = bytes.len(), "scanning capture");

        let config = LinkConfig {
            transport: self.transport.into(),
            resync_budget: self.budget,
            ..LinkConfig::default()
        };
        let mut link = FramePoller::new(MockChannel::with_rx(&bytes), config)?;

        loop {
            match link.poll_with_word() {
                Ok(Some((word, frame))) => {
                    if self.json {
                        println!("{}", frame_json(word, &frame));
                    } else {
                        println!("{}", frame_line(&frame));
                    }
                },
                Ok(None) => break,
                Err(e) if e.is_recoverable() => {
                    if !self.json {
                        println!("! {e}");
                    }
                },
                Err(e) => return Err(e.into()),
            }
        }

        let remaining = link.channel_mut().rx_len();
        let snapshot = link.metrics().snapshot();
        if self.json {
            eprintln!("{}", serde_json::to_string(&snapshot)?);
        } else {
            println!(
                "frames: {} ok, {} rejected, {} shifts, {} bytes flushed, {} bytes left over",
                snapshot.frames_ok,
                snapshot.frames_rejected(),
                snapshot.resync_shifts,
                snapshot.bytes_flushed,
                remaining
            );
        }
        Ok(())
    }
}
