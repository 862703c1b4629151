//! 串口监控命令
//!
//! 轮询硬件串口，每收到一帧输出一行 JSON，直到 Ctrl+C。

use crate::utils::frame_json;
use actlink_sdk::{ActlinkConfig, LinkConfig};
use anyhow::{Result, bail};
use clap::Args;
use spin_sleep::SpinSleeper;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// 监控命令参数
#[derive(Args, Debug)]
pub struct MonitorCommand {
    /// 串口路径
    #[arg(short, long)]
    pub port: String,

    /// 配置文件（使用其中的 `[link]` 段）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 波特率（覆盖配置）
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// 轮询频率（Hz）
    #[arg(short, long, default_value_t = 1000.0)]
    pub frequency: f64,
}

impl MonitorCommand {
    fn link_config(&self) -> Result<LinkConfig> {
        let mut link = match &self.config {
            Some(path) => ActlinkConfig::load(path)?.link,
            None => LinkConfig::default(),
        };
        if let Some(baud) = self.baud {
            link.baud_rate = baud;
        }
        Ok(link)
    }

    pub fn execute(&self) -> Result<()> {
        if !(self.frequency > 0.0 && self.frequency <= 100_000.0) {
            bail!("invalid frequency {} Hz", self.frequency);
        }
        let config = self.link_config()?;
        let mut link = actlink_sdk::open_serial(&self.port, config)?;
        info!(port = %self.port, "monitoring, press Ctrl+C to stop");

        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })?;

        let period = Duration::from_secs_f64(1.0 / self.frequency);
        let sleeper = SpinSleeper::default();

        while running.load(Ordering::SeqCst) {
            // 一次取完已到达的所有帧
            loop {
                match link.poll_with_word() {
                    Ok(Some((word, frame))) => println!("{}", frame_json(word, &frame)),
                    Ok(None) => break,
                    Err(e) if e.is_recoverable() => {
                        warn!(error = %e, "frame dropped");
                    },
                    Err(e) => return Err(e.into()),
                }
            }
            sleeper.sleep(period);
        }

        let snapshot = link.metrics().snapshot();
        eprintln!("{}", serde_json::to_string(&snapshot)?);
        Ok(())
    }
}
