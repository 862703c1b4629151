//! # actlink CLI
//!
//! 帧编解码、离线抓包分析、串口监控和 PID 仿真。
//!
//! ```bash
//! # 编码一帧
//! actlink-cli encode 10 200 5 37 --text
//!
//! # 解码并输出 JSON
//! actlink-cli decode 0x2B20149400000036 --json
//!
//! # 从十六进制抓包中恢复帧
//! actlink-cli scan capture.hex
//!
//! # 监控串口（Ctrl+C 停止）
//! actlink-cli monitor --port /dev/ttyUSB0
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod utils;

use commands::{
    CrcCommand, DecodeCommand, EncodeCommand, MonitorCommand, PidSimCommand, PortsCommand,
    ScanCommand,
};

/// actlink CLI - 串口执行器链路工具
#[derive(Parser, Debug)]
#[command(name = "actlink-cli")]
#[command(about = "Command-line interface for actlink serial actuator links", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 编码一帧
    Encode {
        #[command(flatten)]
        args: EncodeCommand,
    },

    /// 解码一帧
    Decode {
        #[command(flatten)]
        args: DecodeCommand,
    },

    /// 计算并比对 CRC-6
    Crc {
        #[command(flatten)]
        args: CrcCommand,
    },

    /// 从十六进制字节转储中恢复帧
    Scan {
        #[command(flatten)]
        args: ScanCommand,
    },

    /// 列出串口
    Ports {
        #[command(flatten)]
        args: PortsCommand,
    },

    /// 监控串口上的帧
    Monitor {
        #[command(flatten)]
        args: MonitorCommand,
    },

    /// 对一阶被控对象运行 PID 仿真
    PidSim {
        #[command(flatten)]
        args: PidSimCommand,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    actlink_sdk::init_logger_with("actlink_cli=info,actlink_driver=warn");

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { args } => args.execute(),
        Commands::Decode { args } => args.execute(),
        Commands::Crc { args } => args.execute(),
        Commands::Scan { args } => args.execute(),
        Commands::Ports { args } => args.execute(),
        Commands::Monitor { args } => args.execute(),
        Commands::PidSim { args } => args.execute(),
    }
}
