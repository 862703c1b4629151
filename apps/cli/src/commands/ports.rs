//! 串口列表命令

use anyhow::Result;
use clap::Args;

/// 串口列表命令参数
#[derive(Args, Debug)]
pub struct PortsCommand {}

impl PortsCommand {
    pub fn execute(&self) -> Result<()> {
        let ports = actlink_sdk::serial::list_ports()?;
        if ports.is_empty() {
            println!("No serial ports found");
        }
        for port in ports {
            println!("{port}");
        }
        Ok(())
    }
}
