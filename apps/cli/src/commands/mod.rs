//! 命令定义和实现

pub mod crc;
pub mod decode;
pub mod encode;
pub mod monitor;
pub mod pid_sim;
pub mod ports;
pub mod scan;

pub use crc::CrcCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use monitor::MonitorCommand;
pub use pid_sim::PidSimCommand;
pub use ports::PortsCommand;
pub use scan::ScanCommand;
