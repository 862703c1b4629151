//! # actlink Driver Layer
//!
//! 链路驱动层：把字节通道变成帧流。
//!
//! - 三种传输方式：原始字节流 + CRC 重同步、原始对齐读取、base64 文本行
//! - 每次 [`FramePoller::poll`] 最多返回一帧，从不阻塞
//! - 原子计数器记录链路健康状况
//!
//! # 使用场景
//!
//! 适用于需要直接收发帧的场景。解析好的消息也可以通过
//! [`FramePoller::poll_message`] 直接取得。

pub mod config;
mod error;
pub mod metrics;
mod poller;
pub mod resync;

pub use config::{LinkConfig, TransportMode};
pub use error::DriverError;
pub use metrics::{LinkMetrics, LinkMetricsSnapshot};
pub use poller::FramePoller;
pub use resync::{DEFAULT_RESYNC_BUDGET, Resynchronizer};
