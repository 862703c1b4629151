//! # actlink Control
//!
//! 执行器位置环：窗口式增量 PID，带最小更新间隔门限和输出限幅。
//!
//! 时钟通过 [`Clock`] 注入，测试中使用 [`ManualClock`] 精确控制 dt。

pub mod clock;
pub mod config;
pub mod pid;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{ConfigError, DEFAULT_MIN_DT_US, PidConfig};
pub use pid::{ClipLimit, Gains, PidController};
