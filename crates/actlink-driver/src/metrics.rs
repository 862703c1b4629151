//! 链路健康指标
//!
//! 原子计数器，`FramePoller` 在轮询时更新，监控方随时读取快照。

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// 链路实时指标
///
/// # 使用示例
///
/// ```rust
/// use actlink_driver::LinkMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = LinkMetrics::new();
/// metrics.frames_ok.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.frames_ok, 1);
/// ```
#[derive(Debug, Default)]
pub struct LinkMetrics {
    /// 校验通过的接收帧数
    pub frames_ok: AtomicU64,

    /// CRC 校验失败次数（对齐读取模式下每次失败都会清空输入）
    pub checksum_failures: AtomicU64,

    /// 保留位校验失败次数（旧版模式）
    pub reserved_bit_failures: AtomicU64,

    /// 文本帧长度错误次数
    pub malformed_text: AtomicU64,

    /// 重同步耗尽次数
    ///
    /// 持续增长说明波特率不匹配或线路噪声严重。
    pub resync_exhausted: AtomicU64,

    /// 重同步时移入的字节数
    pub resync_shifts: AtomicU64,

    /// 被丢弃的接收字节数
    pub bytes_flushed: AtomicU64,

    /// 发送帧数
    pub frames_sent: AtomicU64,
}

impl LinkMetrics {
    /// 创建新的指标实例（所有计数器初始化为 0）
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> LinkMetricsSnapshot {
        LinkMetricsSnapshot {
            frames_ok: self.frames_ok.load(Ordering::Relaxed),
            checksum_failures: self.checksum_failures.load(Ordering::Relaxed),
            reserved_bit_failures: self.reserved_bit_failures.load(Ordering::Relaxed),
            malformed_text: self.malformed_text.load(Ordering::Relaxed),
            resync_exhausted: self.resync_exhausted.load(Ordering::Relaxed),
            resync_shifts: self.resync_shifts.load(Ordering::Relaxed),
            bytes_flushed: self.bytes_flushed.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        self.frames_ok.store(0, Ordering::Relaxed);
        self.checksum_failures.store(0, Ordering::Relaxed);
        self.reserved_bit_failures.store(0, Ordering::Relaxed);
        self.malformed_text.store(0, Ordering::Relaxed);
        self.resync_exhausted.store(0, Ordering::Relaxed);
        self.resync_shifts.store(0, Ordering::Relaxed);
        self.bytes_flushed.store(0, Ordering::Relaxed);
        self.frames_sent.store(0, Ordering::Relaxed);
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LinkMetricsSnapshot {
    pub frames_ok: u64,
    pub checksum_failures: u64,
    pub reserved_bit_failures: u64,
    pub malformed_text: u64,
    pub resync_exhausted: u64,
    pub resync_shifts: u64,
    pub bytes_flushed: u64,
    pub frames_sent: u64,
}

impl LinkMetricsSnapshot {
    /// 被拒绝的帧总数
    pub fn frames_rejected(&self) -> u64 {
        self.checksum_failures
            + self.reserved_bit_failures
            + self.malformed_text
            + self.resync_exhausted
    }

    /// 接收帧的成功率（百分比）
    ///
    /// 没有任何接收记录时返回 100.0。
    pub fn success_rate(&self) -> f64 {
        let total = self.frames_ok + self.frames_rejected();
        if total == 0 {
            return 100.0;
        }
        (self.frames_ok as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_default() {
        let snapshot = LinkMetrics::new().snapshot();
        assert_eq!(snapshot, LinkMetricsSnapshot::default());
        assert_eq!(snapshot.success_rate(), 100.0);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = LinkMetrics::new();
        LinkMetrics::add(&metrics.frames_ok, 3);
        LinkMetrics::add(&metrics.resync_exhausted, 1);
        LinkMetrics::add(&metrics.bytes_flushed, 40);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_ok, 3);
        assert_eq!(snapshot.frames_rejected(), 1);
        assert_eq!(snapshot.success_rate(), 75.0);

        metrics.reset();
        assert_eq!(metrics.snapshot(), LinkMetricsSnapshot::default());
    }
}
