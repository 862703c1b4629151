//! 微秒时钟抽象
//!
//! 控制器只需要一个会回绕的 32 位微秒计数器。

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// 单调微秒时钟
///
/// 返回值允许回绕，调用方用 `wrapping_sub` 计算间隔。
pub trait Clock {
    fn now_micros(&self) -> u32;
}

/// 基于 `Instant` 的系统时钟
///
/// 截断为 32 位，约 71.6 分钟回绕一次。
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_micros(&self) -> u32 {
        self.epoch.elapsed().as_micros() as u32
    }
}

/// 手动推进的时钟（测试和仿真用）
///
/// 克隆出的句柄共享同一个计数器：把一个交给控制器，另一个留在测试里推进。
///
/// ```
/// use actlink_control::{Clock, ManualClock};
///
/// let clock = ManualClock::new(0);
/// let handle = clock.clone();
/// handle.advance(1_500);
/// assert_eq!(clock.now_micros(), 1_500);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u32>>,
}

impl ManualClock {
    pub fn new(start_micros: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(start_micros)),
        }
    }

    /// 推进时间（回绕）
    pub fn advance(&self, micros: u32) {
        self.now.set(self.now.get().wrapping_add(micros));
    }

    pub fn set(&self, micros: u32) {
        self.now.set(micros);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> u32 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_wraps() {
        let clock = ManualClock::new(u32::MAX - 10);
        clock.advance(20);
        assert_eq!(clock.now_micros(), 9);
        assert_eq!(clock.now_micros().wrapping_sub(u32::MAX - 10), 20);
    }

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.now_micros();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(clock.now_micros().wrapping_sub(a) >= 1_000);
    }
}
