//! 窗口式增量 PID 控制器
//!
//! 每次通过速率门限的调用：
//!
//! ```text
//! err[2] <- err[1] <- err[0] <- target - current
//! pos = err0 - err1
//! vel = err0 * dt
//! acc = (err0 - 2*err1 + err2) / dt
//! command += Kp*pos + Ki*vel + Kd*acc
//! ```
//!
//! `command` 是累加量，输出 `ret_command` 是它经过限幅后的值。

use crate::clock::{Clock, MonotonicClock};
use crate::config::PidConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

/// 旋钮平方缩放的分母
pub const KNOB_SCALE: f32 = 64.0;

/// 增益：旋钮值（0-255）、基准增益和实际使用的计算增益
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gains {
    pub p_gain: u8,
    pub i_gain: u8,
    pub d_gain: u8,

    pub p_base_gain: f32,
    pub i_base_gain: f32,
    pub d_base_gain: f32,

    /// `p_base_gain * p_gain² / 64`
    pub p_calc_gain: f32,
    pub i_calc_gain: f32,
    pub d_calc_gain: f32,
}

impl Gains {
    fn recompute(&mut self) {
        self.p_calc_gain = scaled(self.p_base_gain, self.p_gain);
        self.i_calc_gain = scaled(self.i_base_gain, self.i_gain);
        self.d_calc_gain = scaled(self.d_base_gain, self.d_gain);
    }
}

/// 平方缩放：小旋钮值分辨率更细
fn scaled(base: f32, knob: u8) -> f32 {
    let knob = f32::from(knob);
    base * knob * knob / KNOB_SCALE
}

/// 输出限幅
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipLimit {
    pub high: f32,
    pub low: f32,
}

impl ClipLimit {
    /// 先比较上限，再比较下限，不会 panic
    ///
    /// `low > high` 时大于 `high` 的值得到 `high`，其余得到 `low`。NaN 得到 `low`。
    pub fn apply(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.low
        } else if value > self.high {
            self.high
        } else if value < self.low {
            self.low
        } else {
            value
        }
    }
}

/// PID 控制器
///
/// # 示例
///
/// ```
/// use actlink_control::{ManualClock, PidController};
///
/// let clock = ManualClock::new(0);
/// let mut pid = PidController::with_clock(clock.clone());
/// pid.set_base_gain(2.0, 0.0, 0.0);
/// pid.set_gain(8, 0, 0);
///
/// clock.advance(1_000);
/// assert_eq!(pid.calc_command(1000, 900), 200.0);
/// ```
#[derive(Debug)]
pub struct PidController<C: Clock = MonotonicClock> {
    clock: C,
    gains: Gains,
    clip: Option<ClipLimit>,
    min_dt_us: u32,
    prev_micros: u32,
    err: [i32; 3],
    command: f32,
    ret_command: f32,
}

impl PidController<MonotonicClock> {
    /// 使用系统时钟创建控制器
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for PidController<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> PidController<C> {
    /// 使用指定时钟创建控制器（增益全为 0，无限幅，无速率门限）
    pub fn with_clock(clock: C) -> Self {
        let prev_micros = clock.now_micros();
        Self {
            clock,
            gains: Gains::default(),
            clip: None,
            min_dt_us: 0,
            prev_micros,
            err: [0; 3],
            command: 0.0,
            ret_command: 0.0,
        }
    }

    /// 按配置创建控制器
    pub fn from_config(config: &PidConfig, clock: C) -> Self {
        let mut pid = Self::with_clock(clock);
        pid.apply_config(config);
        pid
    }

    /// 应用配置（不清除历史和累加量）
    pub fn apply_config(&mut self, config: &PidConfig) {
        self.set_base_gain(config.p_base_gain, config.i_base_gain, config.d_base_gain);
        self.set_gain(config.p_gain, config.i_gain, config.d_gain);
        self.min_dt_us = config.min_dt_us;
        match config.clip {
            Some(clip) => self.clip_limit_enable(clip.high, clip.low),
            None => self.clip_limit_disable(),
        }
    }

    /// 设置基准增益，并按当前旋钮值重新计算
    pub fn set_base_gain(&mut self, p: f32, i: f32, d: f32) {
        self.gains.p_base_gain = p;
        self.gains.i_base_gain = i;
        self.gains.d_base_gain = d;
        self.gains.recompute();
    }

    /// 设置旋钮增益（0-255）
    pub fn set_gain(&mut self, p: u8, i: u8, d: u8) {
        self.gains.p_gain = p;
        self.gains.i_gain = i;
        self.gains.d_gain = d;
        self.gains.recompute();
        debug!(
            p_calc = self.gains.p_calc_gain,
            i_calc = self.gains.i_calc_gain,
            d_calc = self.gains.d_calc_gain,
            "pid gains updated"
        );
    }

    pub fn gains(&self) -> Gains {
        self.gains
    }

    /// 设置最小更新间隔（超过 `u32::MAX` 微秒时饱和）
    pub fn set_min_dt(&mut self, min_dt: Duration) {
        self.min_dt_us = u32::try_from(min_dt.as_micros()).unwrap_or(u32::MAX);
    }

    pub fn min_dt(&self) -> Duration {
        Duration::from_micros(u64::from(self.min_dt_us))
    }

    /// 计算控制输出
    ///
    /// 距上次有效更新不足 `min_dt` 时直接返回上一次的输出，状态不变。
    pub fn calc_command(&mut self, target: u16, current: u16) -> f32 {
        let now = self.clock.now_micros();
        let dt_us = now.wrapping_sub(self.prev_micros);
        if dt_us < self.min_dt_us {
            return self.ret_command;
        }

        let dt = f64::from(dt_us) / 1_000_000.0;
        self.prev_micros = now;
        self.err = [i32::from(target) - i32::from(current), self.err[0], self.err[1]];

        let [e0, e1, e2] = self.err.map(f64::from);
        let pos_err = e0 - e1;
        let vel_err = e0 * dt;
        // dt == 0 只在 min_dt == 0 时可能出现
        let acc_err = if dt > 0.0 {
            (e0 - 2.0 * e1 + e2) / dt
        } else {
            0.0
        };

        let delta = f64::from(self.gains.p_calc_gain) * pos_err
            + f64::from(self.gains.i_calc_gain) * vel_err
            + f64::from(self.gains.d_calc_gain) * acc_err;
        // 累加量饱和在 f32 有限范围内；增量为 NaN（无穷增益乘以 0）时本次不累加
        let next = self.command + delta as f32;
        if !next.is_nan() {
            self.command = next.clamp(f32::MIN, f32::MAX);
        }

        self.ret_command = match &self.clip {
            Some(clip) => clip.apply(self.command),
            None => self.command,
        };

        trace!(
            dt_us,
            err = e0,
            command = self.command,
            output = self.ret_command,
            "pid update"
        );
        self.ret_command
    }

    /// 启用限幅
    pub fn clip_limit_enable(&mut self, high: f32, low: f32) {
        self.clip = Some(ClipLimit { high, low });
    }

    /// 关闭限幅（累加量保留，重新启用时从同一位置继续）
    pub fn clip_limit_disable(&mut self) {
        self.clip = None;
    }

    pub fn clip_limit(&self) -> Option<ClipLimit> {
        self.clip
    }

    /// 以当前时刻作为下一次更新的参考时间
    ///
    /// 用于长时间暂停之后，避免下一次出现过大的 dt。误差历史不变。
    pub fn time_reset(&mut self) {
        self.prev_micros = self.clock.now_micros();
    }

    /// 清除误差历史和累加量，并重置参考时间
    pub fn reset(&mut self) {
        self.err = [0; 3];
        self.command = 0.0;
        self.ret_command = 0.0;
        self.time_reset();
    }

    /// 未限幅的累加量
    pub fn command(&self) -> f32 {
        self.command
    }

    /// 最近一次输出
    pub fn ret_command(&self) -> f32 {
        self.ret_command
    }

    /// `[err0, err1, err2]`，最新的在前
    pub fn error_history(&self) -> [i32; 3] {
        self.err
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn controller() -> (PidController<ManualClock>, ManualClock) {
        let clock = ManualClock::new(0);
        (PidController::with_clock(clock.clone()), clock)
    }

    #[test]
    fn test_quadratic_gain_scaling() {
        let (mut pid, _) = controller();
        pid.set_base_gain(1.0, 0.5, 2.0);
        pid.set_gain(8, 16, 0);

        let g = pid.gains();
        assert_eq!(g.p_calc_gain, 1.0);
        assert_eq!(g.i_calc_gain, 2.0);
        assert_eq!(g.d_calc_gain, 0.0);

        // 基准增益变化也会重新计算
        pid.set_base_gain(3.0, 0.5, 2.0);
        assert_eq!(pid.gains().p_calc_gain, 3.0);
        assert_eq!(scaled(1.0, 255), 255.0 * 255.0 / 64.0);
    }

    #[test]
    fn test_first_update_scenario() {
        let (mut pid, clock) = controller();
        pid.set_base_gain(2.0, 0.0, 0.0);
        pid.set_gain(8, 0, 0);

        clock.advance(1_000);
        let out = pid.calc_command(1000, 900);
        assert_eq!(out, 200.0);
        assert_eq!(pid.command(), 200.0);
        assert_eq!(pid.error_history(), [100, 0, 0]);

        // 误差不变时 pos_err 为 0，输出保持
        clock.advance(1_000);
        assert_eq!(pid.calc_command(1000, 900), 200.0);
    }

    #[test]
    fn test_rate_gate() {
        let (mut pid, clock) = controller();
        pid.set_base_gain(1.0, 1.0, 1.0);
        pid.set_gain(8, 8, 8);
        pid.set_min_dt(Duration::from_micros(500));

        clock.advance(500);
        let first = pid.calc_command(2000, 1000);
        let history = pid.error_history();

        clock.advance(499);
        assert_eq!(pid.calc_command(0, 4000), first);
        assert_eq!(pid.error_history(), history);

        clock.advance(1);
        pid.calc_command(0, 4000);
        assert_eq!(pid.error_history()[0], -4000);
    }

    #[test]
    fn test_velocity_and_acceleration_terms() {
        let (mut pid, clock) = controller();
        pid.set_base_gain(0.0, 1.0, 0.0);
        pid.set_gain(0, 8, 0);

        // vel = err0 * dt = 100 * 0.5
        clock.advance(500_000);
        assert_eq!(pid.calc_command(200, 100), 50.0);

        let (mut pid, clock) = controller();
        pid.set_base_gain(0.0, 0.0, 1.0);
        pid.set_gain(0, 0, 8);

        // acc = (100 - 0 + 0) / 1.0
        clock.advance(1_000_000);
        assert_eq!(pid.calc_command(200, 100), 100.0);
        // acc = (100 - 200 + 0) / 1.0
        clock.advance(1_000_000);
        assert_eq!(pid.calc_command(200, 100), 0.0);
    }

    #[test]
    fn test_zero_dt_does_not_divide() {
        let (mut pid, _) = controller();
        pid.set_base_gain(0.0, 0.0, 1.0);
        pid.set_gain(0, 0, 8);
        let out = pid.calc_command(10, 0);
        assert!(out.is_finite());
        assert_eq!(out, 0.0);
    }

    #[test]
    fn test_clip_and_disable_resume() {
        let (mut pid, clock) = controller();
        pid.set_base_gain(1.0, 0.0, 0.0);
        pid.set_gain(8, 0, 0);
        pid.clip_limit_enable(50.0, -50.0);

        clock.advance(1_000);
        assert_eq!(pid.calc_command(300, 100), 50.0);
        assert_eq!(pid.command(), 200.0);

        pid.clip_limit_disable();
        clock.advance(1_000);
        // pos_err = 0，输出为未限幅的累加量
        assert_eq!(pid.calc_command(300, 100), 200.0);

        pid.clip_limit_enable(50.0, -50.0);
        clock.advance(1_000);
        assert_eq!(pid.calc_command(300, 100), 50.0);
    }

    #[test]
    fn test_inverted_clip_does_not_panic() {
        let clip = ClipLimit { high: -1.0, low: 1.0 };
        assert_eq!(clip.apply(5.0), -1.0);
        assert_eq!(clip.apply(0.0), -1.0);
        // 不大于 high 的值都小于 low
        assert_eq!(clip.apply(-5.0), 1.0);
    }

    #[test]
    fn test_clip_maps_nan_to_low() {
        let clip = ClipLimit { high: 10.0, low: -10.0 };
        assert_eq!(clip.apply(f32::NAN), -10.0);
        assert_eq!(clip.apply(f32::INFINITY), 10.0);
        assert_eq!(clip.apply(f32::NEG_INFINITY), -10.0);
    }

    #[test]
    fn test_infinite_gain_stays_within_clip() {
        let (mut pid, clock) = controller();
        // 计算增益溢出为 +inf
        pid.set_base_gain(1e36, 0.0, 0.0);
        pid.set_gain(255, 0, 0);
        pid.clip_limit_enable(10.0, -10.0);
        assert!(pid.gains().p_calc_gain.is_infinite());

        clock.advance(1_000);
        assert_eq!(pid.calc_command(1000, 0), 10.0);
        assert_eq!(pid.command(), f32::MAX);

        // inf 与 -inf 相加不会留下 NaN
        clock.advance(1_000);
        assert_eq!(pid.calc_command(0, 1000), -10.0);
        assert_eq!(pid.command(), f32::MIN);

        // 误差不变：inf * 0 为 NaN，本次不累加
        clock.advance(1_000);
        assert_eq!(pid.calc_command(0, 1000), -10.0);
        assert!(pid.command().is_finite());
    }

    #[test]
    fn test_timer_wraparound() {
        let clock = ManualClock::new(u32::MAX - 100);
        let mut pid = PidController::with_clock(clock.clone());
        pid.set_min_dt(Duration::from_micros(1_000));

        clock.advance(1_000);
        pid.calc_command(10, 0);
        assert_eq!(pid.error_history()[0], 10);
    }

    #[test]
    fn test_time_reset_keeps_history() {
        let (mut pid, clock) = controller();
        pid.set_min_dt(Duration::from_micros(1_000));
        clock.advance(1_000);
        pid.calc_command(10, 0);

        clock.advance(10_000_000);
        pid.time_reset();
        assert_eq!(pid.error_history(), [10, 0, 0]);

        // 参考时间已更新，门限重新生效
        clock.advance(10);
        pid.calc_command(20, 0);
        assert_eq!(pid.error_history(), [10, 0, 0]);
    }

    #[test]
    fn test_reset_clears_state() {
        let (mut pid, clock) = controller();
        pid.set_base_gain(1.0, 0.0, 0.0);
        pid.set_gain(8, 0, 0);
        clock.advance(1_000);
        pid.calc_command(100, 0);

        pid.reset();
        assert_eq!(pid.command(), 0.0);
        assert_eq!(pid.ret_command(), 0.0);
        assert_eq!(pid.error_history(), [0; 3]);
    }

    #[test]
    fn test_min_dt_saturates() {
        let (mut pid, _) = controller();
        pid.set_min_dt(Duration::from_secs(10_000));
        assert_eq!(pid.min_dt(), Duration::from_micros(u64::from(u32::MAX)));
    }
}
