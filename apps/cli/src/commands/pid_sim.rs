//! PID 仿真命令
//!
//! 一阶被控对象：`x += (u - x) * dt / (tau + dt)`，时间由手动时钟推进。

use actlink_sdk::ActlinkConfig;
use actlink_sdk::control::{ManualClock, PidController};
use anyhow::{Result, bail};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// PID 仿真命令参数
#[derive(Args, Debug)]
pub struct PidSimCommand {
    /// 配置文件（使用其中的 `[pid]` 段）
    #[arg(short, long)]
    pub config: PathBuf,

    /// 目标位置
    #[arg(short, long)]
    pub target: u16,

    /// 仿真步数
    #[arg(short, long, default_value_t = 100)]
    pub steps: u32,

    /// 初始位置
    #[arg(long, default_value_t = 0)]
    pub start: u16,

    /// 被控对象时间常数（微秒），0 表示位置直接跟随输出
    #[arg(long, default_value_t = 0)]
    pub tau_us: u32,

    /// 每步的时间间隔（微秒），默认为配置中的 `min_dt_us`
    #[arg(long)]
    pub dt_us: Option<u32>,

    /// 每步输出一行 JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimStep {
    pub step: u32,
    pub time_us: u64,
    pub position: u16,
    pub output: f32,
}

impl PidSimCommand {
    /// 运行仿真，返回每一步的轨迹
    pub fn simulate(&self, config: &ActlinkConfig) -> Result<Vec<SimStep>> {
        let dt_us = self.dt_us.unwrap_or(config.pid.min_dt_us).max(1);
        if dt_us < config.pid.min_dt_us {
            bail!(
                "dt_us {dt_us} is below min_dt_us {}, every update would be gated",
                config.pid.min_dt_us
            );
        }

        let clock = ManualClock::new(0);
        let mut pid = PidController::from_config(&config.pid, clock.clone());
        let alpha = f64::from(dt_us) / (f64::from(self.tau_us) + f64::from(dt_us));

        let mut x = f64::from(self.start);
        let mut trace = Vec::with_capacity(self.steps as usize);
        for step in 1..=self.steps {
            clock.advance(dt_us);
            let position = x.round().clamp(0.0, f64::from(u16::MAX)) as u16;
            let output = pid.calc_command(self.target, position);
            x += (f64::from(output) - x) * alpha;

            trace.push(SimStep {
                step,
                time_us: u64::from(step) * u64::from(dt_us),
                position,
                output,
            });
        }
        Ok(trace)
    }

    pub fn execute(&self) -> Result<()> {
        let config = ActlinkConfig::load(&self.config)?;
        let trace = self.simulate(&config)?;

        if !self.json {
            println!("{:>6} {:>10} {:>8} {:>10}", "step", "time_us", "position", "output");
        }
        for s in &trace {
            if self.json {
                println!("{}", serde_json::to_string(s)?);
            } else {
                println!(
                    "{:>6} {:>10} {:>8} {:>10.2}",
                    s.step, s.time_us, s.position, s.output
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(target: u16, steps: u32) -> PidSimCommand {
        PidSimCommand {
            config: PathBuf::new(),
            target,
            steps,
            start: 0,
            tau_us: 0,
            dt_us: None,
            json: false,
        }
    }

    #[test]
    fn test_integral_loop_reaches_target() {
        let config = ActlinkConfig::from_toml_str(
            r#"
            [pid]
            i_gain = 8
            i_base_gain = 100.0
            "#,
        )
        .unwrap();
        let trace = cmd(1500, 200).simulate(&config).unwrap();
        assert_eq!(trace.len(), 200);
        assert_eq!(trace[0].position, 0);
        let last = trace.last().unwrap();
        assert!((i32::from(last.position) - 1500).abs() <= 1);
    }

    #[test]
    fn test_dt_below_gate_rejected() {
        let config = ActlinkConfig::default();
        let mut c = cmd(100, 10);
        c.dt_us = Some(10);
        assert!(c.simulate(&config).is_err());
    }
}
