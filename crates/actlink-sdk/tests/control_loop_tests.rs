//! 端到端：主机 ↔ 执行器，经内存通道闭环
//!
//! 主机发送目标位置，执行器侧解码后运行 PID，回传传感器报告。

use actlink_sdk::prelude::*;
use std::io::Write;

const CONFIG: &str = r#"
[link]
transport = "raw_resync"

[pid]
i_gain = 8
i_base_gain = 100.0
min_dt_us = 1000
clip = { high = 4095.0, low = 0.0 }
"#;

fn load_config() -> ActlinkConfig {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    ActlinkConfig::load(file.path()).unwrap()
}

/// 把一端发出的字节搬到另一端的接收队列
fn transfer(from: &mut FramePoller<MockChannel>, to: &mut FramePoller<MockChannel>) {
    let bytes = from.channel_mut().take_tx();
    to.channel_mut().push_rx(&bytes);
}

#[test]
fn test_closed_loop_over_mock_link() {
    let config = load_config();

    let mut host = FramePoller::new(MockChannel::new(), config.link.clone()).unwrap();
    let mut device = FramePoller::new(MockChannel::new(), config.link.clone()).unwrap();
    host.begin().unwrap();
    device.begin().unwrap();

    let clock = ManualClock::new(0);
    let mut pid = PidController::from_config(&config.pid, clock.clone());
    let mut position = 0u16;

    let target = TargetCommand::uniform(ControlMode::Position, [2000, 0, 0, 0]);
    let mut last_report = None;

    for _ in 0..200 {
        host.send_message(&Message::TargetCommand(target)).unwrap();
        transfer(&mut host, &mut device);

        let Some(Message::TargetCommand(cmd)) = device.poll_message().unwrap() else {
            panic!("device expected a target command");
        };

        clock.advance(config.pid.min_dt_us);
        let out = pid.calc_command(cmd.values[0], position);
        position = out.round() as u16;

        let report = SensorReport {
            cylinder: Cylinder::C0,
            position,
            voltage: 0,
            command: position,
        };
        device.send_message(&Message::SensorReport(report)).unwrap();
        transfer(&mut device, &mut host);

        if let Some(Message::SensorReport(r)) = host.poll_message().unwrap() {
            last_report = Some(r);
        }
    }

    let report = last_report.unwrap();
    assert!((i32::from(report.position) - 2000).abs() <= 1);

    let host_metrics = host.metrics().snapshot();
    assert_eq!(host_metrics.frames_ok, 200);
    assert_eq!(host_metrics.frames_sent, 200);
    assert_eq!(host_metrics.frames_rejected(), 0);
}

#[test]
fn test_line_noise_is_recovered() {
    let config = load_config();
    let mut host = FramePoller::new(MockChannel::new(), config.link).unwrap();

    // 一个 CRC 错误的半帧之后紧跟正确帧
    let good = encode(5, &[1000, 2000, 3000]).to_be_bytes();
    host.channel_mut().push_rx(&[0x14, 0xFA, 0x1F]);
    host.channel_mut().push_rx(&good);

    let msg = host.poll_message().unwrap();
    assert_eq!(
        msg,
        Some(Message::SensorReport(SensorReport {
            cylinder: Cylinder::C0,
            position: 1000,
            voltage: 2000,
            command: 3000,
        }))
    );
}
