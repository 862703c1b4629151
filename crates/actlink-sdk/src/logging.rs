//! 日志初始化
//!
//! `tracing` 订阅者 + `log` 桥接：依赖 `log` 宏的第三方库输出也会进入同一管道。
//! 日志写到 stderr，stdout 留给命令输出。

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// 默认过滤级别（`RUST_LOG` 未设置时）
pub const DEFAULT_FILTER: &str = "info";

/// 初始化全局日志
///
/// 优先使用 `RUST_LOG`，否则为 `info`。重复调用会被忽略。
///
/// ```
/// actlink_sdk::init_logger();
/// tracing::info!("link ready");
/// ```
pub fn init_logger() {
    init_logger_with(DEFAULT_FILTER);
}

/// 以指定的默认过滤规则初始化日志
///
/// 已有全局订阅者时返回 `false`。
pub fn init_logger_with(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }
    // 订阅者已就位，再接管 `log` 记录
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!(error = %e, "log bridge already installed");
    }
    true
}
