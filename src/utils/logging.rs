//! 日志初始化
//!
//! 库内部只通过`tracing`宏输出诊断信息，由可执行程序（如 demo）决定是否安装订阅者。
//! 日志级别可用`RUST_LOG`覆盖。

use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

/// 安装全局`fmt`订阅者：`verbose`为真时默认级别为 debug，否则为 info
///
/// 已安装过全局订阅者时返回`TryInitError`，调用方可忽略。
pub fn init_logging(verbose: bool) -> Result<(), TryInitError> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
}
