//! # 常用接口模块
//!
//! 本模块提供日志初始化与单元测试用的断言宏

pub mod logging;

#[cfg(test)]
mod tests;

pub use logging::init_logging;
