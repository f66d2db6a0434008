//! 训练模块
//!
//! [`TrainConfig`]保存一次运行的全部常量，[`Trainer`]执行轮次循环并按测试损失保留最佳检查点，
//! [`run`]把数据集、划分、加载器、网络与训练串成一次调用。

mod config;
mod error;
mod trainer;

#[cfg(test)]
mod tests;

pub use config::TrainConfig;
pub use error::TrainError;
pub use trainer::{BestCheckpoint, EpochStats, TrainReport, Trainer, run};
