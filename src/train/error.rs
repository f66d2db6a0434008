//! 训练相关错误类型定义

use crate::data::DataError;
use crate::nn::NnError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainError {
    /// 数据加载错误
    #[error(transparent)]
    Data(#[from] DataError),

    /// 网络前向/反向传播或检查点读写错误
    #[error(transparent)]
    Nn(#[from] NnError),

    /// 配置文件解析错误
    #[error("配置解析错误: {0}")]
    Config(#[from] serde_json::Error),

    /// 配置文件读取错误
    #[error("配置读取错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置取值非法
    #[error("配置无效: {0}")]
    InvalidConfig(String),

    /// 损失出现 NaN/Inf，训练无法继续
    #[error("第{epoch}轮出现非有限损失")]
    NonFiniteLoss { epoch: usize },
}
