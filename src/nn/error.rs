//! 网络相关错误类型定义

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NnError {
    /// 输入/梯度形状与层的期望不符
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}。{message}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    /// 未经`forward`就调用了`backward`
    #[error("{0}尚未执行前向传播，无法反向传播")]
    MissingCache(String),

    /// 检查点与当前网络结构不一致
    #[error("检查点与网络结构不兼容: {0}")]
    IncompatibleCheckpoint(String),

    /// 检查点（反）序列化失败
    #[error("序列化错误: {0}")]
    Serialization(#[from] bincode::Error),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),
}
