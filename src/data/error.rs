//! 数据加载错误类型定义

use crate::errors::TensorError;
use std::path::PathBuf;
use thiserror::Error;

/// 数据加载相关错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 文件（或目录）未找到
    #[error("文件未找到: {0}")]
    FileNotFound(PathBuf),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 图像解码/编码错误
    #[error("图像错误: {0}")]
    ImageError(#[from] image::ImageError),

    /// 文件名不符合`xy_XXX_YYY_<id>.jpg`的约定
    #[error("无法从文件名`{name}`解析目标值: {reason}")]
    InvalidFileName { name: String, reason: String },

    /// 索引越界
    #[error("索引越界: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// 数据集为空
    #[error("数据集为空: {0}")]
    EmptyDataset(PathBuf),

    /// 加载线程异常退出
    #[error("数据加载线程已断开，尚有{remaining}个批次未送达")]
    WorkerDisconnected { remaining: usize },

    /// 批次拼接时的张量错误
    #[error("张量错误: {0}")]
    Tensor(#[from] TensorError),
}
