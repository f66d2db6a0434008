//! 数据加载模块
//!
//! 提供巡线数据集的加载、增强、划分与批处理功能。
//!
//! # 主要组件
//!
//! - [`XYDataset`]: 目标值编码在文件名中的巡线图像数据集
//! - [`XYTransform`]: 单次访问时的增强管线（翻转、颜色抖动、缩放、标准化）
//! - [`random_split`]: 训练/测试集随机划分
//! - [`DataLoader`]: `PyTorch` 风格的多线程数据批量加载器
//! - [`label`]: 文件名标签编解码
//! - [`synthetic`]: 合成数据集生成
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use road_following::data::{DataLoader, XYDataset, random_split};
//!
//! let dataset = Arc::new(XYDataset::new("dataset_xy", false)?);
//! let (train, test) = random_split(dataset, 0.1, &mut rand::thread_rng());
//! let loader = DataLoader::new(train, 16).shuffle(true).num_workers(4);
//!
//! for batch in loader.iter() {
//!     let (images, targets) = batch?;
//!     // ...
//! }
//! ```

mod dataloader;
mod dataset;
pub mod error;
pub mod label;
mod split;
pub mod synthetic;

#[cfg(test)]
mod tests;

// Re-exports
pub use dataloader::{Batch, DataLoader, DataLoaderIter, load_batch};
pub use dataset::{Dataset, Subset, XYDataset, XYSample, XYTransform};
pub use error::DataError;
pub use split::{random_split, split_sizes};
