//! # Road Following
//!
//! 小车巡线的转向回归训练器：从文件名标注的摄像头图像中学习目标点`(x, y)`，
//! 用纯 rust 实现数据增强、多线程批量加载、带手写反向传播的卷积网络与 Adam 训练循环，
//! 并按测试损失保留最佳检查点。
//!

pub mod data;
pub mod errors;
pub mod nn;
pub mod tensor;
pub mod train;
pub mod utils;
pub mod vision;
