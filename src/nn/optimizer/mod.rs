/*
 * @Description  : 优化器模块，实现 PyTorch 风格的梯度优化算法
 */

mod adam;

pub use adam::Adam;

use super::{NnError, Parameter};

/// 优化器核心 trait
pub trait Optimizer {
    /// 参数更新（使用已累加的梯度）
    ///
    /// `PyTorch` 风格训练循环：
    /// ```ignore
    /// model.zero_grad();
    /// let output = model.forward(&images)?;
    /// let (loss, grad) = criterion.forward(&output, &targets)?;
    /// model.backward(&grad)?;
    /// optimizer.step(model.parameters_mut())?; // ← 只更新参数，不做 forward/backward
    /// ```
    ///
    /// 没有梯度的参数保持不变。
    fn step(&mut self, parameters: Vec<&mut Parameter>) -> Result<(), NnError>;

    /// 重置累积状态
    fn reset(&mut self);

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);
}
