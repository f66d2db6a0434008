/*
 * @Description  : 损失函数（PyTorch 风格 API）
 */

use super::NnError;
use crate::tensor::Tensor;

/// Reduction 模式
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Reduction {
    /// 对所有元素求平均（默认）
    #[default]
    Mean,
    /// 对所有元素求和
    Sum,
}

/// MSE（均方误差）损失
///
/// ## 公式
/// - Mean reduction: `MSE = mean((input - target)^2) = sum((input - target)^2) / N`
/// - Sum reduction: `MSE = sum((input - target)^2)`
///
/// ## 梯度
/// - Mean: `∂L/∂input = 2 * (input - target) / N`
/// - Sum: `∂L/∂input = 2 * (input - target)`
///
/// ## 参考
/// - `PyTorch`: `torch.nn.MSELoss`
///
/// # 使用示例
/// ```ignore
/// let criterion = MseLoss::new();
/// let (loss, grad) = criterion.forward(&output, &targets)?;
/// model.backward(&grad)?;
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct MseLoss {
    reduction: Reduction,
}

impl MseLoss {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reduction(reduction: Reduction) -> Self {
        Self { reduction }
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    /// 计算损失值及其对`input`的梯度
    pub fn forward(&self, input: &Tensor, target: &Tensor) -> Result<(f32, Tensor), NnError> {
        if !input.is_same_shape(target) {
            return Err(NnError::ShapeMismatch {
                expected: input.shape().to_vec(),
                got: target.shape().to_vec(),
                message: "MSE 的预测值与目标值形状须一致".to_string(),
            });
        }
        let n = input.size();
        if n == 0 {
            return Ok((0.0, Tensor::zeros(input.shape())));
        }

        let diff = input - target;
        let sum: f32 = diff.as_slice().iter().map(|d| d * d).sum();
        let (loss, scale) = match self.reduction {
            Reduction::Mean => (sum / n as f32, 2.0 / n as f32),
            Reduction::Sum => (sum, 2.0),
        };
        Ok((loss, &diff * scale))
    }

    /// 只计算损失值（评估时使用）
    pub fn loss(&self, input: &Tensor, target: &Tensor) -> Result<f32, NnError> {
        self.forward(input, target).map(|(loss, _)| loss)
    }
}
