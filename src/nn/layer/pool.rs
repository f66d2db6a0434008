/*
 * @Description  : GlobalAvgPool 层：对每个通道在空间维度上求平均
 *
 * - 输入：[batch_size, C, H, W]
 * - 输出：[batch_size, C]
 */

use super::{TraitLayer, expect_rank};
use crate::nn::NnError;
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalAvgPool {
    name: String,
    #[serde(skip)]
    input_shape: Option<Vec<usize>>,
}

impl GlobalAvgPool {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            input_shape: None,
        }
    }
}

impl TraitLayer for GlobalAvgPool {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor, NnError> {
        expect_rank(&self.name, input, 4)?;
        let shape = input.shape();
        let (batch_size, channels) = (shape[0], shape[1]);
        let area = shape[2] * shape[3];
        if area == 0 {
            return Err(NnError::ShapeMismatch {
                expected: vec![batch_size, channels, 1, 1],
                got: shape.to_vec(),
                message: format!("{}的输入空间尺寸不能为 0", self.name),
            });
        }

        let output: Vec<f32> = input
            .as_slice()
            .chunks_exact(area)
            .map(|plane| plane.iter().sum::<f32>() / area as f32)
            .collect();
        self.input_shape = Some(shape.to_vec());
        Ok(Tensor::from_vec(output, &[batch_size, channels]))
    }

    /// 每个输入位置得到所在通道梯度的 1/(H*W)
    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, NnError> {
        let input_shape = self
            .input_shape
            .as_ref()
            .ok_or_else(|| NnError::MissingCache(self.name.clone()))?;
        let expected = &input_shape[..2];
        if grad_output.shape() != expected {
            return Err(NnError::ShapeMismatch {
                expected: expected.to_vec(),
                got: grad_output.shape().to_vec(),
                message: format!("{}的输出梯度形状须与前向输出一致", self.name),
            });
        }

        let area = input_shape[2] * input_shape[3];
        let scale = 1.0 / area as f32;
        let grad: Vec<f32> = grad_output
            .as_slice()
            .iter()
            .flat_map(|&g| std::iter::repeat_n(g * scale, area))
            .collect();
        Ok(Tensor::from_vec(grad, input_shape))
    }
}
