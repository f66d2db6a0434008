/*
 * @Description  : Linear (全连接) 层
 *
 * 计算：output = x @ W + b
 * - 输入：[batch_size, in_features]
 * - 输出：[batch_size, out_features]
 */

use super::{Parameter, TraitLayer, expect_rank};
use crate::nn::NnError;
use crate::tensor::Tensor;
use ndarray::{ArrayView2, Axis, Ix1, Ix2};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Linear {
    name: String,
    /// 权重参数 [in_features, out_features]
    weights: Parameter,
    /// 偏置参数 [out_features]
    bias: Parameter,
    in_features: usize,
    out_features: usize,
    #[serde(skip)]
    input: Option<Tensor>,
}

impl Linear {
    /// 创建新的 Linear 层
    ///
    /// 权重与偏置均按`U(-1/sqrt(in), 1/sqrt(in))`初始化（同 PyTorch `nn.Linear`）
    pub fn new<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        name: &str,
        rng: &mut R,
    ) -> Self {
        let bound = 1.0 / (in_features.max(1) as f32).sqrt();
        let weights = Tensor::new_uniform_with_rng(-bound, bound, &[in_features, out_features], rng);
        let bias = Tensor::new_uniform_with_rng(-bound, bound, &[out_features], rng);
        Self {
            name: name.to_string(),
            weights: Parameter::new(&format!("{name}.weights"), weights),
            bias: Parameter::new(&format!("{name}.bias"), bias),
            in_features,
            out_features,
            input: None,
        }
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn weights(&self) -> &Parameter {
        &self.weights
    }

    pub fn bias(&self) -> &Parameter {
        &self.bias
    }
}

impl TraitLayer for Linear {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor, NnError> {
        expect_rank(&self.name, input, 2)?;
        if input.shape()[1] != self.in_features {
            return Err(NnError::ShapeMismatch {
                expected: vec![input.shape()[0], self.in_features],
                got: input.shape().to_vec(),
                message: format!("{}的输入特征维度不符", self.name),
            });
        }
        let x = as_matrix(input)?;
        let w = as_matrix(self.weights.value())?;
        let b = self
            .bias
            .value()
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|_| NnError::ShapeMismatch {
                expected: vec![self.out_features],
                got: self.bias.value().shape().to_vec(),
                message: format!("{}的偏置须为一维", self.name),
            })?;

        let output = x.dot(&w) + &b;
        self.input = Some(input.clone());
        Ok(Tensor::from(output.into_dyn()))
    }

    /// - dL/dW = xᵀ @ dY
    /// - dL/db = sum(dY, axis=0)
    /// - dL/dx = dY @ Wᵀ
    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, NnError> {
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| NnError::MissingCache(self.name.clone()))?;
        let expected = [input.shape()[0], self.out_features];
        if grad_output.shape() != &expected[..] {
            return Err(NnError::ShapeMismatch {
                expected: expected.to_vec(),
                got: grad_output.shape().to_vec(),
                message: format!("{}的输出梯度形状须与前向输出一致", self.name),
            });
        }

        let x = as_matrix(input)?;
        let dy = as_matrix(grad_output)?;
        let grad_weights = x.t().dot(&dy);
        let grad_bias = dy.sum_axis(Axis(0));
        let grad_input = dy.dot(&as_matrix(self.weights.value())?.t());

        self.weights
            .accumulate_grad(&Tensor::from(grad_weights.into_dyn()))?;
        self.bias.accumulate_grad(&Tensor::from(grad_bias.into_dyn()))?;
        Ok(Tensor::from(grad_input.into_dyn()))
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.weights, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        vec![&mut self.weights, &mut self.bias]
    }
}

fn as_matrix(tensor: &Tensor) -> Result<ArrayView2<'_, f32>, NnError> {
    tensor
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| NnError::ShapeMismatch {
            expected: vec![0, 0],
            got: tensor.shape().to_vec(),
            message: "期望二维张量".to_string(),
        })
}
