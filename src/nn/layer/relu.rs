/*
 * @Description  : ReLU 激活层：y = max(0, x)
 */

use super::TraitLayer;
use crate::nn::NnError;
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReLU {
    name: String,
    #[serde(skip)]
    output: Option<Tensor>,
}

impl ReLU {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            output: None,
        }
    }
}

impl TraitLayer for ReLU {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor, NnError> {
        let output = input.map(|x| x.max(0.0));
        self.output = Some(output.clone());
        Ok(output)
    }

    /// x = 0 处的次梯度取 0
    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, NnError> {
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| NnError::MissingCache(self.name.clone()))?;
        if !output.is_same_shape(grad_output) {
            return Err(NnError::ShapeMismatch {
                expected: output.shape().to_vec(),
                got: grad_output.shape().to_vec(),
                message: format!("{}的输出梯度形状须与前向输出一致", self.name),
            });
        }
        let mut grad = grad_output.clone();
        grad.as_slice_mut()
            .iter_mut()
            .zip(output.as_slice())
            .for_each(|(g, &y)| {
                if y <= 0.0 {
                    *g = 0.0;
                }
            });
        Ok(grad)
    }
}
