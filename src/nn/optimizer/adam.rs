/*
 * @Description  : Adam优化器实现
 */

use super::Optimizer;
use crate::nn::{NnError, Parameter};
use crate::tensor::Tensor;
use std::collections::HashMap;

/// Adam优化器
///
/// 一阶、二阶矩估计按参数名保存，参数集合在训练过程中保持不变即可。
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// 一阶矩估计
    m: HashMap<String, Tensor>,
    /// 二阶矩估计
    v: HashMap<String, Tensor>,
    /// 时间步
    t: usize,
}

impl Adam {
    /// 创建新的Adam优化器
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: HashMap::new(),
            v: HashMap::new(),
            t: 0,
        }
    }

    /// 使用默认参数创建Adam优化器（β1 = 0.9, β2 = 0.999, ε = 1e-8）
    pub fn new_default(learning_rate: f32) -> Self {
        Self::new(learning_rate, 0.9, 0.999, 1e-8)
    }

    /// 已执行的更新步数
    pub fn steps(&self) -> usize {
        self.t
    }

    /// Adam 单个参数的更新
    fn update(&mut self, parameter: &mut Parameter) -> Result<(), NnError> {
        let name = parameter.name().to_string();
        let (value, grad) = parameter.value_and_grad_mut();
        let Some(grad) = grad else {
            return Ok(());
        };

        let m = self
            .m
            .entry(name.clone())
            .or_insert_with(|| Tensor::zeros(grad.shape()));
        let v = self
            .v
            .entry(name)
            .or_insert_with(|| Tensor::zeros(grad.shape()));
        if !m.is_same_shape(grad) || !value.is_same_shape(grad) {
            return Err(NnError::ShapeMismatch {
                expected: m.shape().to_vec(),
                got: grad.shape().to_vec(),
                message: "Adam 状态与参数梯度形状不一致".to_string(),
            });
        }

        // 偏差修正
        let bias1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias2 = 1.0 - self.beta2.powi(self.t as i32);

        for (((theta, &g), m), v) in value
            .as_slice_mut()
            .iter_mut()
            .zip(grad.as_slice())
            .zip(m.as_slice_mut())
            .zip(v.as_slice_mut())
        {
            // m = β1 * m + (1 - β1) * g
            *m = self.beta1 * *m + (1.0 - self.beta1) * g;
            // v = β2 * v + (1 - β2) * g²
            *v = self.beta2 * *v + (1.0 - self.beta2) * g * g;
            // θ = θ - α * m_hat / (√v_hat + ε)
            let m_hat = *m / bias1;
            let v_hat = *v / bias2;
            *theta -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
        Ok(())
    }
}

impl Optimizer for Adam {
    fn step(&mut self, parameters: Vec<&mut Parameter>) -> Result<(), NnError> {
        self.t += 1;
        for parameter in parameters {
            self.update(parameter)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}
