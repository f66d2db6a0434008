/*
 * @Description  : 网络层。
 *
 * 每个层在`forward`中缓存反向传播所需的数据，`backward`接收输出梯度、
 * 把参数梯度累加到各自的`Parameter`上，并返回输入梯度。
 * 所有层统一为`Layer`枚举，经`enum_dispatch`静态分发，且可整体序列化为检查点
 * （缓存不参与序列化）。
 */

use crate::nn::NnError;
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

mod conv2d;
mod linear;
mod pool;
mod relu;

pub use conv2d::Conv2d;
pub use linear::Linear;
pub use pool::GlobalAvgPool;
pub use relu::ReLU;

/// 可训练参数：取值与（按需创建的）梯度
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    value: Tensor,
    #[serde(skip)]
    grad: Option<Tensor>,
}

impl Parameter {
    pub fn new(name: &str, value: Tensor) -> Self {
        Self {
            name: name.to_string(),
            value,
            grad: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Tensor {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Tensor {
        &mut self.value
    }

    /// 同时取得取值的可变引用与梯度（优化器用）
    pub fn value_and_grad_mut(&mut self) -> (&mut Tensor, Option<&Tensor>) {
        (&mut self.value, self.grad.as_ref())
    }

    pub fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    /// 累加梯度（同一批次内可能多次反向传播）
    pub fn accumulate_grad(&mut self, grad: &Tensor) -> Result<(), NnError> {
        if !grad.is_same_shape(&self.value) {
            return Err(NnError::ShapeMismatch {
                expected: self.value.shape().to_vec(),
                got: grad.shape().to_vec(),
                message: format!("参数{}的梯度形状须与取值一致", self.name),
            });
        }
        match &mut self.grad {
            Some(g) => *g += grad,
            None => self.grad = Some(grad.clone()),
        }
        Ok(())
    }

    pub fn zero_grad(&mut self) {
        self.grad = None;
    }
}

/// 层的公共行为
#[enum_dispatch]
pub trait TraitLayer {
    /// 层名称（如`conv1`）
    fn name(&self) -> &str;

    /// 前向传播，同时缓存反向传播所需数据
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, NnError>;

    /// 反向传播：累加参数梯度并返回输入梯度
    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, NnError>;

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        Vec::new()
    }
}

#[enum_dispatch(TraitLayer)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Layer {
    Conv2d(Conv2d),
    ReLU(ReLU),
    GlobalAvgPool(GlobalAvgPool),
    Linear(Linear),
}

impl Layer {
    /// 层的种类名，用于检查点兼容性提示
    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Conv2d(_) => "Conv2d",
            Layer::ReLU(_) => "ReLU",
            Layer::GlobalAvgPool(_) => "GlobalAvgPool",
            Layer::Linear(_) => "Linear",
        }
    }
}

/// 检查输入维数，供各层复用
pub(crate) fn expect_rank(layer: &str, input: &Tensor, rank: usize) -> Result<(), NnError> {
    if input.dimension() != rank {
        return Err(NnError::ShapeMismatch {
            expected: vec![0; rank],
            got: input.shape().to_vec(),
            message: format!("{layer}的输入须为{rank}维张量"),
        });
    }
    Ok(())
}
