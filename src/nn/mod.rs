//! 神经网络模块
//!
//! 转向回归网络及其训练所需的全部组件：带手写反向传播的网络层、
//! [`SteeringNet`]、[`MseLoss`]、[`Adam`]优化器以及检查点读写。

mod error;
pub mod layer;
mod loss;
mod module;
pub mod optimizer;
mod steering_net;

#[cfg(test)]
mod tests;

pub use error::NnError;
pub use layer::{Layer, Parameter, TraitLayer};
pub use loss::{MseLoss, Reduction};
pub use module::{Checkpoint, Module};
pub use optimizer::{Adam, Optimizer};
pub use steering_net::{SteeringNet, SteeringNetConfig};
