/*
 * @Description  : 张量的形状相关操作：堆叠
 */

use super::Tensor;
use crate::errors::TensorError;

impl Tensor {
    /// 将多个形状一致的张量沿新增的首个维度堆叠起来，返回一个新的张量。
    /// 如：16个[3, 224, 224]的图像张量堆叠为[16, 3, 224, 224]的批次张量。
    pub fn stack(tensors: &[Self]) -> Result<Self, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        if let Some(bad) = tensors.iter().find(|t| !t.is_same_shape(first)) {
            return Err(TensorError::InconsistentShape {
                expected: first.shape().to_vec(),
                got: bad.shape().to_vec(),
            });
        }

        let mut data = Vec::with_capacity(first.size() * tensors.len());
        for t in tensors {
            data.extend_from_slice(t.as_slice());
        }

        let mut shape = first.shape().to_vec();
        shape.insert(0, tensors.len());
        Ok(Self::from_vec(data, &shape))
    }
}
