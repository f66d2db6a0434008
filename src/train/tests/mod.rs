
use crate::data::{DataError, Dataset};
use crate::tensor::Tensor;

/// 内存中的小数据集：随机图像，目标只取决于图像均值
pub(super) struct TensorDataset {
    images: Vec<Tensor>,
    targets: Vec<Tensor>,
}

impl TensorDataset {
    pub(super) fn new(len: usize, size: usize) -> Self {
        let images: Vec<Tensor> = (0..len)
            .map(|i| Tensor::new_uniform_seeded(-1.0, 1.0, &[3, size, size], i as u64))
            .collect();
        let targets = images
            .iter()
            .map(|image| {
                let m = image.mean();
                Tensor::new(&[m, -m], &[2])
            })
            .collect();
        Self { images, targets }
    }
}

impl Dataset for TensorDataset {
    fn len(&self) -> usize {
        self.images.len()
    }

    fn get(&self, index: usize) -> Result<(Tensor, Tensor), DataError> {
        match (self.images.get(index), self.targets.get(index)) {
            (Some(image), Some(target)) => Ok((image.clone(), target.clone())),
            _ => Err(DataError::IndexOutOfBounds {
                index,
                len: self.len(),
            }),
        }
    }
}
