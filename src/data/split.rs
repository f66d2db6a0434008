//! 训练/测试集划分

use super::dataset::{Dataset, Subset};
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// 计算划分后的(训练集大小, 测试集大小)：测试集取`floor(len * test_fraction)`
pub fn split_sizes(len: usize, test_fraction: f64) -> (usize, usize) {
    let test_len = ((len as f64) * test_fraction.clamp(0.0, 1.0)).floor() as usize;
    let test_len = test_len.min(len);
    (len - test_len, test_len)
}

/// 随机（非分层）地将数据集划分为训练集与测试集，二者互不重叠且覆盖全部样本
///
/// # 示例
/// ```ignore
/// let dataset = Arc::new(XYDataset::new("dataset_xy", false)?);
/// let (train, test) = random_split(dataset, 0.1, &mut rand::thread_rng());
/// ```
pub fn random_split<D: Dataset, R: Rng + ?Sized>(
    dataset: Arc<D>,
    test_fraction: f64,
    rng: &mut R,
) -> (Subset<D>, Subset<D>) {
    let (train_len, test_len) = split_sizes(dataset.len(), test_fraction);
    let mut order: Vec<usize> = (0..dataset.len()).collect();
    order.shuffle(rng);

    let test_indices = order.split_off(train_len);
    debug_assert_eq!(test_indices.len(), test_len);

    tracing::info!("数据集划分：训练集{}个，测试集{}个", order.len(), test_indices.len());
    (
        Subset::new(Arc::clone(&dataset), order),
        Subset::new(dataset, test_indices),
    )
}
