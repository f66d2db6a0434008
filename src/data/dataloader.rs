/*
 * @Description  : DataLoader - PyTorch 风格的数据批量加载器
 *
 * 提供统一的数据迭代 API，支持：
 * - 自动分批 (batch_size)
 * - 每轮重新随机打乱 (shuffle)
 * - 丢弃不完整批次 (drop_last)
 * - 多线程预取 (num_workers)：加载线程从任务队列领取批次索引，读取、增强、拼接后
 *   送入容量为`prefetch`的有界队列；不同线程产出的批次先到先得，不保证顺序
 */

use super::DataError;
use super::dataset::Dataset;
use crate::tensor::Tensor;
use crossbeam_channel::{Receiver, bounded, unbounded};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

/// 一个批次：`(输入[B, ...], 目标[B, ...])`
pub type Batch = (Tensor, Tensor);

/// DataLoader - PyTorch 风格的数据批量加载器
///
/// # 示例
/// ```ignore
/// let loader = DataLoader::new(train_set, 16)
///     .shuffle(true)
///     .num_workers(4);
///
/// for batch in loader.iter() {
///     let (images, targets) = batch?;
///     // ...
/// }
/// ```
pub struct DataLoader<D> {
    dataset: Arc<D>,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    seed: Option<u64>,
    num_workers: usize,
    prefetch: Option<usize>,
    /// 已开始的轮数，带种子时用于让每轮的打乱顺序不同
    passes: AtomicU64,
}

impl<D: Dataset + 'static> DataLoader<D> {
    /// 创建新的 DataLoader
    ///
    /// # 参数
    /// - `dataset`: 数据集
    /// - `batch_size`: 批大小
    pub fn new(dataset: D, batch_size: usize) -> Self {
        Self::from_arc(Arc::new(dataset), batch_size)
    }

    /// 同`new`，但与其他持有者共享数据集
    pub fn from_arc(dataset: Arc<D>, batch_size: usize) -> Self {
        assert!(batch_size > 0, "DataLoader: batch_size 必须大于 0");
        Self {
            dataset,
            batch_size,
            shuffle: false,
            drop_last: false,
            seed: None,
            num_workers: 0,
            prefetch: None,
            passes: AtomicU64::new(0),
        }
    }

    /// 设置是否打乱数据（每次`iter()`重新打乱）
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// 设置是否丢弃最后一个不完整的批次
    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// 设置随机种子（用于 shuffle）
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 设置加载线程数；0 表示在调用线程上同步加载
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// 设置预取队列容量（默认为`2 * num_workers`）
    pub fn prefetch(mut self, prefetch: usize) -> Self {
        self.prefetch = Some(prefetch.max(1));
        self
    }

    /// 获取批次数量
    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }

    /// 获取数据集大小
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// 检查是否为空
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn dataset(&self) -> &Arc<D> {
        &self.dataset
    }

    /// 开始新的一轮迭代
    pub fn iter(&self) -> DataLoaderIter<D> {
        let batches = self.plan_batches();
        let remaining = batches.len();

        let inner = if self.num_workers == 0 {
            IterKind::Sync {
                dataset: Arc::clone(&self.dataset),
                batches,
            }
        } else {
            self.spawn_workers(batches)
        };

        DataLoaderIter { inner, remaining }
    }

    /// 生成本轮的批次索引
    fn plan_batches(&self) -> VecDeque<Vec<usize>> {
        let n = self.dataset.len();
        let mut indices: Vec<usize> = (0..n).collect();
        let pass = self.passes.fetch_add(1, Ordering::Relaxed);

        if self.shuffle {
            if let Some(seed) = self.seed {
                let mut rng = rand::rngs::StdRng::seed_from_u64(seed.wrapping_add(pass));
                indices.shuffle(&mut rng);
            } else {
                indices.shuffle(&mut rand::thread_rng());
            }
        }

        indices
            .chunks(self.batch_size)
            .filter(|chunk| !self.drop_last || chunk.len() == self.batch_size)
            .map(<[usize]>::to_vec)
            .collect()
    }

    fn spawn_workers(&self, batches: VecDeque<Vec<usize>>) -> IterKind<D> {
        let (job_tx, job_rx) = unbounded::<Vec<usize>>();
        for job in batches {
            // 接收端此刻必然存活
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let capacity = self.prefetch.unwrap_or(2 * self.num_workers).max(1);
        let (tx, rx) = bounded(capacity);

        for worker_id in 0..self.num_workers {
            let job_rx = job_rx.clone();
            let tx = tx.clone();
            let dataset = Arc::clone(&self.dataset);
            thread::spawn(move || {
                tracing::debug!("加载线程{worker_id}启动");
                for job in job_rx.iter() {
                    let batch = load_batch(dataset.as_ref(), &job);
                    let failed = batch.is_err();
                    // 消费端已丢弃迭代器，或本线程出错，均直接退出
                    if tx.send(batch).is_err() || failed {
                        break;
                    }
                }
                tracing::debug!("加载线程{worker_id}退出");
            });
        }

        IterKind::Workers { rx }
    }
}

/// 按索引读取样本并拼接为一个批次
pub fn load_batch<D: Dataset + ?Sized>(dataset: &D, indices: &[usize]) -> Result<Batch, DataError> {
    let mut inputs = Vec::with_capacity(indices.len());
    let mut targets = Vec::with_capacity(indices.len());
    for &index in indices {
        let (input, target) = dataset.get(index)?;
        inputs.push(input);
        targets.push(target);
    }
    Ok((Tensor::stack(&inputs)?, Tensor::stack(&targets)?))
}

enum IterKind<D> {
    Sync {
        dataset: Arc<D>,
        batches: VecDeque<Vec<usize>>,
    },
    Workers {
        rx: Receiver<Result<Batch, DataError>>,
    },
}

/// DataLoader 迭代器；遇到第一个错误后即结束本轮
pub struct DataLoaderIter<D> {
    inner: IterKind<D>,
    remaining: usize,
}

impl<D> DataLoaderIter<D> {
    /// 本轮尚未送达的批次数
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<D: Dataset> Iterator for DataLoaderIter<D> {
    type Item = Result<Batch, DataError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let item = match &mut self.inner {
            IterKind::Sync { dataset, batches } => {
                let job = batches.pop_front()?;
                load_batch(dataset.as_ref(), &job)
            }
            IterKind::Workers { rx } => match rx.recv() {
                Ok(item) => item,
                Err(_) => Err(DataError::WorkerDisconnected {
                    remaining: self.remaining,
                }),
            },
        };

        self.remaining = if item.is_ok() { self.remaining - 1 } else { 0 };
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
