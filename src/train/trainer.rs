/*
 * @Description  : 训练循环
 *
 * 每一轮：遍历训练集（前向 → MSE → 反向 → Adam 更新），再在测试集上求平均损失
 * （不反向、不更新）。测试损失严格低于此前所有轮次时覆盖写入检查点。
 */

use super::{TrainConfig, TrainError};
use crate::data::{DataError, DataLoader, Dataset, XYDataset, random_split};
use crate::nn::{Adam, Module, MseLoss, Optimizer, SteeringNet};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// 记录迄今最低的测试损失，初值为`+∞`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestCheckpoint {
    best: f32,
}

impl Default for BestCheckpoint {
    fn default() -> Self {
        Self { best: f32::INFINITY }
    }
}

impl BestCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best(&self) -> f32 {
        self.best
    }

    /// 若`loss`严格小于已有最佳值则记录并返回`true`（此时应写检查点）；相等或 NaN 均返回`false`
    pub fn observe(&mut self, loss: f32) -> bool {
        if loss < self.best {
            self.best = loss;
            true
        } else {
            false
        }
    }
}

/// 单轮统计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    /// 轮次，从 1 开始
    pub epoch: usize,
    pub train_loss: f32,
    pub test_loss: f32,
    /// 本轮是否刷新了最佳测试损失（即写了检查点）
    pub improved: bool,
}

/// 一次`fit`的结果
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub epochs: Vec<EpochStats>,
    pub best_epoch: Option<usize>,
    pub best_test_loss: f32,
}

pub struct Trainer<M> {
    model: M,
    optimizer: Adam,
    criterion: MseLoss,
    checkpoint_path: PathBuf,
    best: BestCheckpoint,
}

impl<M: Module> Trainer<M> {
    pub fn new<P: AsRef<Path>>(model: M, optimizer: Adam, checkpoint_path: P) -> Self {
        Self {
            model,
            optimizer,
            criterion: MseLoss::new(),
            checkpoint_path: checkpoint_path.as_ref().to_path_buf(),
            best: BestCheckpoint::new(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    pub fn checkpoint_path(&self) -> &Path {
        &self.checkpoint_path
    }

    pub fn best(&self) -> &BestCheckpoint {
        &self.best
    }

    /// 训练一轮，返回各批次损失的平均值
    pub fn train_epoch<D: Dataset + 'static>(
        &mut self,
        loader: &DataLoader<D>,
    ) -> Result<f32, TrainError> {
        let mut total = 0.0;
        let mut batches = 0usize;
        for batch in loader.iter() {
            let (images, targets) = batch?;
            self.model.zero_grad();
            let output = self.model.forward(&images)?;
            let (loss, grad) = self.criterion.forward(&output, &targets)?;
            self.model.backward(&grad)?;
            self.optimizer.step(self.model.parameters_mut())?;

            tracing::debug!("训练批次{batches}: loss = {loss}");
            total += loss;
            batches += 1;
        }
        Ok(total / batches as f32)
    }

    /// 在`loader`上求各批次损失的平均值，不更新参数
    pub fn evaluate<D: Dataset + 'static>(
        &mut self,
        loader: &DataLoader<D>,
    ) -> Result<f32, TrainError> {
        let mut total = 0.0;
        let mut batches = 0usize;
        for batch in loader.iter() {
            let (images, targets) = batch?;
            let output = self.model.forward(&images)?;
            total += self.criterion.loss(&output, &targets)?;
            batches += 1;
        }
        Ok(total / batches as f32)
    }

    /// 完整训练：共`epochs`轮，每轮打印`<轮次>: <训练损失>, <测试损失>`
    pub fn fit<D: Dataset + 'static, E: Dataset + 'static>(
        &mut self,
        train_loader: &DataLoader<D>,
        test_loader: &DataLoader<E>,
        epochs: usize,
    ) -> Result<TrainReport, TrainError> {
        if train_loader.num_batches() == 0 || test_loader.num_batches() == 0 {
            return Err(TrainError::InvalidConfig(format!(
                "训练集（{}个样本）与测试集（{}个样本）都不能为空",
                train_loader.len(),
                test_loader.len()
            )));
        }

        let mut report = TrainReport {
            epochs: Vec::with_capacity(epochs),
            best_epoch: None,
            best_test_loss: self.best.best(),
        };

        for epoch in 1..=epochs {
            let epoch_start = Instant::now();
            let train_loss = self.train_epoch(train_loader)?;
            let test_loss = self.evaluate(test_loader)?;
            if !train_loss.is_finite() || !test_loss.is_finite() {
                return Err(TrainError::NonFiniteLoss { epoch });
            }

            let improved = self.best.observe(test_loss);
            if improved {
                self.model.save(&self.checkpoint_path)?;
                report.best_epoch = Some(epoch);
                report.best_test_loss = test_loss;
                tracing::info!(
                    "第{epoch}轮测试损失{test_loss:.6}创新低，检查点已写入{}",
                    self.checkpoint_path.display()
                );
            }

            println!("{epoch}: {train_loss:.6}, {test_loss:.6}");
            tracing::debug!("第{epoch}轮耗时{:.2}s", epoch_start.elapsed().as_secs_f32());
            report.epochs.push(EpochStats {
                epoch,
                train_loss,
                test_loss,
                improved,
            });
        }
        Ok(report)
    }
}

/// 按配置完成一次训练：加载数据集 → 划分 → 构建加载器与网络 → 训练并保存最佳检查点
pub fn run(config: &TrainConfig) -> Result<TrainReport, TrainError> {
    config.validate()?;

    let dataset = Arc::new(XYDataset::new(&config.data_dir, config.random_hflips)?);
    if dataset.is_empty() {
        return Err(DataError::EmptyDataset(config.data_dir.clone()).into());
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (train_set, test_set) = random_split(dataset, config.test_fraction, &mut rng);

    let mut train_loader = DataLoader::new(train_set, config.batch_size)
        .shuffle(true)
        .num_workers(config.num_workers);
    let mut test_loader = DataLoader::new(test_set, config.batch_size)
        .shuffle(true)
        .num_workers(config.num_workers);
    if let Some(seed) = config.seed {
        train_loader = train_loader.seed(seed);
        test_loader = test_loader.seed(seed.wrapping_add(1));
    }

    let mut model = SteeringNet::new(config.network.clone(), &mut rng);
    if let Some(path) = &config.pretrained_backbone {
        model.load_backbone(path)?;
    }
    tracing::info!("网络参数量：{}", model.num_params());

    let mut trainer = Trainer::new(
        model,
        Adam::new_default(config.learning_rate),
        &config.checkpoint_path,
    );
    trainer.fit(&train_loader, &test_loader, config.epochs)
}
