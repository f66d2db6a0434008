//! 训练配置：一次训练运行的全部常量

use super::TrainError;
use crate::nn::SteeringNetConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    /// 数据集目录（`xy_XXX_YYY_<id>.jpg`）
    pub data_dir: PathBuf,
    /// 最佳模型检查点路径，每出现更低的测试损失就覆盖一次
    pub checkpoint_path: PathBuf,
    pub epochs: usize,
    pub batch_size: usize,
    /// 测试集占比，测试集大小为`floor(test_fraction * N)`
    pub test_fraction: f64,
    /// 数据加载线程数，0 表示在训练线程上同步加载
    pub num_workers: usize,
    /// 是否随机水平翻转（同时取反 x）
    pub random_hflips: bool,
    /// 预训练主干检查点，不设则从随机初始化开始
    pub pretrained_backbone: Option<PathBuf>,
    /// 随机种子（网络初始化、划分与打乱），不设则每次运行都不同
    pub seed: Option<u64>,
    pub learning_rate: f32,
    pub network: SteeringNetConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("dataset_xy"),
            checkpoint_path: PathBuf::from("best_steering_model_xy.bin"),
            epochs: 50,
            batch_size: 16,
            test_fraction: 0.1,
            num_workers: 4,
            random_hflips: false,
            pretrained_backbone: None,
            seed: None,
            learning_rate: 1e-3,
            network: SteeringNetConfig::default(),
        }
    }
}

impl TrainConfig {
    /// 从 JSON 文件读取配置，缺省字段取默认值；出现未知字段（如拼写错误）时报错
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TrainError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// 检查取值范围
    pub fn validate(&self) -> Result<(), TrainError> {
        if self.batch_size == 0 {
            return Err(TrainError::InvalidConfig("batch_size 必须大于 0".to_string()));
        }
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(TrainError::InvalidConfig(format!(
                "test_fraction 须在 [0, 1) 内，实际为 {}",
                self.test_fraction
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainError::InvalidConfig(format!(
                "learning_rate 须为正数，实际为 {}",
                self.learning_rate
            )));
        }
        if self.network.channels.is_empty() {
            return Err(TrainError::InvalidConfig("network.channels 不能为空".to_string()));
        }
        Ok(())
    }
}
