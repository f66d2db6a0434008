/*
 * @Description  : SteeringNet：巡线转向回归网络
 *
 * 结构（以默认通道数为例）：
 *   conv1 3→16  k5 s4 p2 + ReLU
 *   conv2 16→32 k3 s2 p1 + ReLU
 *   conv3 32→64 k3 s2 p1 + ReLU
 *   全局平均池化 → Linear(64→2) 回归头
 *
 * 输入 [B, 3, H, W]，输出 [B, 2]（目标点 x、y）。
 */

use super::layer::{Conv2d, GlobalAvgPool, Layer, Linear, ReLU};
use super::module::{Checkpoint, Module, copy_parameters};
use super::NnError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 网络结构配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SteeringNetConfig {
    /// 输入通道数
    pub in_channels: usize,
    /// 各卷积层的输出通道数；第一层为 k5 s4 p2，其余为 k3 s2 p1
    pub channels: Vec<usize>,
    /// 回归输出个数
    pub outputs: usize,
}

impl Default for SteeringNetConfig {
    fn default() -> Self {
        Self {
            in_channels: 3,
            channels: vec![16, 32, 64],
            outputs: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SteeringNet {
    config: SteeringNetConfig,
    layers: Vec<Layer>,
}

impl SteeringNet {
    /// 按配置构建网络，参数由`rng`初始化
    pub fn new<R: Rng + ?Sized>(config: SteeringNetConfig, rng: &mut R) -> Self {
        let mut layers = Vec::with_capacity(2 * config.channels.len() + 2);
        let mut in_c = config.in_channels;
        for (i, &out_c) in config.channels.iter().enumerate() {
            let (kernel, stride, padding) = if i == 0 { (5, 4, 2) } else { (3, 2, 1) };
            layers.push(Layer::from(Conv2d::new(
                in_c,
                out_c,
                (kernel, kernel),
                (stride, stride),
                (padding, padding),
                &format!("conv{}", i + 1),
                rng,
            )));
            layers.push(Layer::from(ReLU::new(&format!("relu{}", i + 1))));
            in_c = out_c;
        }
        layers.push(Layer::from(GlobalAvgPool::new("pool")));
        layers.push(Layer::from(Linear::new(in_c, config.outputs, "head", rng)));
        Self { config, layers }
    }

    /// 同`new`，但参数初始化由`seed`决定
    pub fn new_seeded(config: SteeringNetConfig, seed: u64) -> Self {
        Self::new(config, &mut StdRng::seed_from_u64(seed))
    }

    pub fn config(&self) -> &SteeringNetConfig {
        &self.config
    }

    /// 主干层（除回归头外的全部层）的个数
    pub fn backbone_len(&self) -> usize {
        self.layers.len() - 1
    }

    /// 从检查点载入主干参数，回归头保持当前（新初始化的）参数
    ///
    /// 检查点只需以相同的主干层开头，其后的层（例如别的任务的输出头）被忽略。
    pub fn load_backbone<P: AsRef<Path>>(&mut self, path: P) -> Result<(), NnError> {
        let path = path.as_ref();
        let checkpoint = Checkpoint::read_from(path)?;
        let backbone_len = self.backbone_len();
        if checkpoint.layers.len() < backbone_len {
            return Err(NnError::IncompatibleCheckpoint(format!(
                "检查点只有{}层，主干需要{}层",
                checkpoint.layers.len(),
                backbone_len
            )));
        }
        copy_parameters(
            &mut self.layers[..backbone_len],
            &checkpoint.layers[..backbone_len],
        )?;
        tracing::info!("已从{}载入预训练主干（{}层）", path.display(), backbone_len);
        Ok(())
    }
}

impl Module for SteeringNet {
    fn layers(&self) -> &[Layer] {
        &self.layers
    }

    fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }
}
