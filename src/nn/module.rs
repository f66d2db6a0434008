/*
 * @Description  : Module trait 定义
 *
 * 模型由一串`Layer`顺序组成：前向按顺序、反向按逆序逐层传递。
 * 检查点即层列表的`bincode`编码（各层缓存不参与序列化）。
 */

use super::NnError;
use super::layer::{Layer, Parameter, TraitLayer};
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// 检查点文件内容
#[derive(Debug, Serialize, Deserialize)]
pub struct Checkpoint<'a> {
    pub layers: Cow<'a, [Layer]>,
}

impl Checkpoint<'static> {
    /// 从文件读取检查点
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, NnError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }
}

/// 模块 trait
///
/// 只需实现`layers()`与`layers_mut()`，其余方法均由层列表推出。
///
/// # 使用示例
/// ```ignore
/// model.zero_grad();
/// let output = model.forward(&images)?;
/// let (loss, grad) = criterion.forward(&output, &targets)?;
/// model.backward(&grad)?;
/// optimizer.step(model.parameters_mut())?;
/// ```
pub trait Module {
    fn layers(&self) -> &[Layer];

    fn layers_mut(&mut self) -> &mut [Layer];

    /// 前向传播
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, NnError> {
        let mut iter = self.layers_mut().iter_mut();
        let Some(first) = iter.next() else {
            return Ok(input.clone());
        };
        let mut x = first.forward(input)?;
        for layer in iter {
            x = layer.forward(&x)?;
        }
        Ok(x)
    }

    /// 反向传播：把梯度累加到各参数上，返回对输入的梯度
    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, NnError> {
        let mut grad = grad_output.clone();
        for layer in self.layers_mut().iter_mut().rev() {
            grad = layer.backward(&grad)?;
        }
        Ok(grad)
    }

    /// 获取所有可训练参数
    fn parameters(&self) -> Vec<&Parameter> {
        self.layers().iter().flat_map(|layer| layer.parameters()).collect()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        self.layers_mut()
            .iter_mut()
            .flat_map(|layer| layer.parameters_mut())
            .collect()
    }

    /// 清空所有参数的梯度
    fn zero_grad(&mut self) {
        for parameter in self.parameters_mut() {
            parameter.zero_grad();
        }
    }

    /// 获取参数数量
    fn num_params(&self) -> usize {
        self.parameters().iter().map(|p| p.value().size()).sum()
    }

    /// 保存到检查点文件（覆盖已有文件）
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), NnError>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let checkpoint = Checkpoint {
            layers: Cow::Borrowed(self.layers()),
        };
        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, &checkpoint)?;
        // 缓冲区在 drop 时的写入错误会被吞掉，须显式 flush
        writer.flush()?;
        Ok(())
    }

    /// 从检查点文件加载全部参数；网络结构须与检查点完全一致
    fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), NnError>
    where
        Self: Sized,
    {
        let checkpoint = Checkpoint::read_from(path)?;
        if checkpoint.layers.len() != self.layers().len() {
            return Err(NnError::IncompatibleCheckpoint(format!(
                "层数不同：检查点{}层，当前网络{}层",
                checkpoint.layers.len(),
                self.layers().len()
            )));
        }
        copy_parameters(self.layers_mut(), &checkpoint.layers)
    }
}

/// 把`source`各层的参数值拷贝到`target`对应层；先整体校验再拷贝，失败时`target`不变
pub(crate) fn copy_parameters(target: &mut [Layer], source: &[Layer]) -> Result<(), NnError> {
    for (dst, src) in target.iter().zip(source) {
        if dst.kind() != src.kind() || dst.name() != src.name() {
            return Err(NnError::IncompatibleCheckpoint(format!(
                "层不匹配：期望{}({})，检查点为{}({})",
                dst.kind(),
                dst.name(),
                src.kind(),
                src.name()
            )));
        }
        let (dst_params, src_params) = (dst.parameters(), src.parameters());
        if dst_params.len() != src_params.len() {
            return Err(NnError::IncompatibleCheckpoint(format!(
                "{}的参数个数不同",
                dst.name()
            )));
        }
        for (d, s) in dst_params.iter().zip(&src_params) {
            if !d.value().is_same_shape(s.value()) {
                return Err(NnError::IncompatibleCheckpoint(format!(
                    "参数{}形状不同：期望{:?}，检查点为{:?}",
                    d.name(),
                    d.value().shape(),
                    s.value().shape()
                )));
            }
        }
    }

    for (dst, src) in target.iter_mut().zip(source) {
        for (d, s) in dst.parameters_mut().into_iter().zip(src.parameters()) {
            *d.value_mut() = s.value().clone();
            d.zero_grad();
        }
    }
    Ok(())
}
