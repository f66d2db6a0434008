/*
 * @Description  : 巡线数据集（XYDataset）及其增强管线。
 *
 * 构造时只列举一次目录并解析全部文件名标签；图像本身在每次访问时才从硬盘读取，
 * 且每次访问都重新抽取随机增强参数，同一样本多次读取会得到不同的结果。
 *
 * 单次访问的处理顺序：
 *   解码 → （可选）随机水平翻转并取反x → 颜色抖动 → 缩放 → [C,H,W]∈[0,1]
 *   → 通道反转(RGB→BGR) → 逐通道标准化
 */

use super::DataError;
use super::label::parse_xy;
use crate::tensor::Tensor;
use crate::vision::{
    ColorJitter, IMAGENET_MEAN, IMAGENET_STD, Vision, hflip, normalize_channels, resize,
    reverse_channels,
};
use image::RgbImage;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 可按索引取样的数据集。每个样本为`(输入张量, 目标张量)`。
///
/// 需要`Send + Sync`，以便`DataLoader`的多个加载线程共享同一数据集。
pub trait Dataset: Send + Sync {
    /// 样本数量
    fn len(&self) -> usize;

    /// 检查数据集是否为空
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 读取第`index`个样本
    fn get(&self, index: usize) -> Result<(Tensor, Tensor), DataError>;
}

impl<D: Dataset + ?Sized> Dataset for Arc<D> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Result<(Tensor, Tensor), DataError> {
        (**self).get(index)
    }
}

/// 单次访问时对图像与目标施加的变换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XYTransform {
    /// 是否允许左右对称增强（标注约定允许时才开启）；开启后每次访问以50%概率翻转
    pub random_hflips: bool,
    /// 颜色抖动；`None`表示不抖动
    pub color_jitter: Option<ColorJitter>,
    /// 输出尺寸(宽, 高)
    pub size: (u32, u32),
    /// 通道反转后的逐通道均值
    pub mean: [f32; 3],
    /// 通道反转后的逐通道标准差
    pub std: [f32; 3],
}

impl Default for XYTransform {
    fn default() -> Self {
        Self {
            random_hflips: false,
            color_jitter: Some(ColorJitter::uniform(0.3)),
            size: (224, 224),
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        }
    }
}

impl XYTransform {
    /// 对解码后的图像及其目标值执行完整的增强管线
    pub fn apply<R: Rng + ?Sized>(
        &self,
        mut image: RgbImage,
        target: (f32, f32),
        rng: &mut R,
    ) -> (Tensor, Tensor) {
        let (mut x, y) = target;

        if self.random_hflips && rng.gen_bool(0.5) {
            hflip(&mut image);
            x = -x;
        }

        if let Some(jitter) = &self.color_jitter {
            jitter.apply(&mut image, rng);
        }

        let image = resize(&image, self.size.0, self.size.1);
        let mut image = reverse_channels(&Vision::to_chw_tensor(&image));
        normalize_channels(&mut image, &self.mean, &self.std);

        (image, Tensor::new(&[x, y], &[2]))
    }
}

/// 单个样本的元数据：图像路径与由文件名解出的目标值
#[derive(Debug, Clone, PartialEq)]
pub struct XYSample {
    pub path: PathBuf,
    pub target: (f32, f32),
}

/// 巡线数据集：目录下的每个`*.jpg`文件即一个样本，目标值编码在文件名中
#[derive(Debug, Clone)]
pub struct XYDataset {
    directory: PathBuf,
    samples: Vec<XYSample>,
    transform: XYTransform,
}

impl XYDataset {
    /// 列举`directory`下的全部`*.jpg`（按文件名排序）并解析其标签
    ///
    /// # 参数
    /// - `directory`: 图像目录
    /// - `random_hflips`: 是否允许随机水平翻转
    ///
    /// # 错误
    /// 目录不存在、无法读取，或有文件名不符合命名约定
    pub fn new<P: AsRef<Path>>(directory: P, random_hflips: bool) -> Result<Self, DataError> {
        let directory = directory.as_ref().to_path_buf();
        if !directory.is_dir() {
            return Err(DataError::FileNotFound(directory));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&directory)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "jpg") {
                paths.push(path);
            }
        }
        paths.sort();

        let samples = paths
            .into_iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let target = parse_xy(&name)?;
                Ok(XYSample { path, target })
            })
            .collect::<Result<Vec<_>, DataError>>()?;

        tracing::info!(
            "在{}中发现{}个样本（随机翻转：{}）",
            directory.display(),
            samples.len(),
            random_hflips
        );

        Ok(Self {
            directory,
            samples,
            transform: XYTransform {
                random_hflips,
                ..XYTransform::default()
            },
        })
    }

    /// 替换增强管线（如测试中关闭颜色抖动）
    pub fn with_transform(mut self, transform: XYTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn transform(&self) -> &XYTransform {
        &self.transform
    }

    pub fn samples(&self) -> &[XYSample] {
        &self.samples
    }

    fn sample(&self, index: usize) -> Result<&XYSample, DataError> {
        self.samples.get(index).ok_or(DataError::IndexOutOfBounds {
            index,
            len: self.samples.len(),
        })
    }

    /// 同`get`，但随机源由调用方给出，便于复现
    pub fn get_with_rng<R: Rng + ?Sized>(
        &self,
        index: usize,
        rng: &mut R,
    ) -> Result<(Tensor, Tensor), DataError> {
        let sample = self.sample(index)?;
        let image = Vision::load_rgb(&sample.path)?;
        Ok(self.transform.apply(image, sample.target, rng))
    }
}

impl Dataset for XYDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn get(&self, index: usize) -> Result<(Tensor, Tensor), DataError> {
        self.get_with_rng(index, &mut rand::thread_rng())
    }
}

/// 数据集的子集：按`indices`重新编号访问底层数据集
#[derive(Debug)]
pub struct Subset<D> {
    dataset: Arc<D>,
    indices: Vec<usize>,
}

impl<D> Clone for Subset<D> {
    fn clone(&self) -> Self {
        Self {
            dataset: Arc::clone(&self.dataset),
            indices: self.indices.clone(),
        }
    }
}

impl<D> Subset<D> {
    pub fn new(dataset: Arc<D>, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    /// 子集在底层数据集中的索引
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn dataset(&self) -> &Arc<D> {
        &self.dataset
    }
}

impl<D: Dataset> Dataset for Subset<D> {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<(Tensor, Tensor), DataError> {
        let &inner = self.indices.get(index).ok_or(DataError::IndexOutOfBounds {
            index,
            len: self.indices.len(),
        })?;
        self.dataset.get(inner)
    }
}
