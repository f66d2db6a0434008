//! 图像变换函数
//!
//! 数据增强与预处理所需的各步操作：水平翻转、颜色抖动、缩放、通道反转、逐通道标准化。
//! 前三者作用于`RgbImage`，后两者作用于[C, H, W]的图像张量。

use super::color::{hsv_to_rgb, rgb_to_hsv};
use crate::tensor::Tensor;
use image::RgbImage;
use image::imageops::{self, FilterType};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// ImageNet预训练网络所用的逐通道均值
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet预训练网络所用的逐通道标准差
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// 原地水平镜像
pub fn hflip(image: &mut RgbImage) {
    imageops::flip_horizontal_in_place(image);
}

/// 以双线性（Triangle）插值缩放到指定尺寸，不保持宽高比
pub fn resize(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// 反转[C, H, W]图像张量的通道顺序（如RGB→BGR）
pub fn reverse_channels(image: &Tensor) -> Tensor {
    let shape = image.shape();
    assert_eq!(shape.len(), 3, "图像张量须为[C, H, W]，得到{shape:?}");
    let channels = shape[0];
    let plane = shape[1] * shape[2];
    let src = image.as_slice();
    let mut data = Vec::with_capacity(src.len());
    for c in (0..channels).rev() {
        data.extend_from_slice(&src[c * plane..(c + 1) * plane]);
    }
    Tensor::from_vec(data, shape)
}

/// 原地逐通道标准化：`(x - mean[c]) / std[c]`
pub fn normalize_channels(image: &mut Tensor, mean: &[f32], std: &[f32]) {
    let shape = image.shape().to_vec();
    assert_eq!(shape.len(), 3, "图像张量须为[C, H, W]，得到{shape:?}");
    assert!(
        mean.len() == shape[0] && std.len() == shape[0],
        "均值/标准差的个数须与通道数{}一致",
        shape[0]
    );
    let plane = shape[1] * shape[2];
    for (c, values) in image.as_slice_mut().chunks_mut(plane).enumerate() {
        for v in values {
            *v = (*v - mean[c]) / std[c];
        }
    }
}

/// 颜色抖动：随机扰动亮度、对比度、饱和度与色相。
///
/// - 亮度、对比度、饱和度：因子均匀取自`[max(0, 1 - s), 1 + s]`；
/// - 色相：偏移量均匀取自`[-h, h]`（以整圈为1，`h`最大为0.5）；
/// - 四项调整在每次调用时以随机顺序执行，参数为0的项跳过。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorJitter {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub hue: f32,
}

#[derive(Debug, Clone, Copy)]
enum Adjustment {
    Brightness,
    Contrast,
    Saturation,
    Hue,
}

impl ColorJitter {
    pub fn new(brightness: f32, contrast: f32, saturation: f32, hue: f32) -> Self {
        Self {
            brightness: brightness.abs(),
            contrast: contrast.abs(),
            saturation: saturation.abs(),
            hue: hue.abs().min(0.5),
        }
    }

    /// 四项使用同一幅度
    pub fn uniform(strength: f32) -> Self {
        Self::new(strength, strength, strength, strength)
    }

    pub fn apply<R: Rng + ?Sized>(&self, image: &mut RgbImage, rng: &mut R) {
        let mut order = [
            Adjustment::Brightness,
            Adjustment::Contrast,
            Adjustment::Saturation,
            Adjustment::Hue,
        ];
        order.shuffle(rng);

        for adjustment in order {
            match adjustment {
                Adjustment::Brightness if self.brightness > 0.0 => {
                    adjust_brightness(image, factor_in(self.brightness, rng));
                }
                Adjustment::Contrast if self.contrast > 0.0 => {
                    adjust_contrast(image, factor_in(self.contrast, rng));
                }
                Adjustment::Saturation if self.saturation > 0.0 => {
                    adjust_saturation(image, factor_in(self.saturation, rng));
                }
                Adjustment::Hue if self.hue > 0.0 => {
                    adjust_hue(image, rng.gen_range(-self.hue..=self.hue));
                }
                _ => {}
            }
        }
    }
}

fn factor_in<R: Rng + ?Sized>(strength: f32, rng: &mut R) -> f32 {
    rng.gen_range((1.0 - strength).max(0.0)..=1.0 + strength)
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn luma(p: &image::Rgb<u8>) -> f32 {
    0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32
}

/// 亮度：与全黑图混合，即各分量乘以`factor`
pub fn adjust_brightness(image: &mut RgbImage, factor: f32) {
    for p in image.pixels_mut() {
        for c in p.0.iter_mut() {
            *c = to_u8(*c as f32 * factor);
        }
    }
}

/// 对比度：与灰度均值构成的纯色图混合
pub fn adjust_contrast(image: &mut RgbImage, factor: f32) {
    let count = (image.width() * image.height()).max(1) as f32;
    let mean = image.pixels().map(luma).sum::<f32>() / count;
    for p in image.pixels_mut() {
        for c in p.0.iter_mut() {
            *c = to_u8(factor * *c as f32 + (1.0 - factor) * mean);
        }
    }
}

/// 饱和度：与该像素的灰度值混合
pub fn adjust_saturation(image: &mut RgbImage, factor: f32) {
    for p in image.pixels_mut() {
        let gray = luma(p);
        for c in p.0.iter_mut() {
            *c = to_u8(factor * *c as f32 + (1.0 - factor) * gray);
        }
    }
}

/// 色相：在HSV空间中将色相环旋转`shift`圈
pub fn adjust_hue(image: &mut RgbImage, shift: f32) {
    for p in image.pixels_mut() {
        let (h, s, v) = rgb_to_hsv(
            p[0] as f32 / 255.0,
            p[1] as f32 / 255.0,
            p[2] as f32 / 255.0,
        );
        let (r, g, b) = hsv_to_rgb(h + shift, s, v);
        p.0 = [to_u8(r * 255.0), to_u8(g * 255.0), to_u8(b * 255.0)];
    }
}
