/*
 * @Description  : 本模块提供计算机视觉相关的功能：图像的解码、与张量的互转，以及数据增强所需的各类图像变换。
 *                 在本模块中，不严谨地说：
 *                 1. 所谓的image/图像是指8位RGB格式的图像（`image::RgbImage`）；
 *                 2. 图像张量一律为“通道优先”的[C, H, W]格式，值域为[0, 1]（归一化前）。
 */

use crate::tensor::Tensor;
use image::RgbImage;
use std::path::Path;

mod color;
pub mod transforms;


pub use transforms::{
    ColorJitter, IMAGENET_MEAN, IMAGENET_STD, hflip, normalize_channels, resize, reverse_channels,
};

pub struct Vision;

impl Vision {
    /// 将本地的图像解码为RGB图像（任何格式均转为3通道8位）
    pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage, image::ImageError> {
        Ok(image::open(path)?.to_rgb8())
    }

    /// 将RGB图像转为[3, H, W]的张量，像素值缩放到[0, 1]
    pub fn to_chw_tensor(image: &RgbImage) -> Tensor {
        let (width, height) = image.dimensions();
        let plane = (width * height) as usize;
        let mut chw = vec![0.0f32; 3 * plane];
        for (x, y, pixel) in image.enumerate_pixels() {
            let base = (y * width + x) as usize;
            chw[base] = pixel[0] as f32 / 255.0;
            chw[plane + base] = pixel[1] as f32 / 255.0;
            chw[2 * plane + base] = pixel[2] as f32 / 255.0;
        }
        Tensor::from_vec(chw, &[3, height as usize, width as usize])
    }
}
