//! 合成数据集：在目录中写入一批按命名约定标注的纯色图像，
//! 目标点覆盖整个[0, 100]×[0, 100]网格，并在目标点处画一个实心圆作为可学习的线索。

use super::DataError;
use super::label::xy_file_name;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::path::{Path, PathBuf};

/// 写入`count`张`size`×`size`的JPEG图像，返回写入的路径
///
/// 第`i`张图位于`side`×`side`网格（`side = ceil(sqrt(count))`）的第`i % side`列、
/// 第`i / side`行，其原始坐标线性铺满[0, 100]，因此解析出的目标值覆盖[-1, 1]²。
pub fn write_grid_dataset<P: AsRef<Path>>(
    directory: P,
    count: usize,
    size: u32,
) -> Result<Vec<PathBuf>, DataError> {
    let directory = directory.as_ref();
    std::fs::create_dir_all(directory)?;

    let side = (count as f64).sqrt().ceil().max(1.0) as usize;
    let step = if side > 1 { 100.0 / (side - 1) as f64 } else { 0.0 };

    let mut paths = Vec::with_capacity(count);
    for i in 0..count {
        let x_raw = ((i % side) as f64 * step).round() as u32;
        let y_raw = ((i / side) as f64 * step).round() as u32;

        let background = Rgb([
            (37 * i % 200) as u8 + 20,
            (91 * i % 200) as u8 + 20,
            (53 * i % 200) as u8 + 20,
        ]);
        let mut image = RgbImage::from_pixel(size, size, background);
        let center = (
            (x_raw as f32 / 100.0 * (size - 1) as f32).round() as i32,
            (y_raw as f32 / 100.0 * (size - 1) as f32).round() as i32,
        );
        draw_filled_circle_mut(&mut image, center, (size / 16).max(1) as i32, Rgb([255, 255, 255]));

        let path = directory.join(xy_file_name(x_raw, y_raw, &format!("synthetic{i:05}")));
        image.save(&path)?;
        paths.push(path);
    }

    tracing::info!("已在{}写入{}张合成图像", directory.display(), count);
    Ok(paths)
}
