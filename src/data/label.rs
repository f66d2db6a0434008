//! 文件名标签编解码
//!
//! 采集时每张图片以`xy_XXX_YYY_<id>.jpg`命名：第[3, 6)与[7, 10)个字符分别是目标点的
//! 横、纵坐标（取值约定为[0, 100]的整数）。解码后线性映射到[-1, 1]。

use super::DataError;
use std::ops::Range;

/// 横坐标字段在文件名中的位置
pub const X_FIELD: Range<usize> = 3..6;
/// 纵坐标字段在文件名中的位置
pub const Y_FIELD: Range<usize> = 7..10;

/// 原始整数坐标 → [-1, 1]的目标值
pub fn raw_to_target(raw: i32) -> f32 {
    (raw as f32 - 50.0) / 50.0
}

/// [-1, 1]的目标值 → 原始整数坐标（四舍五入）
pub fn target_to_raw(target: f32) -> i32 {
    (target * 50.0 + 50.0).round() as i32
}

/// 按约定生成文件名
pub fn xy_file_name(x_raw: u32, y_raw: u32, id: &str) -> String {
    format!("xy_{x_raw:03}_{y_raw:03}_{id}.jpg")
}

/// 从文件名（不含目录）解析出`(x, y)`目标值
///
/// 任一字段越界或不是整数都会返回`DataError::InvalidFileName`，而不是静默地给出错误的值。
pub fn parse_xy(file_name: &str) -> Result<(f32, f32), DataError> {
    let x = parse_field(file_name, X_FIELD, "x")?;
    let y = parse_field(file_name, Y_FIELD, "y")?;
    Ok((raw_to_target(x), raw_to_target(y)))
}

fn parse_field(file_name: &str, field: Range<usize>, axis: &str) -> Result<i32, DataError> {
    let invalid = |reason: String| DataError::InvalidFileName {
        name: file_name.to_string(),
        reason,
    };
    let text = file_name
        .get(field.clone())
        .ok_or_else(|| invalid(format!("{axis}字段[{}, {})超出文件名长度", field.start, field.end)))?;
    text.parse::<i32>()
        .map_err(|e| invalid(format!("{axis}字段`{text}`不是整数（{e}）")))
}
