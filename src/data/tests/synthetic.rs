//! 合成数据集单元测试

use crate::data::label::parse_xy;
use crate::data::synthetic::write_grid_dataset;
use crate::data::{Dataset, XYDataset};

#[test]
fn test_write_grid_dataset_spans_unit_square() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_grid_dataset(dir.path(), 100, 64).unwrap();
    assert_eq!(paths.len(), 100);

    let targets: Vec<(f32, f32)> = paths
        .iter()
        .map(|p| parse_xy(&p.file_name().unwrap().to_string_lossy()).unwrap())
        .collect();
    let min_x = targets.iter().map(|t| t.0).fold(f32::MAX, f32::min);
    let max_x = targets.iter().map(|t| t.0).fold(f32::MIN, f32::max);
    let min_y = targets.iter().map(|t| t.1).fold(f32::MAX, f32::min);
    let max_y = targets.iter().map(|t| t.1).fold(f32::MIN, f32::max);
    assert_eq!((min_x, max_x, min_y, max_y), (-1.0, 1.0, -1.0, 1.0));

    let dataset = XYDataset::new(dir.path(), false).unwrap();
    assert_eq!(dataset.len(), 100);
    let image = image::open(&paths[0]).unwrap();
    assert_eq!((image.width(), image.height()), (64, 64));
}

#[test]
fn test_write_grid_dataset_small_counts() {
    let dir = tempfile::tempdir().unwrap();
    assert!(write_grid_dataset(dir.path(), 0, 16).unwrap().is_empty());
    let paths = write_grid_dataset(dir.path().join("one"), 1, 16).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(parse_xy(&paths[0].file_name().unwrap().to_string_lossy()).unwrap(), (-1.0, -1.0));
}
