//! XYDataset 单元测试

use crate::assert_err;
use std::fs;
use std::path::Path;

use approx::assert_abs_diff_eq;
use image::{Rgb, RgbImage};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::label::xy_file_name;
use crate::data::{DataError, Dataset, XYDataset, XYTransform};
use crate::vision::{IMAGENET_MEAN, IMAGENET_STD};

/// 每列颜色不同的图像，便于检查翻转
fn write_striped(dir: &Path, x_raw: u32, y_raw: u32, id: &str, w: u32, h: u32) {
    let image = RgbImage::from_fn(w, h, |x, _| {
        Rgb([(x * 255 / w) as u8, 128, 255 - (x * 255 / w) as u8])
    });
    image.save(dir.join(xy_file_name(x_raw, y_raw, id))).unwrap();
}

fn no_jitter(random_hflips: bool, size: (u32, u32)) -> XYTransform {
    XYTransform {
        random_hflips,
        color_jitter: None,
        size,
        ..XYTransform::default()
    }
}

#[test]
fn test_dataset_discovers_only_jpg_sorted() {
    let dir = tempfile::tempdir().unwrap();
    write_striped(dir.path(), 80, 20, "b", 32, 24);
    write_striped(dir.path(), 10, 90, "a", 32, 24);
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    fs::create_dir(dir.path().join("sub.jpg")).unwrap();

    let dataset = XYDataset::new(dir.path(), false).unwrap();
    assert_eq!(dataset.len(), 2);
    assert!(!dataset.is_empty());
    assert_eq!(dataset.directory(), dir.path());

    let samples = dataset.samples();
    assert!(samples[0].path.ends_with("xy_010_090_a.jpg"));
    assert_abs_diff_eq!(samples[0].target.0, -0.8);
    assert_abs_diff_eq!(samples[0].target.1, 0.8);
    assert_abs_diff_eq!(samples[1].target.0, 0.6);
    assert_abs_diff_eq!(samples[1].target.1, -0.6);
}

#[test]
fn test_dataset_errors() {
    let dir = tempfile::tempdir().unwrap();
    assert_err!(XYDataset::new(dir.path().join("missing"), false), DataError::FileNotFound(_));

    RgbImage::new(4, 4).save(dir.path().join("bad_name.jpg")).unwrap();
    assert_err!(XYDataset::new(dir.path(), false), DataError::InvalidFileName { .. });

    let empty = tempfile::tempdir().unwrap();
    let dataset = XYDataset::new(empty.path(), true).unwrap();
    assert!(dataset.is_empty());
    assert_err!(dataset.get(0), DataError::IndexOutOfBounds { index: 0, len: 0 });
}

#[test]
fn test_dataset_unreadable_image() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(xy_file_name(50, 50, "broken")), b"not a jpeg").unwrap();
    let dataset = XYDataset::new(dir.path(), false).unwrap();
    assert_err!(dataset.get(0), DataError::ImageError(_));
}

#[test]
fn test_output_shape_is_fixed() {
    let dir = tempfile::tempdir().unwrap();
    write_striped(dir.path(), 0, 0, "tiny", 5, 3);
    write_striped(dir.path(), 50, 50, "wide", 320, 120);
    write_striped(dir.path(), 100, 100, "tall", 40, 300);

    let dataset = XYDataset::new(dir.path(), true).unwrap();
    for i in 0..dataset.len() {
        let (image, target) = dataset.get(i).unwrap();
        assert_eq!(image.shape(), &[3, 224, 224]);
        assert_eq!(target.shape(), &[2]);
        assert!(image.is_finite());
    }
}

#[test]
fn test_channels_reversed_then_normalized() {
    let dir = tempfile::tempdir().unwrap();
    // 纯红图；JPEG 有损，故比较时留出容差
    RgbImage::from_pixel(8, 8, Rgb([255, 0, 0]))
        .save(dir.path().join(xy_file_name(50, 50, "red")))
        .unwrap();

    let dataset = XYDataset::new(dir.path(), false).unwrap().with_transform(no_jitter(false, (8, 8)));
    let (image, _) = dataset.get(0).unwrap();
    // 反转后通道0是原来的B（=0），通道2是原来的R（=1）
    let expected = [0.0, 0.0, 1.0];
    for c in 0..3 {
        let want = (expected[c] - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        assert_abs_diff_eq!(image[[c, 3, 3]], want, epsilon = 0.15);
    }
}

#[test]
fn test_hflip_mirrors_image_and_negates_x() {
    let dir = tempfile::tempdir().unwrap();
    write_striped(dir.path(), 80, 30, "s", 16, 8);
    let dataset = XYDataset::new(dir.path(), true)
        .unwrap()
        .with_transform(no_jitter(true, (16, 8)));
    let reference = XYDataset::new(dir.path(), false)
        .unwrap()
        .with_transform(no_jitter(false, (16, 8)));
    let (plain, plain_target) = reference.get(0).unwrap();
    assert_abs_diff_eq!(plain_target[[0]], 0.6);

    let mut flipped_reads = 0;
    for seed in 0..32 {
        let (image, target) = dataset.get_with_rng(0, &mut StdRng::seed_from_u64(seed)).unwrap();
        assert_abs_diff_eq!(target[[1]], plain_target[[1]]);
        if target[[0]] == plain_target[[0]] {
            assert_eq!(image, plain);
            continue;
        }
        flipped_reads += 1;
        assert_abs_diff_eq!(target[[0]], -plain_target[[0]]);
        for c in 0..3 {
            for y in 0..8 {
                for x in 0..16 {
                    assert_eq!(image[[c, y, x]], plain[[c, y, 15 - x]]);
                }
            }
        }
    }
    // 32 次公平抛硬币，全部同一面的概率可以忽略
    assert!(flipped_reads > 0 && flipped_reads < 32);
}

#[test]
fn test_flip_disabled_never_flips() {
    let dir = tempfile::tempdir().unwrap();
    write_striped(dir.path(), 80, 30, "s", 16, 8);
    let dataset = XYDataset::new(dir.path(), false)
        .unwrap()
        .with_transform(no_jitter(false, (16, 8)));
    for seed in 0..16 {
        let (_, target) = dataset.get_with_rng(0, &mut StdRng::seed_from_u64(seed)).unwrap();
        assert_abs_diff_eq!(target[[0]], 0.6);
    }
}

#[test]
fn test_fresh_augmentation_per_access() {
    let dir = tempfile::tempdir().unwrap();
    write_striped(dir.path(), 40, 60, "s", 32, 32);
    let dataset = XYDataset::new(dir.path(), false).unwrap();
    assert!(dataset.transform().color_jitter.is_some());

    let (a, ta) = dataset.get_with_rng(0, &mut StdRng::seed_from_u64(1)).unwrap();
    let (b, tb) = dataset.get_with_rng(0, &mut StdRng::seed_from_u64(2)).unwrap();
    let (c, _) = dataset.get_with_rng(0, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(ta, tb);
    assert_ne!(a, b);
    assert_eq!(a, c);
}
