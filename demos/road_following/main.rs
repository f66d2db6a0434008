//! # 小车巡线转向回归示例
//!
//! 从`dataset_xy/`中读取`xy_XXX_YYY_<id>.jpg`图像，训练 50 轮，
//! 测试损失每创新低一次就把模型写入`best_steering_model_xy.bin`。
//! 数据目录不存在或为空时先生成一份合成数据集，便于直接体验。
//! 当前目录下若有`road_following.json`，则以其中字段覆盖默认配置。
//!
//! ## 运行
//! ```bash
//! cargo run --release --example road_following
//! ```

use road_following::data::synthetic::write_grid_dataset;
use road_following::train::{self, TrainConfig, TrainError};
use road_following::utils::init_logging;
use std::path::Path;
use std::time::Instant;

const CONFIG_FILE: &str = "road_following.json";
const SYNTHETIC_COUNT: usize = 100;
const SYNTHETIC_SIZE: u32 = 64;

fn main() -> Result<(), TrainError> {
    if let Err(e) = init_logging(false) {
        eprintln!("{e}");
    }

    println!("=== 小车巡线：转向目标回归 ===\n");
    let start_time = Instant::now();

    let config = if Path::new(CONFIG_FILE).is_file() {
        println!("读取配置: {CONFIG_FILE}");
        TrainConfig::from_json_file(CONFIG_FILE)?
    } else {
        TrainConfig::default()
    };

    let has_data = std::fs::read_dir(&config.data_dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if !has_data {
        println!(
            "{} 不存在或为空，生成 {} 张合成图像...",
            config.data_dir.display(),
            SYNTHETIC_COUNT
        );
        write_grid_dataset(&config.data_dir, SYNTHETIC_COUNT, SYNTHETIC_SIZE)?;
    }

    println!("训练配置:");
    println!("  数据目录: {}", config.data_dir.display());
    println!("  Epochs: {}", config.epochs);
    println!("  Batch Size: {}", config.batch_size);
    println!("  学习率: {}", config.learning_rate);
    println!("  随机翻转: {}", config.random_hflips);
    println!("  加载线程: {}\n", config.num_workers);

    let report = train::run(&config)?;

    match report.best_epoch {
        Some(epoch) => println!(
            "\n最佳测试损失 {:.6}（第 {} 轮），模型已保存到 {}",
            report.best_test_loss,
            epoch,
            config.checkpoint_path.display()
        ),
        None => println!("\n未产生有效的检查点"),
    }
    println!("总耗时: {:.2}s", start_time.elapsed().as_secs_f32());
    Ok(())
}
