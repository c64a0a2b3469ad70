// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成合成的单日功率遥测数据集
// 输出: tests/fixtures/datasets/*.csv
// ==========================================

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use csv::WriterBuilder;
use std::fs::{self, File};
use std::path::Path;

const OUTPUT_DIR: &str = "tests/fixtures/datasets";

/// 采样间隔（分钟）
const INTERVAL_MIN: i64 = 5;

// 单个采样点（W）
struct Sample {
    time: NaiveDateTime,
    pv_w: f64,
    meter_w: f64,
    load_w: f64,
}

impl Sample {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.time.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{:.1}", self.pv_w),
            format!("{:.1}", self.meter_w),
            format!("{:.1}", self.load_w),
        ]
    }
}

/// 从 start 起生成一天的采样：PV 为正弦日照曲线，Load 为基荷 + 午晚高峰，
/// Meter = Load - PV（正为购电，负为上网）
fn generate_day(start: NaiveDateTime, peak_pv_w: f64) -> Vec<Sample> {
    let steps = 24 * 60 / INTERVAL_MIN;

    (0..steps)
        .map(|i| {
            let time = start + Duration::minutes(i * INTERVAL_MIN);
            let hour = i as f64 * INTERVAL_MIN as f64 / 60.0;

            let pv_w = if (6.0..=18.0).contains(&hour) {
                peak_pv_w * (std::f64::consts::PI * (hour - 6.0) / 12.0).sin()
            } else {
                0.0
            };
            let peak = |center: f64, width: f64, height: f64| {
                height * (-((hour - center) / width).powi(2)).exp()
            };
            let load_w = 800.0 + peak(12.5, 1.5, 1500.0) + peak(19.0, 2.0, 2500.0);

            Sample {
                time,
                pv_w,
                meter_w: load_w - pv_w,
                load_w,
            }
        })
        .collect()
}

fn write_csv<P: AsRef<Path>>(
    path: P,
    preamble: &[Vec<String>],
    header: Option<&[&str]>,
    rows: &[Vec<String>],
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("无法创建 {}", path.display()))?;
    // 标题行与数据行列数不同
    let mut wtr = WriterBuilder::new().flexible(true).from_writer(file);
    for line in preamble {
        wtr.write_record(line)?;
    }
    if let Some(header) = header {
        wtr.write_record(header)?;
    }
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    println!("开始生成测试数据集...");
    fs::create_dir_all(OUTPUT_DIR)?;

    let date = NaiveDate::from_ymd_opt(2025, 4, 9).context("无效日期")?;
    let start = date.and_hms_opt(0, 0, 0).context("无效时间")?;
    let day = generate_day(start, 5200.0);
    let rows: Vec<Vec<String>> = day.iter().map(Sample::to_row).collect();
    let canonical = ["Time", "PV(W)", "Meter(W)", "Load(W)"];

    // 1. 标准列名
    write_csv(format!("{}/01_clean_day.csv", OUTPUT_DIR), &[], Some(&canonical[..]), &rows)?;
    println!("✓ 生成 01_clean_day.csv ({}条)", rows.len());

    // 2. 导出工具常见的标题行（skip_rows=2）
    let preamble = vec![
        vec!["Plant report".to_string()],
        vec![format!("Exported {}", date)],
    ];
    write_csv(
        format!("{}/02_title_rows.csv", OUTPUT_DIR),
        &preamble,
        Some(&canonical[..]),
        &rows,
    )?;
    println!("✓ 生成 02_title_rows.csv (skip_rows=2)");

    // 3. 无表头（header_row=-1）
    write_csv(format!("{}/03_headerless.csv", OUTPUT_DIR), &[], None, &rows)?;
    println!("✓ 生成 03_headerless.csv (header_row=-1)");

    // 4. 含无法解析的时间
    let mut bad_rows = rows.clone();
    for i in (0..bad_rows.len()).step_by(50) {
        bad_rows[i][0] = "N/A".to_string();
    }
    write_csv(
        format!("{}/04_bad_time_rows.csv", OUTPUT_DIR),
        &[],
        Some(&canonical[..]),
        &bad_rows,
    )?;
    println!("✓ 生成 04_bad_time_rows.csv (每50行一条无效时间)");

    // 5. 非标准列名（需手动映射）
    let renamed = ["Timestamp", "Inverter Power", "Grid Meter", "Site Load"];
    write_csv(
        format!("{}/05_renamed_columns.csv", OUTPUT_DIR),
        &[],
        Some(&renamed[..]),
        &rows,
    )?;
    println!("✓ 生成 05_renamed_columns.csv (需列映射)");

    println!("✓ 所有测试数据集生成完成！");
    Ok(())
}
