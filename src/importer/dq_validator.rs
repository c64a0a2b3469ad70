// ==========================================
// 光伏功率分析系统 - 数据质量校验器实现
// ==========================================
// 职责: 非阻断 DQ 检查 + DQ 报告生成
// 检查: 时间无效行 / 非数值单元格 / 重复时间戳 / 乱序 / 采样间隔是否均匀
// 说明: 汇总按样本求和而非按时间积分，间隔不均匀时总量会失真，此处只提示
// ==========================================

use crate::domain::quality::{DqLevel, DqReport, DqViolation, SamplingStats};
use crate::domain::telemetry::TimeSeriesRecord;
use crate::importer::telemetry_importer_trait::CleanedSeries;
use std::collections::HashSet;
use tracing::warn;

pub struct DqValidator {
    interval_tolerance_ratio: f64, // 间隔偏差容差（相对中位数）
}

impl DqValidator {
    pub fn new(interval_tolerance_ratio: f64) -> Self {
        Self {
            interval_tolerance_ratio: interval_tolerance_ratio.abs(),
        }
    }

    /// 生成 DQ 报告
    ///
    /// # 参数
    /// - total_rows: 源表数据行数
    /// - cleaned: 清洗结果
    pub fn validate(&self, total_rows: usize, cleaned: &CleanedSeries) -> DqReport {
        let records = &cleaned.records;
        let mut violations = Vec::new();

        if !cleaned.dropped_rows.is_empty() {
            violations.push(DqViolation {
                level: DqLevel::Warning,
                field: "Time".to_string(),
                message: format!("{} 行时间无法解析，已丢弃", cleaned.dropped_rows.len()),
                rows: cleaned.dropped_rows.clone(),
            });
        }

        if cleaned.non_numeric_cells > 0 {
            violations.push(DqViolation {
                level: DqLevel::Warning,
                field: "PV(W),Meter(W),Load(W)".to_string(),
                message: format!(
                    "{} 个功率单元格为空或非数值，统计时跳过",
                    cleaned.non_numeric_cells
                ),
                rows: Vec::new(),
            });
        }

        let duplicate_rows = self.duplicate_timestamp_rows(records);
        if !duplicate_rows.is_empty() {
            violations.push(DqViolation {
                level: DqLevel::Warning,
                field: "Time".to_string(),
                message: format!("{} 行时间戳重复", duplicate_rows.len()),
                rows: duplicate_rows.clone(),
            });
        }

        let unsorted_input = records
            .windows(2)
            .any(|w| w[1].timestamp < w[0].timestamp);
        if unsorted_input {
            violations.push(DqViolation {
                level: DqLevel::Info,
                field: "Time".to_string(),
                message: "时间戳未按升序排列".to_string(),
                rows: Vec::new(),
            });
        }

        let sampling = self.sampling_stats(records);
        if let Some(stats) = sampling {
            if !stats.uniform {
                violations.push(DqViolation {
                    level: DqLevel::Warning,
                    field: "Time".to_string(),
                    message: format!(
                        "采样间隔不均匀（中位 {:.0}s，最小 {:.0}s，最大 {:.0}s），逐点求和的总量可能失真",
                        stats.median_interval_secs,
                        stats.min_interval_secs,
                        stats.max_interval_secs
                    ),
                    rows: Vec::new(),
                });
            }
        }

        let report = DqReport {
            total_rows,
            kept_rows: records.len(),
            dropped_time_rows: cleaned.dropped_rows.clone(),
            non_numeric_cells: cleaned.non_numeric_cells,
            duplicate_timestamps: duplicate_rows.len(),
            unsorted_input,
            sampling,
            violations,
        };

        if report.warning_count() > 0 {
            warn!(warnings = report.warning_count(), "DQ 校验发现问题");
        }

        report
    }

    /// 重复时间戳所在行（首次出现不计）
    fn duplicate_timestamp_rows(&self, records: &[TimeSeriesRecord]) -> Vec<usize> {
        let mut seen = HashSet::new();
        records
            .iter()
            .filter(|r| !seen.insert(r.timestamp))
            .map(|r| r.source_row)
            .collect()
    }

    /// 按时间排序后的相邻间隔统计；少于 2 个不同时间戳时为 None
    fn sampling_stats(&self, records: &[TimeSeriesRecord]) -> Option<SamplingStats> {
        let mut stamps: Vec<_> = records.iter().map(|r| r.timestamp).collect();
        stamps.sort();
        stamps.dedup();

        let mut intervals: Vec<f64> = stamps
            .windows(2)
            .map(|w| (w[1] - w[0]).num_milliseconds() as f64 / 1000.0)
            .collect();
        if intervals.is_empty() {
            return None;
        }
        intervals.sort_by(|a, b| a.total_cmp(b));

        let n = intervals.len();
        let median = if n % 2 == 1 {
            intervals[n / 2]
        } else {
            (intervals[n / 2 - 1] + intervals[n / 2]) / 2.0
        };
        let min = intervals[0];
        let max = intervals[n - 1];
        let tolerance = median * self.interval_tolerance_ratio;
        let uniform = (median - min) <= tolerance && (max - median) <= tolerance;

        Some(SamplingStats {
            median_interval_secs: median,
            min_interval_secs: min,
            max_interval_secs: max,
            uniform,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 9)
            .unwrap()
            .and_hms_opt(10, minute, 0)
            .unwrap()
    }

    fn rec(minute: u32, row: usize) -> TimeSeriesRecord {
        TimeSeriesRecord {
            timestamp: at(minute),
            pv_w: 1.0,
            meter_w: 1.0,
            load_w: 1.0,
            source_row: row,
        }
    }

    fn cleaned(records: Vec<TimeSeriesRecord>) -> CleanedSeries {
        CleanedSeries {
            records,
            dropped_rows: Vec::new(),
            non_numeric_cells: 0,
        }
    }

    #[test]
    fn test_uniform_sampling_clean_report() {
        let series = cleaned(vec![rec(0, 0), rec(5, 1), rec(10, 2), rec(15, 3)]);
        let report = DqValidator::new(0.5).validate(4, &series);

        let stats = report.sampling.unwrap();
        assert_eq!(stats.median_interval_secs, 300.0);
        assert!(stats.uniform);
        assert!(report.violations.is_empty());
        assert_eq!(report.kept_rows, 4);
    }

    #[test]
    fn test_gap_flags_non_uniform() {
        let series = cleaned(vec![rec(0, 0), rec(5, 1), rec(10, 2), rec(40, 3)]);
        let report = DqValidator::new(0.5).validate(4, &series);

        assert!(!report.sampling.unwrap().uniform);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_duplicates_and_unsorted() {
        let series = cleaned(vec![rec(10, 0), rec(5, 1), rec(5, 2)]);
        let report = DqValidator::new(0.5).validate(3, &series);

        assert_eq!(report.duplicate_timestamps, 1);
        assert!(report.unsorted_input);
    }

    #[test]
    fn test_dropped_rows_reported() {
        let series = CleanedSeries {
            records: vec![rec(0, 0)],
            dropped_rows: vec![1, 2],
            non_numeric_cells: 0,
        };
        let report = DqValidator::new(0.5).validate(3, &series);

        assert_eq!(report.dropped_time_rows, vec![1, 2]);
        assert!(report.sampling.is_none());
        assert_eq!(report.violations[0].rows, vec![1, 2]);
    }
}
