// ==========================================
// 光伏功率分析系统 - 时间规范化与清洗器实现
// ==========================================
// 职责: 解析时间列 / 丢弃时间无效行 / 数值列标准化
// 规则: 时间无法解析的单元格记为空，不报错；该行整行丢弃
//       数值单元格为空或非数值时记为 NaN，由下游统计跳过
// ==========================================

use crate::domain::telemetry::{CellValue, RawTable, TimeSeriesRecord};
use crate::domain::types::CanonicalField;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::telemetry_importer_trait::{CleanedSeries, DataCleaner as DataCleanerTrait};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

/// 支持的日期时间格式（按尝试顺序）
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y%m%d%H%M%S",
];

/// 紧凑格式 %Y%m%d%H%M%S 对应的数值范围（14 位整数）
const COMPACT_MIN: f64 = 1e13;
const COMPACT_MAX: f64 = 1e14;

/// 仅日期格式（时间取 00:00:00）
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn normalize(&self, table: &RawTable, time_column: &str) -> ImportResult<CleanedSeries> {
        let time_idx = table
            .column_index(time_column)
            .ok_or_else(|| ImportError::MissingTimeColumn(time_column.to_string()))?;

        let pv_idx = table.column_index(CanonicalField::Pv.label());
        let meter_idx = table.column_index(CanonicalField::Meter.label());
        let load_idx = table.column_index(CanonicalField::Load.label());

        let mut records = Vec::with_capacity(table.row_count());
        let mut dropped_rows = Vec::new();
        let mut non_numeric_cells = 0usize;

        for (row_idx, row) in table.rows().iter().enumerate() {
            let timestamp = match row.get(time_idx).and_then(|c| self.parse_timestamp(c)) {
                Some(ts) => ts,
                None => {
                    dropped_rows.push(row_idx);
                    continue;
                }
            };

            let mut numeric = |idx: Option<usize>| -> f64 {
                match idx.and_then(|i| row.get(i)).and_then(CellValue::as_f64) {
                    Some(v) => v,
                    None => {
                        non_numeric_cells += 1;
                        f64::NAN
                    }
                }
            };

            records.push(TimeSeriesRecord {
                timestamp,
                pv_w: numeric(pv_idx),
                meter_w: numeric(meter_idx),
                load_w: numeric(load_idx),
                source_row: row_idx,
            });
        }

        info!(
            kept = records.len(),
            dropped = dropped_rows.len(),
            non_numeric = non_numeric_cells,
            "时间规范化完成"
        );

        Ok(CleanedSeries {
            records,
            dropped_rows,
            non_numeric_cells,
        })
    }
}

impl DataCleaner {
    /// 单元格 → 时间戳；无法解析返回 None
    ///
    /// 纯数值单元格不视为时间（避免把功率值误读为纪元偏移），
    /// 唯一例外是 14 位紧凑时间戳
    pub fn parse_timestamp(&self, cell: &CellValue) -> Option<NaiveDateTime> {
        match cell {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Text(s) => self.parse_timestamp_str(s),
            // 14 位紧凑格式（20250409102000）读入时已成数值
            CellValue::Number(v) if v.fract() == 0.0 && (COMPACT_MIN..COMPACT_MAX).contains(v) => {
                self.parse_timestamp_str(&format!("{:.0}", v))
            }
            CellValue::Empty | CellValue::Number(_) | CellValue::Bool(_) => None,
        }
    }

    /// 字符串 → 时间戳（依次尝试 RFC 3339、日期时间、纯日期格式）
    pub fn parse_timestamp_str(&self, value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.naive_local());
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
                return Some(dt);
            }
        }

        for fmt in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
                return d.and_hms_opt(0, 0, 0);
            }
        }

        debug!(value = %value, "时间无法解析");
        None
    }
}
