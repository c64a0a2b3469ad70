// ==========================================
// 光伏功率分析系统 - 遥测数据模型
// ==========================================
// 职责: 原始表 / 列映射 / 时序记录 / 读取选项
// 红线: 所有结构在管道内不可变，每个阶段返回新值
// ==========================================

use crate::domain::types::{CanonicalField, Channel, REQUIRED_FIELDS};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// 导出/显示统一的时间格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// ==========================================
// CellValue - 单元格原始值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// 由文本单元格推断类型：空白 → Empty，数值 → Number，其余 → Text
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 数值视图（文本尝试解析，布尔按 1/0）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Empty | CellValue::DateTime(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format(TIMESTAMP_FORMAT)),
        }
    }
}

// ==========================================
// RawTable - 上传文件解析后的通用表
// ==========================================
// 列名即源文件提供的表头，不保证与标准字段一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// 创建表；每行按列数补齐（缺失单元格为 Empty）
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.column_index(label).is_some()
    }

    /// 读取单元格（行号从 0 开始）
    pub fn cell(&self, row: usize, label: &str) -> Option<&CellValue> {
        let col = self.column_index(label)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// 前 n 行预览
    pub fn head(&self, n: usize) -> &[Vec<CellValue>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// 按 {源列名 → 新列名} 重命名，返回新表
    pub fn with_renamed_columns(&self, renames: &HashMap<String, String>) -> RawTable {
        let columns = self
            .columns
            .iter()
            .map(|c| renames.get(c).cloned().unwrap_or_else(|| c.clone()))
            .collect();
        RawTable {
            columns,
            rows: self.rows.clone(),
        }
    }
}

// ==========================================
// ColumnMapping - 标准字段 → 源列名
// ==========================================
// 红线: 不同标准字段不得映射到同一源列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    entries: BTreeMap<CanonicalField, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// 绑定字段到源列；源列已被其他字段占用时拒绝并返回 false
    pub fn assign(&mut self, field: CanonicalField, source: impl Into<String>) -> bool {
        let source = source.into();
        let taken_by_other = self
            .entries
            .iter()
            .any(|(f, s)| *f != field && *s == source);
        if taken_by_other {
            return false;
        }
        self.entries.insert(field, source);
        true
    }

    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.entries.get(&field).map(String::as_str)
    }

    pub fn contains_field(&self, field: CanonicalField) -> bool {
        self.entries.contains_key(&field)
    }

    /// 源列是否已被映射
    pub fn is_source_used(&self, source: &str) -> bool {
        self.entries.values().any(|s| s == source)
    }

    /// 尚未映射的必需字段（按校验顺序）
    pub fn missing_fields(&self) -> Vec<CanonicalField> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|f| !self.entries.contains_key(f))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.entries.iter().map(|(f, s)| (*f, s.as_str()))
    }

    /// 重命名表：{源列名 → 标准列名}
    pub fn renames(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .map(|(f, s)| (s.clone(), f.label().to_string()))
            .collect()
    }
}

// ==========================================
// TimeSeriesRecord - 规范化后的一行
// ==========================================
// 时间戳非空（解析失败的行已丢弃）
// source_row 保留与原表数据行的一一对应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    pub timestamp: NaiveDateTime,
    pub pv_w: f64,
    pub meter_w: f64,
    pub load_w: f64,
    pub source_row: usize,
}

impl TimeSeriesRecord {
    /// 带符号的通道值（W）
    pub fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Pv => self.pv_w,
            Channel::Meter => self.meter_w,
            Channel::Load => self.load_w,
        }
    }

    /// 统计口径的通道值（W）：Meter 取绝对值
    pub fn statistic_value(&self, channel: Channel) -> f64 {
        let v = self.value(channel);
        if channel.uses_magnitude() {
            v.abs()
        } else {
            v
        }
    }

    /// 统计口径的通道值（kW）
    pub fn statistic_kw(&self, channel: Channel) -> f64 {
        self.statistic_value(channel) / 1000.0
    }
}

// ==========================================
// LoadOptions - 文件读取选项
// ==========================================
// header_row = -1 表示无表头（列名按位置 0,1,2,...）
// header_row >= 0 表示跳过 skip_rows 行之后的第几行为表头
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    pub skip_rows: usize,
    pub header_row: i64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            header_row: 0,
        }
    }
}

impl LoadOptions {
    /// 表头行下标；无表头时为 None
    pub fn header_index(&self) -> Option<usize> {
        usize::try_from(self.header_row).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 9)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_cell_value_from_text() {
        assert_eq!(CellValue::from_text("  "), CellValue::Empty);
        assert_eq!(CellValue::from_text("12.5"), CellValue::Number(12.5));
        assert_eq!(CellValue::from_text("-300"), CellValue::Number(-300.0));
        assert_eq!(
            CellValue::from_text(" N/A "),
            CellValue::Text("N/A".to_string())
        );
    }

    #[test]
    fn test_raw_table_pads_short_rows() {
        let table = RawTable::new(
            vec!["a".into(), "b".into()],
            vec![vec![CellValue::Number(1.0)]],
        );
        assert_eq!(table.cell(0, "b"), Some(&CellValue::Empty));
        assert_eq!(table.cell(0, "c"), None);
    }

    #[test]
    fn test_rename_is_pure() {
        let table = RawTable::new(vec!["ts".into()], vec![vec![CellValue::Empty]]);
        let mut renames = HashMap::new();
        renames.insert("ts".to_string(), "Time".to_string());

        let renamed = table.with_renamed_columns(&renames);
        assert_eq!(renamed.columns(), &["Time".to_string()]);
        assert_eq!(table.columns(), &["ts".to_string()]);
    }

    #[test]
    fn test_mapping_rejects_double_use() {
        let mut mapping = ColumnMapping::new();
        assert!(mapping.assign(CanonicalField::Pv, "col_a"));
        assert!(!mapping.assign(CanonicalField::Load, "col_a"));
        // 同一字段重新绑定允许
        assert!(mapping.assign(CanonicalField::Pv, "col_a"));
        assert_eq!(
            mapping.missing_fields(),
            vec![
                CanonicalField::Time,
                CanonicalField::Meter,
                CanonicalField::Load
            ]
        );
    }

    #[test]
    fn test_record_statistic_value_meter_abs() {
        let r = TimeSeriesRecord {
            timestamp: ts(1),
            pv_w: -5.0,
            meter_w: -2000.0,
            load_w: 300.0,
            source_row: 0,
        };
        assert_eq!(r.statistic_value(Channel::Pv), -5.0);
        assert_eq!(r.statistic_value(Channel::Meter), 2000.0);
        assert_eq!(r.statistic_kw(Channel::Meter), 2.0);
        assert_eq!(r.value(Channel::Meter), -2000.0);
    }

    #[test]
    fn test_load_options_header_index() {
        let opts = LoadOptions {
            skip_rows: 2,
            header_row: -1,
        };
        assert_eq!(opts.header_index(), None);
        assert_eq!(LoadOptions::default().header_index(), Some(0));
    }
}
