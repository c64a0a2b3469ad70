// ==========================================
// 光伏功率分析系统 - 数据质量报告模型
// ==========================================
// 职责: 非阻断类问题的汇总（丢弃行、缺失值、采样间隔）
// 红线: 报告只提示，不终止管道
// ==========================================

use serde::{Deserialize, Serialize};

/// DQ 等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Info,
    Warning,
}

/// 单条 DQ 提示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqViolation {
    pub level: DqLevel,
    pub field: String,
    pub message: String,
    pub rows: Vec<usize>, // 涉及的数据行（源表下标），可为空
}

/// 采样间隔统计（秒）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingStats {
    pub median_interval_secs: f64,
    pub min_interval_secs: f64,
    pub max_interval_secs: f64,
    /// 所有间隔与中位数的偏差均在容差内
    pub uniform: bool,
}

/// DQ 报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_time_rows: Vec<usize>,
    pub non_numeric_cells: usize,
    pub duplicate_timestamps: usize,
    pub unsorted_input: bool,
    pub sampling: Option<SamplingStats>,
    pub violations: Vec<DqViolation>,
}

impl DqReport {
    pub fn warning_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.level == DqLevel::Warning)
            .count()
    }
}
