// ==========================================
// 光伏功率分析系统 - 汇总引擎
// ==========================================
// 职责: 通道汇总（kW） / 代表日期 / 时间窗发电-购电拆分
// 口径: Meter 逐点取绝对值后统计；PV / Load 使用带符号值
//       total 为逐点求和（功率样本之和，非能量积分）
//       NaN 样本跳过
// ==========================================

use crate::domain::summary::{
    ChannelSummary, DailySummary, HarvestGridOutcome, HarvestGridSplit,
};
use crate::domain::telemetry::TimeSeriesRecord;
use crate::domain::types::Channel;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

/// 代表日期显示格式
pub const DATE_LABEL_FORMAT: &str = "%b %d, %Y";

/// 时间窗显示格式
pub const WINDOW_LABEL_FORMAT: &str = "%b %d, %Y %H:%M:%S";

// ==========================================
// AggregationEngine - 汇总引擎
// ==========================================
// 无状态引擎，与记录顺序无关
pub struct AggregationEngine;

impl AggregationEngine {
    pub fn new() -> Self {
        Self
    }

    /// 单通道汇总
    ///
    /// # 返回
    /// - Some(ChannelSummary): 至少有一个有效样本
    /// - None: 无有效样本
    pub fn summarize(&self, records: &[TimeSeriesRecord], channel: Channel) -> Option<ChannelSummary> {
        let mut total = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut count = 0usize;

        for kw in records
            .iter()
            .map(|r| r.statistic_kw(channel))
            .filter(|v| !v.is_nan())
        {
            total += kw;
            min = min.min(kw);
            max = max.max(kw);
            count += 1;
        }

        if count == 0 {
            return None;
        }

        Some(ChannelSummary {
            channel,
            total,
            min,
            max,
            mean: total / count as f64,
            count,
        })
    }

    /// 代表日期：最早时间戳所在日；空集合为 None
    pub fn representative_date(&self, records: &[TimeSeriesRecord]) -> Option<NaiveDate> {
        records.iter().map(|r| r.timestamp).min().map(|ts| ts.date())
    }

    /// 全序列汇总（PV / Meter / Load）
    pub fn daily_summary(&self, records: &[TimeSeriesRecord]) -> Option<DailySummary> {
        let date = self.representative_date(records)?;
        Some(DailySummary {
            date,
            date_label: date.format(DATE_LABEL_FORMAT).to_string(),
            pv: self.summarize(records, Channel::Pv),
            meter: self.summarize(records, Channel::Meter),
            load: self.summarize(records, Channel::Load),
        })
    }

    /// 时间范围（最早, 最晚）
    pub fn time_bounds(&self, records: &[TimeSeriesRecord]) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min = records.iter().map(|r| r.timestamp).min()?;
        let max = records.iter().map(|r| r.timestamp).max()?;
        Some((min, max))
    }

    /// 时间窗 [start, end]（闭区间）内的发电 / 购电拆分
    ///
    /// 窗口内无记录（含 start > end）时返回 Empty，不报错
    pub fn harvest_grid_split(
        &self,
        records: &[TimeSeriesRecord],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> HarvestGridOutcome {
        let in_window: Vec<&TimeSeriesRecord> = records
            .iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .collect();

        if in_window.is_empty() {
            debug!(%start, %end, "时间窗内无数据");
            return HarvestGridOutcome::Empty { start, end };
        }

        let sum_kw = |channel: Channel| -> f64 {
            in_window
                .iter()
                .map(|r| r.statistic_kw(channel))
                .filter(|v| !v.is_nan())
                .sum()
        };

        HarvestGridOutcome::Split(HarvestGridSplit {
            start,
            end,
            record_count: in_window.len(),
            solar_kw: sum_kw(Channel::Pv),
            grid_kw: sum_kw(Channel::Meter),
        })
    }

    /// 时间窗显示文本
    pub fn window_label(&self, start: NaiveDateTime, end: NaiveDateTime) -> String {
        format!(
            "{}  to  {}",
            start.format(WINDOW_LABEL_FORMAT),
            end.format(WINDOW_LABEL_FORMAT)
        )
    }
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new()
    }
}
