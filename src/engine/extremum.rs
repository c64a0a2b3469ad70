// ==========================================
// 光伏功率分析系统 - 极值与区间筛选
// ==========================================
// 职责: 单通道最大/最小点定位 + 值域筛选（高亮）
// 口径: 极值比较 Meter 取绝对值，PV / Load 使用带符号值；
//       并列时取存储顺序中的第一条；NaN 不参与
//       区间筛选一律比较带符号值，闭区间
// ==========================================

use crate::domain::summary::{ChannelExtrema, ExtremumPoint};
use crate::domain::telemetry::TimeSeriesRecord;
use crate::domain::types::Channel;

pub struct ExtremumFinder;

impl ExtremumFinder {
    pub fn new() -> Self {
        Self
    }

    /// 定位单通道极值点；无有效样本时为 None
    pub fn extrema(&self, records: &[TimeSeriesRecord], channel: Channel) -> Option<ChannelExtrema> {
        let mut max: Option<(&TimeSeriesRecord, f64)> = None;
        let mut min: Option<(&TimeSeriesRecord, f64)> = None;

        for record in records {
            let key = record.statistic_value(channel);
            if key.is_nan() {
                continue;
            }
            // 严格比较保证并列时保留先出现的记录
            if max.map_or(true, |(_, best)| key > best) {
                max = Some((record, key));
            }
            if min.map_or(true, |(_, best)| key < best) {
                min = Some((record, key));
            }
        }

        let (max_record, _) = max?;
        let (min_record, _) = min?;
        Some(ChannelExtrema {
            channel,
            max_point: Self::point(max_record, channel),
            min_point: Self::point(min_record, channel),
        })
    }

    /// 多通道极值（跳过无有效样本的通道）
    pub fn extrema_for(&self, records: &[TimeSeriesRecord], channels: &[Channel]) -> Vec<ChannelExtrema> {
        channels
            .iter()
            .filter_map(|&ch| self.extrema(records, ch))
            .collect()
    }

    /// 值域筛选：lower <= value <= upper（W，带符号）
    ///
    /// lower > upper 时返回空集合
    pub fn filter_range(
        &self,
        records: &[TimeSeriesRecord],
        channel: Channel,
        lower: f64,
        upper: f64,
    ) -> Vec<TimeSeriesRecord> {
        if lower > upper {
            return Vec::new();
        }
        records
            .iter()
            .filter(|r| {
                let v = r.value(channel);
                v >= lower && v <= upper
            })
            .cloned()
            .collect()
    }

    /// 默认高亮区间：通道带符号值的 (min, max)
    pub fn default_range(&self, records: &[TimeSeriesRecord], channel: Channel) -> Option<(f64, f64)> {
        records
            .iter()
            .map(|r| r.value(channel))
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }

    fn point(record: &TimeSeriesRecord, channel: Channel) -> ExtremumPoint {
        ExtremumPoint {
            timestamp: record.timestamp,
            value_w: record.value(channel),
            source_row: record.source_row,
        }
    }
}

impl Default for ExtremumFinder {
    fn default() -> Self {
        Self::new()
    }
}
