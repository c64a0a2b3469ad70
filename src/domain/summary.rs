// ==========================================
// 光伏功率分析系统 - 汇总结果模型
// ==========================================
// 职责: 通道汇总 / 发电-购电拆分 / 极值点
// 单位: 汇总类字段均为 kW；极值点保留原始 W
// ==========================================

use crate::domain::types::Channel;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// ChannelSummary - 单通道汇总（kW）
// ==========================================
// total 为逐点 kW 值的算术和，不按采样间隔积分
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel: Channel,
    pub total: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize, // 参与统计的有效样本数
}

// ==========================================
// DailySummary - 全序列汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,       // 代表日期（最早时间戳所在日）
    pub date_label: String,    // "Apr 09, 2025"
    pub pv: Option<ChannelSummary>,
    pub meter: Option<ChannelSummary>,
    pub load: Option<ChannelSummary>,
}

impl DailySummary {
    pub fn channel(&self, channel: Channel) -> Option<&ChannelSummary> {
        match channel {
            Channel::Pv => self.pv.as_ref(),
            Channel::Meter => self.meter.as_ref(),
            Channel::Load => self.load.as_ref(),
        }
    }
}

// ==========================================
// HarvestGridSplit - 时间窗内发电/购电拆分
// ==========================================
// solar_kw = Σ pv_w / 1000
// grid_kw  = Σ |meter_w| / 1000
// 负荷近似恒等式 load ≈ solar + grid 仅作展示，不做校验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestGridSplit {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub record_count: usize,
    pub solar_kw: f64,
    pub grid_kw: f64,
}

impl HarvestGridSplit {
    /// 推导负荷 = 发电 + |电网|
    pub fn load_kw(&self) -> f64 {
        self.solar_kw + self.grid_kw
    }

    /// 发电占比（0..=1）；负荷为 0 时为 None
    pub fn solar_share(&self) -> Option<f64> {
        let load = self.load_kw();
        if load == 0.0 {
            None
        } else {
            Some(self.solar_kw / load)
        }
    }

    /// 电网占比（0..=1）；负荷为 0 时为 None
    pub fn grid_share(&self) -> Option<f64> {
        let load = self.load_kw();
        if load == 0.0 {
            None
        } else {
            Some(self.grid_kw / load)
        }
    }
}

// ==========================================
// HarvestGridOutcome - 拆分结果
// ==========================================
// "窗口内无数据" 与 "0 瓦" 必须可区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarvestGridOutcome {
    Empty {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    Split(HarvestGridSplit),
}

impl HarvestGridOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, HarvestGridOutcome::Empty { .. })
    }

    pub fn split(&self) -> Option<&HarvestGridSplit> {
        match self {
            HarvestGridOutcome::Split(s) => Some(s),
            HarvestGridOutcome::Empty { .. } => None,
        }
    }
}

// ==========================================
// ExtremumPoint / ChannelExtrema - 极值标注
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremumPoint {
    pub timestamp: NaiveDateTime,
    pub value_w: f64, // 带符号原值
    pub source_row: usize,
}

impl ExtremumPoint {
    /// 标注文本（kW，0 位小数）
    pub fn label_kw(&self) -> String {
        format!("{:.0} KW", self.value_w / 1000.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelExtrema {
    pub channel: Channel,
    pub max_point: ExtremumPoint,
    pub min_point: ExtremumPoint,
}
