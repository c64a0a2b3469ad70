// ==========================================
// 光伏功率分析系统 - 领域类型定义
// ==========================================
// 职责: 标准字段 / 功率通道 / 文件类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 标准字段 (Canonical Field)
// ==========================================
// 导入后每张表必须恰好包含这四列
// 顺序即校验与报错顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    Time,
    Pv,
    Meter,
    Load,
}

/// 全部必需字段（按校验顺序）
pub const REQUIRED_FIELDS: [CanonicalField; 4] = [
    CanonicalField::Time,
    CanonicalField::Pv,
    CanonicalField::Meter,
    CanonicalField::Load,
];

impl CanonicalField {
    /// 表头中的标准列名（大小写敏感）
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalField::Time => "Time",
            CanonicalField::Pv => "PV(W)",
            CanonicalField::Meter => "Meter(W)",
            CanonicalField::Load => "Load(W)",
        }
    }

    /// 按标准列名反查字段（精确匹配）
    pub fn from_label(label: &str) -> Option<Self> {
        REQUIRED_FIELDS.iter().copied().find(|f| f.label() == label)
    }

    /// 数值字段对应的功率通道（Time 没有）
    pub fn channel(&self) -> Option<Channel> {
        match self {
            CanonicalField::Time => None,
            CanonicalField::Pv => Some(Channel::Pv),
            CanonicalField::Meter => Some(Channel::Meter),
            CanonicalField::Load => Some(Channel::Load),
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 功率通道 (Channel)
// ==========================================
// Meter 的符号表示购电/上网方向
// 汇总与极值统计时 Meter 取绝对值，PV/Load 保留符号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Pv,
    Meter,
    Load,
}

/// 全部功率通道
pub const ALL_CHANNELS: [Channel; 3] = [Channel::Pv, Channel::Meter, Channel::Load];

impl Channel {
    /// 对应的标准字段
    pub fn field(&self) -> CanonicalField {
        match self {
            Channel::Pv => CanonicalField::Pv,
            Channel::Meter => CanonicalField::Meter,
            Channel::Load => CanonicalField::Load,
        }
    }

    /// 统计时是否按绝对值处理
    pub fn uses_magnitude(&self) -> bool {
        matches!(self, Channel::Meter)
    }

    /// 解析命令行/配置中的通道名（不区分大小写）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "PV" | "PV(W)" => Some(Channel::Pv),
            "METER" | "METER(W)" | "GRID" => Some(Channel::Meter),
            "LOAD" | "LOAD(W)" => Some(Channel::Load),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Pv => write!(f, "PV"),
            Channel::Meter => write!(f, "METER"),
            Channel::Load => write!(f, "LOAD"),
        }
    }
}

// ==========================================
// 文件类型 (File Kind)
// ==========================================
// 扩展名与解析策略一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Xlsx,
    Xls,
}

impl FileKind {
    /// 由扩展名判定（不区分大小写，可带前导点）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_lowercase().as_str() {
            "csv" => Some(FileKind::Csv),
            "xlsx" => Some(FileKind::Xlsx),
            "xls" => Some(FileKind::Xls),
            _ => None,
        }
    }

    /// 是否为电子表格（走 calamine 解析）
    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, FileKind::Xlsx | FileKind::Xls)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Csv => write!(f, "csv"),
            FileKind::Xlsx => write!(f, "xlsx"),
            FileKind::Xls => write!(f, "xls"),
        }
    }
}
