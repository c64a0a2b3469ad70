// ==========================================
// 光伏功率分析系统 - 领域模型层
// ==========================================
// 职责: 定义遥测表、时序记录、校准参数、汇总结果
// 红线: 不含解析逻辑，不含计算逻辑
// ==========================================

pub mod calibration;
pub mod quality;
pub mod summary;
pub mod telemetry;
pub mod types;

// 重导出核心类型
pub use calibration::{CalibrationParams, CalibrationReference};
pub use quality::{DqLevel, DqReport, DqViolation, SamplingStats};
pub use summary::{
    ChannelExtrema, ChannelSummary, DailySummary, ExtremumPoint, HarvestGridOutcome,
    HarvestGridSplit,
};
pub use telemetry::{CellValue, ColumnMapping, LoadOptions, RawTable, TimeSeriesRecord};
pub use types::{CanonicalField, Channel, FileKind, ALL_CHANNELS, REQUIRED_FIELDS};
