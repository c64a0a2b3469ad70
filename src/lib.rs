// ==========================================
// 光伏功率分析系统 - 核心库
// ==========================================
// 流程: 文件解析 → 列映射 → 时间规范化 → 校准 → 汇总 / 极值
// 技术栈: Rust + calamine + csv + tracing
// 系统定位: 单会话批处理分析（无持久化）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 外部数据
pub mod importer;

// 引擎层 - 校准 / 汇总 / 极值
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 报告层 - 导出与文本报告
pub mod report;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// 国际化
pub mod i18n;

// API 层 - 会话门面
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CanonicalField, Channel, FileKind};

// 领域实体
pub use domain::{
    CalibrationParams, CalibrationReference, ChannelExtrema, ChannelSummary, ColumnMapping,
    DailySummary, DqReport, HarvestGridOutcome, HarvestGridSplit, LoadOptions, RawTable,
    TimeSeriesRecord,
};

// 引擎
pub use engine::{
    AggregationEngine, CalibrationEngine, ExtremumFinder, PipelineInputs, PipelineOrchestrator,
    PipelineOutput,
};

// API
pub use api::{ApiError, ApiResult, DashboardApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "光伏功率分析系统";
