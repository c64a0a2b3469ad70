// ==========================================
// 光伏功率分析系统 - 引擎层
// ==========================================
// 职责: 校准 / 汇总 / 极值筛选 / 管道编排
// 红线: 引擎不做 I/O，只接受并返回内存中的记录集
// ==========================================

pub mod aggregation;
pub mod calibration;
pub mod error;
pub mod extremum;
pub mod orchestrator;

// 重导出核心引擎
pub use aggregation::{AggregationEngine, DATE_LABEL_FORMAT, WINDOW_LABEL_FORMAT};
pub use calibration::CalibrationEngine;
pub use error::{EngineError, EngineResult, PipelineError, PipelineResult};
pub use extremum::ExtremumFinder;
pub use orchestrator::{PipelineInputs, PipelineOrchestrator, PipelineOutput};
