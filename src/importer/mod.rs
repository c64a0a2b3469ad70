// ==========================================
// 光伏功率分析系统 - 导入层
// ==========================================
// 职责: 上传文件 → 通用表 → 标准字段 → 时序记录
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod telemetry_importer_impl;
pub mod telemetry_importer_trait;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use dq_validator::DqValidator;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{detect_kind, CsvParser, ExcelParser, UniversalFileParser};
pub use telemetry_importer_impl::{ImportOutcome, TelemetryImporterImpl};

// 重导出 Trait 接口
pub use telemetry_importer_trait::{CleanedSeries, DataCleaner, FieldMapper, FileParser};
