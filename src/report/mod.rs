// ==========================================
// 光伏功率分析系统 - 报告层
// ==========================================
// 职责: 处理后数据导出 / 文本汇总报告 / 版本记录
// ==========================================

pub mod changelog;
pub mod csv_export;
pub mod error;
pub mod summary_report;

pub use changelog::{changelog_text, write_changelog, CHANGELOG_FILE_NAME};
pub use csv_export::{
    export_csv, export_header, processed_csv_bytes, write_processed_csv, PROCESSED_FILE_NAME,
};
pub use error::{ReportError, ReportResult};
pub use summary_report::{display_kw, render_summary};
