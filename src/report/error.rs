// ==========================================
// 光伏功率分析系统 - 报告层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV 写出失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("文件写入失败: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn code(&self) -> &'static str {
        match self {
            ReportError::Csv(_) => "EXPORT_FAILURE",
            ReportError::Io(_) => "EXPORT_IO_FAILURE",
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
