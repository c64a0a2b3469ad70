// ==========================================
// 光伏功率分析系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 以下错误均终止本次管道运行，不重试、不降级
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("文件解析失败: {0}")]
    ParseFailure(String),

    // ===== 列映射错误 =====
    #[error("缺少必需列: {}", .0.join(", "))]
    MissingColumn(Vec<String>),

    #[error("时间列不存在: {0}")]
    MissingTimeColumn(String),

    // ===== 数据清洗错误 =====
    #[error("没有可用的数据行（时间列全部无法解析）")]
    NoValidRows,
}

impl ImportError {
    /// 稳定的错误分类码（供调用方/前端分支）
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            ImportError::FileReadError(_) => "FILE_READ_ERROR",
            ImportError::ParseFailure(_) => "PARSE_FAILURE",
            ImportError::MissingColumn(_) => "MISSING_COLUMN",
            ImportError::MissingTimeColumn(_) => "MISSING_TIME_COLUMN",
            ImportError::NoValidRows => "NO_VALID_ROWS",
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::ParseFailure(format!("CSV: {}", err))
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ParseFailure(format!("Excel: {}", err))
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
