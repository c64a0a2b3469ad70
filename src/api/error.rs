// ==========================================
// 光伏功率分析系统 - API层错误类型
// ==========================================
// 职责: 统一导入 / 引擎 / 配置 / 导出错误，供调用方按 kind() 分支
// 红线: 所有终止性错误都必须带可读原因，不静默降级
// ==========================================

use crate::config::ConfigError;
use crate::engine::error::{EngineError, PipelineError};
use crate::importer::error::ImportError;
use crate::report::error::ReportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 导入错误（终止本次运行）
    // ==========================================
    #[error("文件格式不支持: {0}")]
    UnsupportedFormat(String),

    #[error("文件解析失败: {0}")]
    ParseFailure(String),

    #[error("缺少必需列: {}", .0.join(", "))]
    MissingColumn(Vec<String>),

    #[error("时间列不存在: {0}")]
    MissingTimeColumn(String),

    #[error("没有可用的数据行")]
    NoValidRows,

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    // ==========================================
    // 校准错误
    // ==========================================
    #[error("校准参考点无效: 输入最小值与最大值相同 ({input_min} / {input_max})")]
    DegenerateCalibration { input_min: f64, input_max: f64 },

    // ==========================================
    // 调用方错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("尚无可用结果，请先完成一次成功运行")]
    NoResult,

    // ==========================================
    // 基础设施错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("导出失败: {0}")]
    ExportError(String),
}

impl ApiError {
    /// 稳定的错误分类码
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            ApiError::ParseFailure(_) => "PARSE_FAILURE",
            ApiError::MissingColumn(_) => "MISSING_COLUMN",
            ApiError::MissingTimeColumn(_) => "MISSING_TIME_COLUMN",
            ApiError::NoValidRows => "NO_VALID_ROWS",
            ApiError::FileReadError(_) => "FILE_READ_ERROR",
            ApiError::DegenerateCalibration { .. } => "DEGENERATE_CALIBRATION",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NoResult => "NO_RESULT",
            ApiError::ConfigError(_) => "CONFIG_ERROR",
            ApiError::ExportError(_) => "EXPORT_ERROR",
        }
    }
}

// ==========================================
// 从下层错误转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::UnsupportedFormat(ext) => ApiError::UnsupportedFormat(ext),
            ImportError::FileReadError(msg) => ApiError::FileReadError(msg),
            ImportError::ParseFailure(msg) => ApiError::ParseFailure(msg),
            ImportError::MissingColumn(fields) => ApiError::MissingColumn(fields),
            ImportError::MissingTimeColumn(label) => ApiError::MissingTimeColumn(label),
            ImportError::NoValidRows => ApiError::NoValidRows,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::DegenerateCalibration {
                input_min,
                input_max,
            } => ApiError::DegenerateCalibration {
                input_min,
                input_max,
            },
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Import(e) => e.into(),
            PipelineError::Engine(e) => e.into(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_lower_layer_codes() {
        let cases: Vec<ImportError> = vec![
            ImportError::UnsupportedFormat("txt".into()),
            ImportError::ParseFailure("x".into()),
            ImportError::MissingColumn(vec!["Load(W)".into()]),
            ImportError::MissingTimeColumn("Time".into()),
            ImportError::NoValidRows,
        ];
        for err in cases {
            let code = err.code();
            assert_eq!(ApiError::from(err).kind(), code);
        }

        let engine = EngineError::DegenerateCalibration {
            input_min: 1.0,
            input_max: 1.0,
        };
        let code = engine.code();
        assert_eq!(ApiError::from(PipelineError::from(engine)).kind(), code);
    }

    #[test]
    fn test_missing_column_message_names_fields() {
        let err = ApiError::MissingColumn(vec!["PV(W)".into(), "Load(W)".into()]);
        assert!(err.to_string().contains("PV(W), Load(W)"));
    }
}
