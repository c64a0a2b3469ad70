// ==========================================
// 光伏功率分析系统 - 引擎层错误类型
// ==========================================

use crate::importer::error::ImportError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum EngineError {
    /// 两个参考输入相同（或非有限值），斜率无定义
    #[error("校准参考点无效: 输入最小值与最大值不能相同 ({input_min} / {input_max})")]
    DegenerateCalibration { input_min: f64, input_max: f64 },
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::DegenerateCalibration { .. } => "DEGENERATE_CALIBRATION",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// 一次管道运行的终止错误（任一阶段失败即停止）
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Import(e) => e.code(),
            PipelineError::Engine(e) => e.code(),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
