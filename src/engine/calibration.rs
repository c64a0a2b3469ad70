// ==========================================
// 光伏功率分析系统 - 校准引擎
// ==========================================
// 职责: 两点线性校准参数计算与应用
// 公式: scale  = (out_max - out_min) / (in_max - in_min)
//       offset = out_min - scale * in_min
// 红线: 同一组参数作用于 PV / Meter / Load 全部三个通道，
//       不得改成分通道校准
// ==========================================

use crate::domain::calibration::{CalibrationParams, CalibrationReference};
use crate::domain::telemetry::TimeSeriesRecord;
use crate::engine::error::{EngineError, EngineResult};
use tracing::{debug, info};

// ==========================================
// CalibrationEngine - 校准引擎
// ==========================================
// 无状态引擎，所有方法都是纯函数
pub struct CalibrationEngine;

impl CalibrationEngine {
    pub fn new() -> Self {
        Self
    }

    /// 由两点参考计算线性参数
    ///
    /// # 返回
    /// - Ok(CalibrationParams)
    /// - Err(DegenerateCalibration): in_max == in_min，或结果非有限值
    pub fn compute_params(&self, reference: &CalibrationReference) -> EngineResult<CalibrationParams> {
        let degenerate = || EngineError::DegenerateCalibration {
            input_min: reference.input_min,
            input_max: reference.input_max,
        };

        let span = reference.input_max - reference.input_min;
        if span == 0.0 {
            return Err(degenerate());
        }

        let scale = (reference.output_max - reference.output_min) / span;
        let offset = reference.output_min - scale * reference.input_min;
        if !scale.is_finite() || !offset.is_finite() {
            return Err(degenerate());
        }

        let params = CalibrationParams { scale, offset };
        info!(scale, offset, "校准参数已计算");
        Ok(params)
    }

    /// 试算单个读数（不影响序列）
    pub fn evaluate(&self, params: &CalibrationParams, probe_value: f64) -> f64 {
        params.transform(probe_value)
    }

    /// 对全部记录的三个通道应用同一变换，返回新记录集
    pub fn apply(
        &self,
        params: &CalibrationParams,
        records: &[TimeSeriesRecord],
    ) -> Vec<TimeSeriesRecord> {
        debug!(records = records.len(), "应用校准");
        records
            .iter()
            .map(|r| TimeSeriesRecord {
                timestamp: r.timestamp,
                pv_w: params.transform(r.pv_w),
                meter_w: params.transform(r.meter_w),
                load_w: params.transform(r.load_w),
                source_row: r.source_row,
            })
            .collect()
    }
}

impl Default for CalibrationEngine {
    fn default() -> Self {
        Self::new()
    }
}
