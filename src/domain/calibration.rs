// ==========================================
// 光伏功率分析系统 - 校准领域模型
// ==========================================
// 职责: 两点线性校准的参考点与参数
// 注意: 同一组 scale/offset 同时作用于 PV/Meter/Load 三个通道，
//       参考点只取自电表读数，不做分通道校准
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// CalibrationReference - 两点参考
// ==========================================
// input_*: 监控平台（SEMS）读数
// output_*: 实际电表读数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReference {
    pub input_min: f64,
    pub input_max: f64,
    pub output_min: f64,
    pub output_max: f64,
}

impl Default for CalibrationReference {
    /// 默认 0/200 → 0/200，即恒等变换
    fn default() -> Self {
        Self {
            input_min: 0.0,
            input_max: 200.0,
            output_min: 0.0,
            output_max: 200.0,
        }
    }
}

// ==========================================
// CalibrationParams - 线性变换 y = scale * x + offset
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParams {
    pub scale: f64,
    pub offset: f64,
}

impl CalibrationParams {
    /// 恒等变换
    pub const IDENTITY: CalibrationParams = CalibrationParams {
        scale: 1.0,
        offset: 0.0,
    };

    /// 对单个值应用变换
    pub fn transform(&self, value: f64) -> f64 {
        self.scale * value + self.offset
    }

    /// 公式展示文本（5 位小数）
    pub fn formula(&self) -> String {
        format!(
            "Adjusted = {:.5} × Reading + ({:.5})",
            self.scale, self.offset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform() {
        assert_eq!(CalibrationParams::IDENTITY.transform(-123.5), -123.5);
    }

    #[test]
    fn test_formula_text() {
        let params = CalibrationParams {
            scale: 0.9,
            offset: -1.5,
        };
        assert_eq!(params.formula(), "Adjusted = 0.90000 × Reading + (-1.50000)");
    }
}
