// ==========================================
// 光伏功率分析系统 - 驾驶舱 API
// ==========================================
// 职责: 单会话门面，持有最近一次成功运行的结果
// 规则: 输入变化时（on_inputs_changed）整体重跑管道，
//       运行失败则清空旧结果，不保留部分状态
// 架构: 调用方（CLI / 渲染层）→ DashboardApi → PipelineOrchestrator
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::calibration::CalibrationReference;
use crate::domain::summary::HarvestGridOutcome;
use crate::domain::telemetry::{CellValue, ColumnMapping, LoadOptions, TimeSeriesRecord};
use crate::domain::types::{CanonicalField, Channel};
use crate::engine::orchestrator::{PipelineInputs, PipelineOrchestrator, PipelineOutput};
use crate::i18n::normalize_locale;
use crate::importer::FieldMapperImpl;
use crate::report;

/// 预览行数
const PREVIEW_ROWS: usize = 5;

// ==========================================
// ColumnPreview - 列映射前的表预览
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnPreview {
    pub columns: Vec<String>,
    pub head: Vec<Vec<CellValue>>,
    /// 自动映射结果（列名与标准字段名完全一致）
    pub proposal: ColumnMapping,
    pub missing_fields: Vec<CanonicalField>,
    /// 可供逐个确认的候选源列
    pub candidates: Vec<String>,
}

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    orchestrator: PipelineOrchestrator,
    locale: String,
    last_inputs: Option<PipelineInputs>,
    last_output: Option<PipelineOutput>,
}

impl DashboardApi {
    /// 创建新的DashboardApi实例
    ///
    /// # 参数
    /// - interval_tolerance_ratio: 采样均匀性容差
    /// - locale: 报告语言
    pub fn new(interval_tolerance_ratio: f64, locale: &str) -> Self {
        Self {
            orchestrator: PipelineOrchestrator::new(interval_tolerance_ratio),
            locale: normalize_locale(locale).to_string(),
            last_inputs: None,
            last_output: None,
        }
    }

    /// 由配置创建
    pub fn from_config(config: &ConfigManager) -> ApiResult<Self> {
        Ok(Self::new(config.interval_tolerance_ratio()?, &config.locale()))
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: &str) {
        self.locale = normalize_locale(locale).to_string();
    }

    // ==========================================
    // 列映射前
    // ==========================================

    /// 解析文件并给出映射建议
    pub fn preview_columns(
        &self,
        file_name: &str,
        bytes: &[u8],
        options: &LoadOptions,
    ) -> ApiResult<ColumnPreview> {
        validate_load_options(options)?;
        let table = self.orchestrator.load_table(file_name, bytes, options)?;

        let mapper = FieldMapperImpl;
        let proposal = mapper.propose_mapping(table.columns());
        let candidates = mapper.candidate_columns(table.columns(), &proposal);

        Ok(ColumnPreview {
            columns: table.columns().to_vec(),
            head: table.head(PREVIEW_ROWS).to_vec(),
            missing_fields: proposal.missing_fields(),
            proposal,
            candidates,
        })
    }

    // ==========================================
    // 运行
    // ==========================================

    /// 输入变化：整体重跑管道
    ///
    /// # 返回
    /// - Ok(&PipelineOutput): 新结果（同时成为会话当前结果）
    /// - Err: 任一阶段失败；会话结果被清空
    pub fn on_inputs_changed(&mut self, inputs: PipelineInputs) -> ApiResult<&PipelineOutput> {
        self.last_output = None;
        validate_inputs(&inputs)?;

        match self.orchestrator.run(&inputs) {
            Ok(output) => {
                info!(run_id = %output.run_id, "会话结果已更新");
                self.last_inputs = Some(inputs);
                self.last_output = Some(output);
                self.current()
            }
            Err(e) => {
                warn!(code = e.code(), error = %e, "管道运行失败");
                self.last_inputs = Some(inputs);
                Err(e.into())
            }
        }
    }

    /// 会话当前结果
    pub fn current(&self) -> ApiResult<&PipelineOutput> {
        self.last_output.as_ref().ok_or(ApiError::NoResult)
    }

    pub fn last_inputs(&self) -> Option<&PipelineInputs> {
        self.last_inputs.as_ref()
    }

    // ==========================================
    // 基于当前结果的交互查询
    // ==========================================

    /// 校准试算（不影响当前序列）
    pub fn evaluate_probe(
        &self,
        reference: &CalibrationReference,
        probe_value: f64,
    ) -> ApiResult<f64> {
        if !probe_value.is_finite() {
            return Err(ApiError::InvalidInput(format!("试算值无效: {}", probe_value)));
        }
        let engine = self.orchestrator.calibration();
        let params = engine.compute_params(reference)?;
        Ok(engine.evaluate(&params, probe_value))
    }

    /// 任意时间窗的发电 / 电网拆分
    pub fn split(&self, start: NaiveDateTime, end: NaiveDateTime) -> ApiResult<HarvestGridOutcome> {
        let output = self.current()?;
        Ok(self
            .orchestrator
            .aggregation()
            .harvest_grid_split(&output.records, start, end))
    }

    /// 值域筛选（高亮）
    pub fn filter(&self, channel: Channel, lower: f64, upper: f64) -> ApiResult<Vec<TimeSeriesRecord>> {
        if lower.is_nan() || upper.is_nan() {
            return Err(ApiError::InvalidInput("筛选区间不能为 NaN".to_string()));
        }
        let output = self.current()?;
        Ok(self
            .orchestrator
            .extremum()
            .filter_range(&output.records, channel, lower, upper))
    }

    /// 默认高亮区间
    pub fn default_band(&self, channel: Channel) -> ApiResult<Option<(f64, f64)>> {
        let output = self.current()?;
        Ok(self
            .orchestrator
            .extremum()
            .default_range(&output.records, channel))
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 处理后数据（CSV 字节）
    pub fn export_csv_bytes(&self) -> ApiResult<Vec<u8>> {
        Ok(report::processed_csv_bytes(&self.current()?.records)?)
    }

    /// 处理后数据写入文件
    pub fn export_csv_to<P: AsRef<Path>>(&self, path: P) -> ApiResult<()> {
        Ok(report::export_csv(&self.current()?.records, path)?)
    }

    /// 文本汇总报告
    pub fn report(&self) -> ApiResult<String> {
        let output = self.current()?;
        let file_name = self
            .last_inputs
            .as_ref()
            .map(|i| i.file_name.as_str())
            .unwrap_or("");
        Ok(report::render_summary(output, file_name, &self.locale))
    }

    /// 版本记录（与会话状态无关）
    pub fn changelog(&self) -> String {
        report::changelog_text(&self.locale)
    }

    /// 当前结果 JSON（供渲染层）
    pub fn output_json(&self) -> ApiResult<String> {
        serde_json::to_string_pretty(self.current()?)
            .map_err(|e| ApiError::ExportError(e.to_string()))
    }
}

fn validate_load_options(options: &LoadOptions) -> ApiResult<()> {
    if options.header_row < -1 {
        return Err(ApiError::InvalidInput(format!(
            "表头行必须 >= -1: {}",
            options.header_row
        )));
    }
    Ok(())
}

fn validate_inputs(inputs: &PipelineInputs) -> ApiResult<()> {
    validate_load_options(&inputs.load_options)?;

    let reference = &inputs.calibration_reference;
    let values = [
        reference.input_min,
        reference.input_max,
        reference.output_min,
        reference.output_max,
        inputs.probe_value,
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ApiError::InvalidInput("校准参数必须为有限数值".to_string()));
    }
    Ok(())
}
