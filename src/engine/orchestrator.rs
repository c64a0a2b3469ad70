// ==========================================
// 光伏功率分析系统 - 管道编排器
// ==========================================
// 职责: 按固定顺序驱动一次完整运行
// 流程: 解析 → 映射 → 时间规范化 → 校准 → 汇总 / 拆分 / 极值
// 红线: 任一阶段返回错误即终止本次运行；运行无副作用，
//       输入变化时整体重跑，不做增量更新
// ==========================================

use crate::domain::calibration::{CalibrationParams, CalibrationReference};
use crate::domain::quality::DqReport;
use crate::domain::summary::{ChannelExtrema, DailySummary, HarvestGridOutcome};
use crate::domain::telemetry::{ColumnMapping, LoadOptions, RawTable, TimeSeriesRecord};
use crate::domain::types::{CanonicalField, Channel, FileKind, ALL_CHANNELS};
use crate::engine::aggregation::AggregationEngine;
use crate::engine::calibration::CalibrationEngine;
use crate::engine::error::PipelineResult;
use crate::engine::extremum::ExtremumFinder;
use crate::importer::error::ImportError;
use crate::importer::file_parser::detect_kind;
use crate::importer::TelemetryImporterImpl;
use crate::perf::PerfGuard;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// PipelineInputs - 一次运行的全部输入
// ==========================================
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub load_options: LoadOptions,
    pub mapping_choices: Vec<(CanonicalField, String)>,
    pub calibration_reference: CalibrationReference,
    pub probe_value: f64,
    /// 发电/购电拆分时间窗；未给出的一端取数据边界
    pub window_start: Option<NaiveDateTime>,
    pub window_end: Option<NaiveDateTime>,
    /// 需要标注极值的通道
    pub visible_channels: Vec<Channel>,
}

impl PipelineInputs {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            load_options: LoadOptions::default(),
            mapping_choices: Vec::new(),
            calibration_reference: CalibrationReference::default(),
            probe_value: 100.0,
            window_start: None,
            window_end: None,
            visible_channels: ALL_CHANNELS.to_vec(),
        }
    }
}

// ==========================================
// PipelineOutput - 一次运行的全部输出
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub run_id: String,
    pub file_kind: FileKind,
    pub columns: Vec<String>,
    pub mapping: ColumnMapping,

    // 校准
    pub params: CalibrationParams,
    pub probe_value: f64,
    pub probe_result: f64,
    pub formula: String,

    // 校准后序列
    pub records: Vec<TimeSeriesRecord>,

    // 汇总
    pub summary: DailySummary,
    pub time_range: (NaiveDateTime, NaiveDateTime),
    pub split: HarvestGridOutcome,
    pub extrema: Vec<ChannelExtrema>,

    pub dq_report: DqReport,
}

// ==========================================
// PipelineOrchestrator - 管道编排器
// ==========================================
pub struct PipelineOrchestrator {
    importer: TelemetryImporterImpl,
    calibration: CalibrationEngine,
    aggregation: AggregationEngine,
    extremum: ExtremumFinder,
}

impl PipelineOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - interval_tolerance_ratio: 采样间隔均匀性容差（相对中位数）
    pub fn new(interval_tolerance_ratio: f64) -> Self {
        Self::with_importer(TelemetryImporterImpl::with_defaults(interval_tolerance_ratio))
    }

    pub fn with_importer(importer: TelemetryImporterImpl) -> Self {
        Self {
            importer,
            calibration: CalibrationEngine::new(),
            aggregation: AggregationEngine::new(),
            extremum: ExtremumFinder::new(),
        }
    }

    pub fn calibration(&self) -> &CalibrationEngine {
        &self.calibration
    }

    pub fn aggregation(&self) -> &AggregationEngine {
        &self.aggregation
    }

    pub fn extremum(&self) -> &ExtremumFinder {
        &self.extremum
    }

    /// 仅解析文件（列映射前预览用）
    pub fn load_table(
        &self,
        file_name: &str,
        bytes: &[u8],
        options: &LoadOptions,
    ) -> PipelineResult<RawTable> {
        let kind = detect_kind(file_name)?;
        Ok(self.importer.load(bytes, kind, options)?)
    }

    /// 执行完整管道
    #[instrument(skip(self, inputs), fields(file = %inputs.file_name, run_id = tracing::field::Empty))]
    pub fn run(&self, inputs: &PipelineInputs) -> PipelineResult<PipelineOutput> {
        let _perf = PerfGuard::new("pipeline_run");
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        // ==========================================
        // 步骤1: 解析 + 映射 + 时间规范化
        // ==========================================
        debug!("步骤1: 导入");
        let file_kind = detect_kind(&inputs.file_name)?;
        let table = self
            .importer
            .load(&inputs.bytes, file_kind, &inputs.load_options)?;
        let columns = table.columns().to_vec();
        let outcome = self.importer.prepare(table, &inputs.mapping_choices)?;

        // ==========================================
        // 步骤2: 校准（同一参数作用于三个通道）
        // ==========================================
        debug!("步骤2: 校准");
        let params = self
            .calibration
            .compute_params(&inputs.calibration_reference)?;
        let probe_result = self.calibration.evaluate(&params, inputs.probe_value);
        let records = {
            let _perf = PerfGuard::new("calibrate");
            self.calibration.apply(&params, &outcome.records)
        };

        // ==========================================
        // 步骤3: 汇总 / 拆分 / 极值
        // ==========================================
        debug!("步骤3: 汇总");
        let _perf_aggregate = PerfGuard::new("aggregate");
        let summary = self
            .aggregation
            .daily_summary(&records)
            .ok_or(ImportError::NoValidRows)?;
        let time_range = self
            .aggregation
            .time_bounds(&records)
            .ok_or(ImportError::NoValidRows)?;
        let start = inputs.window_start.unwrap_or(time_range.0);
        let end = inputs.window_end.unwrap_or(time_range.1);
        let split = self.aggregation.harvest_grid_split(&records, start, end);
        let extrema = self
            .extremum
            .extrema_for(&records, &inputs.visible_channels);

        info!(
            records = records.len(),
            dropped = outcome.dq_report.dropped_time_rows.len(),
            dq_warnings = outcome.dq_report.warning_count(),
            empty_window = split.is_empty(),
            "管道运行完成"
        );

        Ok(PipelineOutput {
            run_id,
            file_kind,
            columns,
            mapping: outcome.mapping,
            formula: params.formula(),
            params,
            probe_value: inputs.probe_value,
            probe_result,
            records,
            summary,
            time_range,
            split,
            extrema,
            dq_report: outcome.dq_report,
        })
    }
}
