// ==========================================
// 光伏功率分析系统 - 遥测导入器实现
// ==========================================
// 职责: 整合导入流程，从文件字节到时序记录
// 流程: 解析 → 映射 → 时间规范化 → DQ 校验
// ==========================================

use crate::domain::quality::DqReport;
use crate::domain::telemetry::{ColumnMapping, LoadOptions, RawTable, TimeSeriesRecord};
use crate::domain::types::{CanonicalField, FileKind};
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, ExcelParser};
use crate::importer::telemetry_importer_trait::{DataCleaner, FieldMapper, FileParser};
use crate::perf::PerfGuard;
use tracing::{debug, info, instrument};

/// 导入结果
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub table: RawTable,
    pub mapping: ColumnMapping,
    pub records: Vec<TimeSeriesRecord>,
    pub dq_report: DqReport,
}

// ==========================================
// TelemetryImporterImpl - 遥测导入器
// ==========================================
pub struct TelemetryImporterImpl {
    csv_parser: Box<dyn FileParser>,
    excel_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    data_cleaner: Box<dyn DataCleaner>,
    dq_validator: DqValidator,
}

impl TelemetryImporterImpl {
    /// 创建导入器
    ///
    /// # 参数
    /// - csv_parser / excel_parser: 文件解析器
    /// - field_mapper: 列映射器
    /// - data_cleaner: 时间规范化器
    /// - dq_validator: DQ 校验器
    pub fn new(
        csv_parser: Box<dyn FileParser>,
        excel_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        data_cleaner: Box<dyn DataCleaner>,
        dq_validator: DqValidator,
    ) -> Self {
        Self {
            csv_parser,
            excel_parser,
            field_mapper,
            data_cleaner,
            dq_validator,
        }
    }

    /// 使用默认组件创建
    pub fn with_defaults(interval_tolerance_ratio: f64) -> Self {
        Self::new(
            Box::new(CsvParser),
            Box::new(ExcelParser),
            Box::new(crate::importer::field_mapper::FieldMapper),
            Box::new(crate::importer::data_cleaner::DataCleaner),
            DqValidator::new(interval_tolerance_ratio),
        )
    }

    /// 阶段 0: 解析文件
    pub fn load(
        &self,
        bytes: &[u8],
        kind: FileKind,
        options: &LoadOptions,
    ) -> ImportResult<RawTable> {
        let _perf = PerfGuard::new("load_table");
        let parser = if kind.is_spreadsheet() {
            &self.excel_parser
        } else {
            &self.csv_parser
        };
        let table = parser.parse_bytes(bytes, options)?;
        info!(
            kind = %kind,
            columns = table.columns().len(),
            rows = table.row_count(),
            "文件解析完成"
        );
        Ok(table)
    }

    /// 阶段 1-3: 映射 → 规范化 → DQ 校验
    #[instrument(skip(self, table, user_choices), fields(rows = table.row_count()))]
    pub fn prepare(
        &self,
        table: RawTable,
        user_choices: &[(CanonicalField, String)],
    ) -> ImportResult<ImportOutcome> {
        // === 步骤 1: 列映射 ===
        debug!("步骤 1: 列映射");
        let mapping = self
            .field_mapper
            .resolve_mapping(table.columns(), user_choices)?;
        let mapped = self.field_mapper.apply_mapping(&table, &mapping);

        // === 步骤 2: 时间规范化 ===
        debug!("步骤 2: 时间规范化");
        let cleaned = {
            let _perf = PerfGuard::new("normalize_time");
            self.data_cleaner
                .normalize(&mapped, CanonicalField::Time.label())?
        };

        // === 步骤 3: DQ 校验 ===
        debug!("步骤 3: DQ 校验");
        let dq_report = self.dq_validator.validate(mapped.row_count(), &cleaned);

        if cleaned.records.is_empty() {
            return Err(ImportError::NoValidRows);
        }

        Ok(ImportOutcome {
            table,
            mapping,
            records: cleaned.records,
            dq_report,
        })
    }

    /// 完整导入: 解析 + 准备
    pub fn import(
        &self,
        bytes: &[u8],
        kind: FileKind,
        options: &LoadOptions,
        user_choices: &[(CanonicalField, String)],
    ) -> ImportResult<ImportOutcome> {
        let table = self.load(bytes, kind, options)?;
        self.prepare(table, user_choices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn importer() -> TelemetryImporterImpl {
        TelemetryImporterImpl::with_defaults(0.5)
    }

    #[test]
    fn test_import_csv_end_to_end() {
        let data = b"ts,inverter,grid,site\n\
                     2025-04-09 10:00:00,1000,-200,1200\n\
                     N/A,1,1,1\n\
                     2025-04-09 10:05:00,2000,100,2100\n";
        let choices = vec![
            (CanonicalField::Time, "ts".to_string()),
            (CanonicalField::Pv, "inverter".to_string()),
            (CanonicalField::Meter, "grid".to_string()),
            (CanonicalField::Load, "site".to_string()),
        ];

        let outcome = importer()
            .import(data, FileKind::Csv, &LoadOptions::default(), &choices)
            .unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.dq_report.dropped_time_rows, vec![1]);
        assert_eq!(outcome.records[0].meter_w, -200.0);
        // 原表保持原列名
        assert_eq!(outcome.table.columns()[0], "ts");
    }

    #[test]
    fn test_import_all_times_invalid() {
        let data = b"Time,PV(W),Meter(W),Load(W)\nN/A,1,2,3\nbad,4,5,6\n";
        let err = importer()
            .import(data, FileKind::Csv, &LoadOptions::default(), &[])
            .unwrap_err();
        assert!(matches!(err, ImportError::NoValidRows));
    }

    #[test]
    fn test_import_missing_column_halts_before_cleaning() {
        let data = b"Time,PV(W),Meter(W)\n2025-04-09 10:00:00,1,2\n";
        let err = importer()
            .import(data, FileKind::Csv, &LoadOptions::default(), &[])
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(f) if f == vec!["Load(W)"]));
    }
}
