// ==========================================
// 光伏功率分析系统 - 遥测导入 Trait
// ==========================================
// 职责: 定义导入各阶段接口（不包含实现）
// 流程: 文件解析 → 列映射 → 时间规范化
// ==========================================

use crate::domain::telemetry::{ColumnMapping, LoadOptions, RawTable, TimeSeriesRecord};
use crate::domain::types::CanonicalField;
use crate::importer::error::ImportResult;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件内容为通用表
    ///
    /// # 参数
    /// - bytes: 上传文件的原始字节
    /// - options: skip_rows / header_row
    ///
    /// # 返回
    /// - Ok(RawTable): 列名 + 数据行
    /// - Err(ParseFailure): 内容损坏、表头行越界等
    fn parse_bytes(&self, bytes: &[u8], options: &LoadOptions) -> ImportResult<RawTable>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 列映射接口（阶段 1）
// 实现者: FieldMapper
pub trait FieldMapper: Send + Sync {
    /// 解析完整映射
    ///
    /// # 参数
    /// - columns: 源表列名
    /// - user_choices: 用户逐个确认的 (标准字段, 源列名)，按确认顺序
    ///
    /// # 返回
    /// - Ok(ColumnMapping): 四个标准字段均已映射
    /// - Err(MissingTimeColumn): 时间字段无源列（优先报告）
    /// - Err(MissingColumn): 仍有数值字段无源列
    fn resolve_mapping(
        &self,
        columns: &[String],
        user_choices: &[(CanonicalField, String)],
    ) -> ImportResult<ColumnMapping>;

    /// 应用映射：返回列名已替换为标准列名的新表
    fn apply_mapping(&self, table: &RawTable, mapping: &ColumnMapping) -> RawTable;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 时间规范化与清洗接口（阶段 2）
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 解析时间列并丢弃无法解析的行
    ///
    /// # 参数
    /// - table: 已应用映射的表
    /// - time_column: 时间列名
    ///
    /// # 返回
    /// - Ok(CleanedSeries): 存活记录 + 清洗统计
    /// - Err(MissingTimeColumn): 时间列不存在
    fn normalize(&self, table: &RawTable, time_column: &str) -> ImportResult<CleanedSeries>;
}

/// 清洗结果
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSeries {
    pub records: Vec<TimeSeriesRecord>,
    /// 时间无法解析而被丢弃的数据行下标
    pub dropped_rows: Vec<usize>,
    /// 数值单元格为空或非数值的个数（记为 NaN）
    pub non_numeric_cells: usize,
}
