// ==========================================
// 光伏功率分析系统 - 文件解析器实现
// ==========================================
// 职责: 阶段 0 文件读取与解析
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 规则: 先跳过 skip_rows 个物理行（空行也计数），再去掉空白行，再取第 header_row 行为表头
// ==========================================

use crate::domain::telemetry::{CellValue, LoadOptions, RawTable};
use crate::domain::types::FileKind;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::telemetry_importer_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8], options: &LoadOptions) -> ImportResult<RawTable> {
        validate_options(options)?;

        // skip_rows 按物理行计数（含空行），csv 读取器会吞掉空行，须先在字节层跳过
        let body = skip_physical_lines(bytes, options.skip_rows);
        let delimiter = sniff_delimiter(body);
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .delimiter(delimiter)
            .from_reader(body);

        let mut grid = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<CellValue> = record
                .iter()
                .map(|v| CellValue::from_text(v.trim_start_matches('\u{feff}')))
                .collect();
            grid.push(row);
        }
        debug!(
            raw_rows = grid.len(),
            delimiter = %(delimiter as char),
            "CSV 读取完成"
        );

        build_table(grid, options)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8], options: &LoadOptions) -> ImportResult<RawTable> {
        validate_options(options)?;

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ParseFailure("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // Range 从第一个非空单元格开始，补回前导空行/空列，保证 skip_rows 从表格顶端计数
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut grid: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
        for data_row in range.rows() {
            let mut row = vec![CellValue::Empty; col_offset];
            row.extend(data_row.iter().map(excel_cell));
            grid.push(row);
        }
        debug!(sheet = %sheet_name, raw_rows = grid.len(), "Excel 读取完成");

        let rows = grid.into_iter().skip(options.skip_rows).collect();
        build_table(rows, options)
    }
}

/// calamine 单元格 → CellValue
fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::from_text(s),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.trim().to_string()),
        Data::Error(_) => CellValue::Empty,
    }
}

// ==========================================
// 通用文件解析器（根据文件类型自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 按文件类型解析
    pub fn load(
        &self,
        bytes: &[u8],
        kind: FileKind,
        options: &LoadOptions,
    ) -> ImportResult<RawTable> {
        match kind {
            FileKind::Csv => CsvParser.parse_bytes(bytes, options),
            FileKind::Xlsx | FileKind::Xls => ExcelParser.parse_bytes(bytes, options),
        }
    }

    /// 按文件名扩展名判定类型后解析
    pub fn load_named(
        &self,
        file_name: &str,
        bytes: &[u8],
        options: &LoadOptions,
    ) -> ImportResult<RawTable> {
        let kind = detect_kind(file_name)?;
        self.load(bytes, kind, options)
    }

    /// 读取本地文件后解析
    pub fn load_path<P: AsRef<Path>>(
        &self,
        file_path: P,
        options: &LoadOptions,
    ) -> ImportResult<RawTable> {
        let path = file_path.as_ref();
        let kind = detect_kind(&path.to_string_lossy())?;
        let bytes = std::fs::read(path)?;
        self.load(&bytes, kind, options)
    }
}

/// 由文件名判定文件类型
pub fn detect_kind(file_name: &str) -> ImportResult<FileKind> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    FileKind::from_extension(&ext).ok_or(ImportError::UnsupportedFormat(ext))
}

fn validate_options(options: &LoadOptions) -> ImportResult<()> {
    if options.header_row < -1 {
        return Err(ImportError::ParseFailure(format!(
            "表头行参数无效: {}（必须 >= -1）",
            options.header_row
        )));
    }
    Ok(())
}

/// 跳过开头 n 个物理行（以 \n 计，空行也算一行）
fn skip_physical_lines(bytes: &[u8], n: usize) -> &[u8] {
    let mut rest = bytes;
    for _ in 0..n {
        match rest.iter().position(|&b| b == b'\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return &[],
        }
    }
    rest
}

/// 由首个非空行推断分隔符（逗号 / 分号 / 制表符）
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let text = String::from_utf8_lossy(bytes);
    let sample = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");

    [b',', b';', b'\t']
        .into_iter()
        .map(|d| (d, sample.matches(d as char).count()))
        .max_by_key(|(_, count)| *count)
        .filter(|(_, count)| *count > 0)
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

/// 按读取选项把原始网格组装为表
///
/// grid 为已跳过 skip_rows 之后的行；此处再去除完全空白的行
fn build_table(grid: Vec<Vec<CellValue>>, options: &LoadOptions) -> ImportResult<RawTable> {
    let rows: Vec<Vec<CellValue>> = grid
        .into_iter()
        .filter(|row| !row.iter().all(CellValue::is_empty))
        .collect();

    let (columns, data_rows) = match options.header_index() {
        Some(header_idx) => {
            if header_idx >= rows.len() {
                return Err(ImportError::ParseFailure(format!(
                    "表头行 {} 超出范围（跳过 {} 行后仅剩 {} 个非空行）",
                    header_idx,
                    options.skip_rows,
                    rows.len()
                )));
            }
            let mut iter = rows.into_iter().skip(header_idx);
            let header = iter.next().unwrap_or_default();
            let labels: Vec<String> = header
                .iter()
                .enumerate()
                .map(|(i, cell)| header_label(i, cell))
                .collect();
            (labels, iter.collect::<Vec<_>>())
        }
        None => {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            let labels = (0..width).map(|i| i.to_string()).collect();
            (labels, rows)
        }
    };

    let width = columns.len();
    let mut table_rows = Vec::with_capacity(data_rows.len());
    for (idx, mut row) in data_rows.into_iter().enumerate() {
        if row.len() > width {
            if row[width..].iter().any(|c| !c.is_empty()) {
                return Err(ImportError::ParseFailure(format!(
                    "数据行 {} 字段数 {} 超过表头列数 {}",
                    idx,
                    row.len(),
                    width
                )));
            }
            row.truncate(width);
        }
        table_rows.push(row);
    }

    let columns = dedupe_labels(columns);
    if table_rows.is_empty() {
        warn!(columns = columns.len(), "文件中没有数据行");
    }

    Ok(RawTable::new(columns, table_rows))
}

/// 表头单元格 → 列名；空白列名记为 "Unnamed: {i}"
fn header_label(index: usize, cell: &CellValue) -> String {
    let label = cell.to_string().trim().to_string();
    if label.is_empty() {
        format!("Unnamed: {}", index)
    } else {
        label
    }
}

/// 重复列名追加 .1 / .2 后缀
fn dedupe_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut taken: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let mut candidate = label.clone();
        while taken.contains(&candidate) {
            let n = seen.entry(label.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{}.{}", label, n);
        }
        taken.push(candidate);
    }
    taken
}
