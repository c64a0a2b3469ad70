// ==========================================
// 光伏功率分析系统 - 处理后数据导出
// ==========================================
// 职责: 校准后序列 → CSV（含 kW 派生列）
// 规则: 数值按完整精度写出，不做显示取整
//       导出文件可按 header_row=0, skip_rows=0 重新导入
// ==========================================

use crate::domain::telemetry::{TimeSeriesRecord, TIMESTAMP_FORMAT};
use crate::domain::types::{CanonicalField, Channel};
use crate::report::error::ReportResult;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// 默认导出文件名
pub const PROCESSED_FILE_NAME: &str = "processed_data.csv";

/// 派生 kW 列
pub const PV_KW_COLUMN: &str = "PV_KW";
pub const LOAD_KW_COLUMN: &str = "Load_KW";
pub const METER_KW_ABS_COLUMN: &str = "Meter_KW_abs";

/// 导出表头
pub fn export_header() -> [&'static str; 7] {
    [
        CanonicalField::Time.label(),
        CanonicalField::Pv.label(),
        CanonicalField::Meter.label(),
        CanonicalField::Load.label(),
        PV_KW_COLUMN,
        LOAD_KW_COLUMN,
        METER_KW_ABS_COLUMN,
    ]
}

/// 写出处理后的记录（每条记录一行）
pub fn write_processed_csv<W: Write>(records: &[TimeSeriesRecord], writer: W) -> ReportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(export_header())?;

    for record in records {
        wtr.write_record([
            record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            record.pv_w.to_string(),
            record.meter_w.to_string(),
            record.load_w.to_string(),
            record.statistic_kw(Channel::Pv).to_string(),
            record.statistic_kw(Channel::Load).to_string(),
            record.statistic_kw(Channel::Meter).to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// 导出为内存字节（供下载）
pub fn processed_csv_bytes(records: &[TimeSeriesRecord]) -> ReportResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_processed_csv(records, &mut buf)?;
    Ok(buf)
}

/// 导出到文件
pub fn export_csv<P: AsRef<Path>>(records: &[TimeSeriesRecord], path: P) -> ReportResult<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_processed_csv(records, std::io::BufWriter::new(file))?;
    info!(path = %path.display(), rows = records.len(), "处理后数据已导出");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(pv: f64, meter: f64, load: f64) -> TimeSeriesRecord {
        TimeSeriesRecord {
            timestamp: NaiveDate::from_ymd_opt(2025, 4, 9)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            pv_w: pv,
            meter_w: meter,
            load_w: load,
            source_row: 0,
        }
    }

    #[test]
    fn test_header_and_rows() {
        let bytes = processed_csv_bytes(&[record(1234.5, -250.0, 984.5)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Time,PV(W),Meter(W),Load(W),PV_KW,Load_KW,Meter_KW_abs"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2025-04-09 10:30:00,1234.5,-250,984.5,1.2345,0.9845,0.25"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_full_precision() {
        let value = 0.1 + 0.2;
        let bytes = processed_csv_bytes(&[record(value, 0.0, 0.0)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("0.30000000000000004"));
    }

    #[test]
    fn test_empty_records_header_only() {
        let bytes = processed_csv_bytes(&[]).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROCESSED_FILE_NAME);
        export_csv(&[record(1.0, 2.0, 3.0)], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
