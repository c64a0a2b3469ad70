// ==========================================
// 光伏功率分析系统 - 文本汇总报告
// ==========================================
// 职责: 将一次运行的输出渲染为可读文本
// 规则: 仅显示层取整（kW 0 位小数，占比 1 位小数），
//       不修改运行输出本身
// ==========================================

use crate::domain::summary::{ChannelSummary, HarvestGridOutcome};
use crate::domain::telemetry::TIMESTAMP_FORMAT;
use crate::domain::types::ALL_CHANNELS;
use crate::engine::aggregation::AggregationEngine;
use crate::engine::orchestrator::PipelineOutput;
use crate::i18n::t_in;
use std::fmt::Write;

/// 显示取整（0 位小数）
pub fn display_kw(value: f64) -> String {
    format!("{:.0}", value)
}

fn display_pct(share: Option<f64>) -> String {
    match share {
        Some(s) => format!("{:.1}", s * 100.0),
        None => "-".to_string(),
    }
}

/// 渲染文本报告
///
/// # 参数
/// - output: 管道输出
/// - file_name: 源文件名（仅用于显示）
/// - locale: "zh-CN" / "en"
pub fn render_summary(output: &PipelineOutput, file_name: &str, locale: &str) -> String {
    let mut text = String::new();
    let tr = |key: &str, args: &[(&str, &str)]| t_in(locale, key, args);

    let _ = writeln!(text, "{}", tr("report.title", &[]));
    let _ = writeln!(text, "{}", tr("report.file", &[("file", file_name)]));
    let _ = writeln!(text, "{}", tr("report.run_id", &[("run_id", &output.run_id)]));
    let _ = writeln!(
        text,
        "{}",
        tr("report.date", &[("date", &output.summary.date_label)])
    );
    let _ = writeln!(
        text,
        "{}",
        tr(
            "report.records",
            &[
                ("kept", &output.dq_report.kept_rows.to_string()),
                ("total", &output.dq_report.total_rows.to_string()),
            ],
        )
    );
    if !output.dq_report.dropped_time_rows.is_empty() {
        let _ = writeln!(
            text,
            "{}",
            tr(
                "report.dropped",
                &[("count", &output.dq_report.dropped_time_rows.len().to_string())],
            )
        );
    }

    // ===== 校准 =====
    text.push('\n');
    let _ = writeln!(text, "{}", tr("report.calibration", &[("formula", &output.formula)]));
    let _ = writeln!(
        text,
        "{}",
        tr(
            "report.probe",
            &[
                ("input", &output.probe_value.to_string()),
                ("output", &format!("{:.2}", output.probe_result)),
            ],
        )
    );

    // ===== 通道汇总 =====
    text.push('\n');
    let _ = writeln!(text, "{}", tr("report.summary_header", &[]));
    for channel in ALL_CHANNELS {
        let name = channel.to_string();
        let line = match output.summary.channel(channel) {
            Some(s) => channel_line(&tr, &name, s),
            None => tr("report.channel_missing", &[("channel", &name)]),
        };
        let _ = writeln!(text, "  {}", line);
    }
    let _ = writeln!(text, "{}", tr("report.summation_note", &[]));

    // ===== 发电 / 电网拆分 =====
    text.push('\n');
    let (start, end) = match &output.split {
        HarvestGridOutcome::Empty { start, end } => (*start, *end),
        HarvestGridOutcome::Split(s) => (s.start, s.end),
    };
    let window = AggregationEngine::new().window_label(start, end);
    let _ = writeln!(text, "{}", tr("report.window", &[("window", &window)]));
    let split_line = match &output.split {
        HarvestGridOutcome::Empty { .. } => tr("report.split_empty", &[]),
        HarvestGridOutcome::Split(s) => tr(
            "report.split",
            &[
                ("solar", &display_kw(s.solar_kw)),
                ("solar_pct", &display_pct(s.solar_share())),
                ("grid", &display_kw(s.grid_kw)),
                ("grid_pct", &display_pct(s.grid_share())),
                ("load", &display_kw(s.load_kw())),
            ],
        ),
    };
    let _ = writeln!(text, "{}", split_line);

    // ===== 极值 =====
    if !output.extrema.is_empty() {
        text.push('\n');
        for ex in &output.extrema {
            let _ = writeln!(
                text,
                "{}",
                tr(
                    "report.extremum",
                    &[
                        ("channel", &ex.channel.to_string()),
                        ("max", &ex.max_point.label_kw()),
                        (
                            "max_time",
                            &ex.max_point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                        ),
                        ("min", &ex.min_point.label_kw()),
                        (
                            "min_time",
                            &ex.min_point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                        ),
                    ],
                )
            );
        }
    }

    // ===== 数据质量 =====
    let dq = &output.dq_report;
    if !dq.violations.is_empty() || dq.sampling.is_some() {
        text.push('\n');
        let _ = writeln!(
            text,
            "{}",
            tr("report.dq_header", &[("count", &dq.violations.len().to_string())])
        );
        for v in &dq.violations {
            let _ = writeln!(text, "  [{:?}] {}: {}", v.level, v.field, v.message);
        }
        if let Some(sampling) = &dq.sampling {
            let _ = writeln!(
                text,
                "  {}",
                tr(
                    "report.sampling",
                    &[
                        ("median", &sampling.median_interval_secs.to_string()),
                        ("min", &sampling.min_interval_secs.to_string()),
                        ("max", &sampling.max_interval_secs.to_string()),
                    ],
                )
            );
            if !sampling.uniform {
                let _ = writeln!(text, "  {}", tr("report.sampling_nonuniform", &[]));
            }
        }
    }

    text
}

fn channel_line<F>(tr: &F, name: &str, s: &ChannelSummary) -> String
where
    F: Fn(&str, &[(&str, &str)]) -> String,
{
    tr(
        "report.channel_line",
        &[
            ("channel", name),
            ("total", &display_kw(s.total)),
            ("min", &display_kw(s.min)),
            ("max", &display_kw(s.max)),
            ("mean", &display_kw(s.mean)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::orchestrator::{PipelineInputs, PipelineOrchestrator};

    fn output(csv: &str) -> PipelineOutput {
        PipelineOrchestrator::new(0.5)
            .run(&PipelineInputs::new("day.csv", csv.as_bytes().to_vec()))
            .unwrap()
    }

    const CSV: &str = "Time,PV(W),Meter(W),Load(W)\n\
                       2025-04-09 10:00:00,1000,-200,1200\n\
                       2025-04-09 10:05:00,2000,-400,2400\n\
                       2025-04-09 10:10:00,3000,-600,3600\n";

    #[test]
    fn test_display_rounding() {
        assert_eq!(display_kw(5.6), "6");
        assert_eq!(display_pct(Some(0.8333)), "83.3");
        assert_eq!(display_pct(None), "-");
    }

    #[test]
    fn test_render_english() {
        let text = render_summary(&output(CSV), "day.csv", "en");

        assert!(text.starts_with("Solar Power Analysis Report"));
        assert!(text.contains("Date: Apr 09, 2025"));
        assert!(text.contains("Valid records: 3 / 3"));
        assert!(text.contains("PV: total 6, min 1, max 3, mean 2"));
        assert!(text.contains("Harvest 6 kW (83.3%) / Grid 1 kW (16.7%) / Load 7 kW"));
        assert!(text.contains("METER: max -1 KW"));
    }

    #[test]
    fn test_render_reports_dropped_rows() {
        let csv = format!("{}N/A,1,1,1\n", CSV);
        let text = render_summary(&output(&csv), "day.csv", "zh-CN");
        assert!(text.contains("丢弃行（时间无法解析）: 1"));
        assert!(text.contains("有效记录: 3 / 4"));
    }
}
