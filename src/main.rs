// ==========================================
// 光伏功率分析系统 - 命令行入口
// ==========================================
// 职责: 参数解析 → 配置合并 → 单次管道运行 → 报告 / 导出
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::Parser;
use seistrack_power::api::DashboardApi;
use seistrack_power::config::{config_keys, ConfigManager};
use seistrack_power::domain::types::{CanonicalField, Channel};
use seistrack_power::importer::DataCleanerImpl;
use seistrack_power::report::CHANGELOG_FILE_NAME;
use seistrack_power::{i18n, logging, PipelineInputs, APP_NAME, VERSION};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seistrack-power")]
#[command(author, version, about = "Solar plant power telemetry analysis", long_about = None)]
struct Cli {
    /// Telemetry file (.csv / .xlsx / .xls)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Rows to skip before the header row
    #[arg(long)]
    skip_rows: Option<usize>,

    /// Header row index after skipping (-1 = no header)
    #[arg(long, allow_hyphen_values = true)]
    header_row: Option<i64>,

    /// Column mapping, e.g. --map "PV=Inverter Power" (repeatable)
    #[arg(long = "map", value_name = "FIELD=COLUMN", value_parser = parse_mapping)]
    mappings: Vec<(CanonicalField, String)>,

    /// Calibration reference: raw reading (min)
    #[arg(long, allow_hyphen_values = true)]
    sems_min: Option<f64>,

    /// Calibration reference: raw reading (max)
    #[arg(long, allow_hyphen_values = true)]
    sems_max: Option<f64>,

    /// Calibration reference: trusted reading (min)
    #[arg(long, allow_hyphen_values = true)]
    grid_min: Option<f64>,

    /// Calibration reference: trusted reading (max)
    #[arg(long, allow_hyphen_values = true)]
    grid_max: Option<f64>,

    /// Probe value for the calibration what-if check
    #[arg(long, allow_hyphen_values = true)]
    probe: Option<f64>,

    /// Harvest vs grid window start
    #[arg(long, value_parser = parse_time)]
    from: Option<NaiveDateTime>,

    /// Harvest vs grid window end
    #[arg(long, value_parser = parse_time)]
    to: Option<NaiveDateTime>,

    /// Channels to annotate with extrema (default: all)
    #[arg(long, value_delimiter = ',', value_parser = parse_channel)]
    channels: Vec<Channel>,

    /// Highlight band, e.g. --highlight PV:1000:3000 (repeatable)
    #[arg(long = "highlight", value_name = "CHANNEL:LOWER:UPPER", value_parser = parse_band, allow_hyphen_values = true)]
    highlights: Vec<(Channel, f64, f64)>,

    /// Write the processed CSV to this path
    #[arg(long)]
    export: Option<PathBuf>,

    /// Write the changelog to this path (directory ⇒ changelog.txt inside it)
    #[arg(long)]
    changelog: Option<PathBuf>,

    /// Config file (default: user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report language (zh-CN / en)
    #[arg(long)]
    locale: Option<String>,

    /// Print the full result as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Only list columns, the automatic mapping and the candidates
    #[arg(long)]
    list_columns: bool,
}

fn parse_mapping(raw: &str) -> Result<(CanonicalField, String), String> {
    let (field, column) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=COLUMN, got '{}'", raw))?;
    let field = parse_field(field).ok_or_else(|| format!("unknown field '{}'", field))?;
    let column = column.trim();
    if column.is_empty() {
        return Err("column name is empty".to_string());
    }
    Ok((field, column.to_string()))
}

fn parse_field(raw: &str) -> Option<CanonicalField> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("time") {
        return Some(CanonicalField::Time);
    }
    CanonicalField::from_label(trimmed).or_else(|| Channel::parse(trimmed).map(|c| c.field()))
}

fn parse_channel(raw: &str) -> Result<Channel, String> {
    Channel::parse(raw).ok_or_else(|| format!("unknown channel '{}'", raw))
}

fn parse_band(raw: &str) -> Result<(Channel, f64, f64), String> {
    let parts: Vec<&str> = raw.splitn(3, ':').collect();
    if parts.len() != 3 {
        return Err(format!("expected CHANNEL:LOWER:UPPER, got '{}'", raw));
    }
    let channel = parse_channel(parts[0])?;
    let lower = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("lower bound: {}", e))?;
    let upper = parts[2]
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("upper bound: {}", e))?;
    Ok((channel, lower, upper))
}

fn parse_time(raw: &str) -> Result<NaiveDateTime, String> {
    DataCleanerImpl
        .parse_timestamp_str(raw)
        .ok_or_else(|| format!("unrecognized timestamp '{}'", raw))
}

fn load_config(cli: &Cli) -> Result<ConfigManager> {
    let config = match &cli.config {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::from_default_location()?,
    };

    // 命令行参数作为会话覆写
    let overrides: [(&str, Option<String>); 8] = [
        (config_keys::LOAD_SKIP_ROWS, cli.skip_rows.map(|v| v.to_string())),
        (config_keys::LOAD_HEADER_ROW, cli.header_row.map(|v| v.to_string())),
        (config_keys::CALIBRATION_INPUT_MIN, cli.sems_min.map(|v| v.to_string())),
        (config_keys::CALIBRATION_INPUT_MAX, cli.sems_max.map(|v| v.to_string())),
        (config_keys::CALIBRATION_OUTPUT_MIN, cli.grid_min.map(|v| v.to_string())),
        (config_keys::CALIBRATION_OUTPUT_MAX, cli.grid_max.map(|v| v.to_string())),
        (config_keys::CALIBRATION_PROBE_VALUE, cli.probe.map(|v| v.to_string())),
        (config_keys::UI_LOCALE, cli.locale.clone()),
    ];
    for (key, value) in overrides {
        if let Some(value) = value {
            config.set_config_value(key, value);
        }
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    tracing::info!("{} v{}", APP_NAME, VERSION);

    let config = load_config(&cli)?;
    i18n::set_locale(&config.locale());
    tracing::debug!(config = %config.snapshot(), "生效配置");

    let mut api = DashboardApi::from_config(&config)?;

    if let Some(path) = &cli.changelog {
        let target = if path.is_dir() {
            path.join(CHANGELOG_FILE_NAME)
        } else {
            path.clone()
        };
        std::fs::write(&target, api.changelog())
            .with_context(|| format!("写入版本记录失败: {}", target.display()))?;
        tracing::info!(path = %target.display(), "版本记录已写出");
    }

    let Some(file) = &cli.file else {
        if cli.changelog.is_some() {
            return Ok(());
        }
        bail!("缺少 --file 参数");
    };

    let bytes = std::fs::read(file).with_context(|| format!("读取文件失败: {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string());
    let load_options = config.load_options()?;

    if cli.list_columns {
        let preview = api.preview_columns(&file_name, &bytes, &load_options)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&preview)?);
        } else {
            println!("columns: {}", preview.columns.join(" | "));
            for (field, source) in preview.proposal.iter() {
                println!("  {} <- {}", field, source);
            }
            for field in &preview.missing_fields {
                println!("  {} <- ? (candidates: {})", field, preview.candidates.join(", "));
            }
        }
        return Ok(());
    }

    let mut inputs = PipelineInputs::new(file_name, bytes);
    inputs.load_options = load_options;
    inputs.mapping_choices = cli.mappings.clone();
    inputs.calibration_reference = config.calibration_reference()?;
    inputs.probe_value = config.probe_value()?;
    inputs.window_start = cli.from;
    inputs.window_end = cli.to;
    if !cli.channels.is_empty() {
        inputs.visible_channels = cli.channels.clone();
    }
    api.on_inputs_changed(inputs)?;

    if cli.json {
        println!("{}", api.output_json()?);
    } else {
        print!("{}", api.report()?);
    }

    for (channel, lower, upper) in &cli.highlights {
        let hits = api.filter(*channel, *lower, *upper)?;
        println!("{} [{} W, {} W]: {}", channel, lower, upper, hits.len());
        for record in hits {
            println!("  {}  {}", record.timestamp, record.value(*channel));
        }
    }

    if let Some(path) = &cli.export {
        let target = if path.is_dir() {
            path.join(seistrack_power::report::PROCESSED_FILE_NAME)
        } else {
            path.clone()
        };
        api.export_csv_to(&target)?;
        println!("exported: {}", target.display());
    }

    Ok(())
}
