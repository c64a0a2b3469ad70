// ==========================================
// 光伏功率分析系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、会话内覆写
// 存储: 扁平 key-value JSON 文件（缺失即使用默认值）
// 优先级: 会话覆写 > 环境变量 > 配置文件 > 默认值
// ==========================================

use crate::domain::calibration::CalibrationReference;
use crate::domain::telemetry::LoadOptions;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 环境变量前缀: calibration/input_min → SEISTRACK_CALIBRATION_INPUT_MIN
pub const DEFAULT_ENV_PREFIX: &str = "SEISTRACK";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("配置文件格式错误: {0}")]
    ParseFailed(String),

    #[error("配置值无效: {key} = {value}")]
    InvalidValue { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    source: Option<PathBuf>,
    file_values: HashMap<String, String>,
    overrides: Mutex<HashMap<String, String>>,
    env_prefix: String,
}

impl ConfigManager {
    /// 仅使用默认值（及环境变量）
    pub fn new() -> Self {
        Self {
            source: None,
            file_values: HashMap::new(),
            overrides: Mutex::new(HashMap::new()),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// 从 JSON 文件加载；文件不存在时退回默认值
    ///
    /// # 参数
    /// - path: 配置文件路径，内容为 {"key": value} 扁平对象
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let mut manager = Self::new();
        manager.source = Some(path.to_path_buf());

        if !path.exists() {
            debug!(path = %path.display(), "配置文件不存在，使用默认值");
            return Ok(manager);
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        manager.file_values = parse_flat_json(&raw)?;
        info!(path = %path.display(), keys = manager.file_values.len(), "配置文件已加载");
        Ok(manager)
    }

    /// 从默认位置加载（用户配置目录/seistrack-power/config.json）
    pub fn from_default_location() -> ConfigResult<Self> {
        match default_config_path() {
            Some(path) => Self::from_file(path),
            None => {
                warn!("无法定位用户配置目录，使用默认值");
                Ok(Self::new())
            }
        }
    }

    /// 替换环境变量前缀
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 会话内覆写（不落盘）
    pub fn set_config_value(&self, key: &str, value: impl Into<String>) {
        let mut overrides = self
            .overrides
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        overrides.insert(key.to_string(), value.into());
    }

    /// 读取配置值（按优先级）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 各层均未配置
    pub fn get_config_value(&self, key: &str) -> Option<String> {
        let overridden = self
            .overrides
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned();
        overridden
            .or_else(|| std::env::var(self.env_var_name(key)).ok())
            .or_else(|| self.file_values.get(key).cloned())
    }

    /// 读取配置值，带默认值
    pub fn get_config_or_default(&self, key: &str) -> String {
        self.get_config_value(key)
            .unwrap_or_else(|| config_keys::default_value(key).to_string())
    }

    // ===== 类型化读取 =====

    /// 加载选项（skip_rows >= 0, header_row >= -1）
    pub fn load_options(&self) -> ConfigResult<LoadOptions> {
        let skip_rows: usize = self.parse_value(config_keys::LOAD_SKIP_ROWS)?;
        let header_row: i64 = self.parse_value(config_keys::LOAD_HEADER_ROW)?;
        if header_row < -1 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::LOAD_HEADER_ROW.to_string(),
                value: header_row.to_string(),
            });
        }
        Ok(LoadOptions {
            skip_rows,
            header_row,
        })
    }

    /// 校准参考点（不在此处校验退化，由校准引擎负责报告）
    pub fn calibration_reference(&self) -> ConfigResult<CalibrationReference> {
        Ok(CalibrationReference {
            input_min: self.parse_finite(config_keys::CALIBRATION_INPUT_MIN)?,
            input_max: self.parse_finite(config_keys::CALIBRATION_INPUT_MAX)?,
            output_min: self.parse_finite(config_keys::CALIBRATION_OUTPUT_MIN)?,
            output_max: self.parse_finite(config_keys::CALIBRATION_OUTPUT_MAX)?,
        })
    }

    pub fn probe_value(&self) -> ConfigResult<f64> {
        self.parse_finite(config_keys::CALIBRATION_PROBE_VALUE)
    }

    /// 采样间隔均匀性容差（>= 0）
    pub fn interval_tolerance_ratio(&self) -> ConfigResult<f64> {
        let ratio = self.parse_finite(config_keys::DQ_INTERVAL_TOLERANCE_RATIO)?;
        if ratio < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::DQ_INTERVAL_TOLERANCE_RATIO.to_string(),
                value: ratio.to_string(),
            });
        }
        Ok(ratio)
    }

    pub fn locale(&self) -> String {
        self.get_config_or_default(config_keys::UI_LOCALE)
    }

    /// 当前生效配置快照（JSON，按键排序）
    pub fn snapshot(&self) -> String {
        let effective: BTreeMap<&str, String> = config_keys::ALL
            .iter()
            .map(|key| (*key, self.get_config_or_default(key)))
            .collect();
        json!(effective).to_string()
    }

    fn env_var_name(&self, key: &str) -> String {
        format!(
            "{}_{}",
            self.env_prefix,
            key.replace('/', "_").to_uppercase()
        )
    }

    fn parse_value<T: std::str::FromStr>(&self, key: &str) -> ConfigResult<T> {
        let raw = self.get_config_or_default(key);
        raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
        })
    }

    fn parse_finite(&self, key: &str) -> ConfigResult<f64> {
        let value: f64 = self.parse_value(key)?;
        if !value.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        Ok(value)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// 默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("seistrack-power").join("config.json"))
}

fn parse_flat_json(raw: &str) -> ConfigResult<HashMap<String, String>> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ConfigError::ParseFailed("顶层必须是 JSON 对象".to_string()))?;

    let mut values = HashMap::with_capacity(object.len());
    for (key, v) in object {
        let text = match v {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            other => {
                return Err(ConfigError::InvalidValue {
                    key: key.clone(),
                    value: other.to_string(),
                })
            }
        };
        values.insert(key.clone(), text);
    }
    Ok(values)
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 加载
    pub const LOAD_SKIP_ROWS: &str = "load/skip_rows";
    pub const LOAD_HEADER_ROW: &str = "load/header_row";

    // 校准参考点
    pub const CALIBRATION_INPUT_MIN: &str = "calibration/input_min";
    pub const CALIBRATION_INPUT_MAX: &str = "calibration/input_max";
    pub const CALIBRATION_OUTPUT_MIN: &str = "calibration/output_min";
    pub const CALIBRATION_OUTPUT_MAX: &str = "calibration/output_max";
    pub const CALIBRATION_PROBE_VALUE: &str = "calibration/probe_value";

    // 数据质量
    pub const DQ_INTERVAL_TOLERANCE_RATIO: &str = "dq/interval_tolerance_ratio";

    // 界面
    pub const UI_LOCALE: &str = "ui/locale";

    pub const ALL: [&str; 9] = [
        LOAD_SKIP_ROWS,
        LOAD_HEADER_ROW,
        CALIBRATION_INPUT_MIN,
        CALIBRATION_INPUT_MAX,
        CALIBRATION_OUTPUT_MIN,
        CALIBRATION_OUTPUT_MAX,
        CALIBRATION_PROBE_VALUE,
        DQ_INTERVAL_TOLERANCE_RATIO,
        UI_LOCALE,
    ];

    /// 默认值；未知键为空字符串
    pub fn default_value(key: &str) -> &'static str {
        match key {
            LOAD_SKIP_ROWS | LOAD_HEADER_ROW => "0",
            CALIBRATION_INPUT_MIN | CALIBRATION_OUTPUT_MIN => "0",
            CALIBRATION_INPUT_MAX | CALIBRATION_OUTPUT_MAX => "200",
            CALIBRATION_PROBE_VALUE => "100",
            DQ_INTERVAL_TOLERANCE_RATIO => "0.5",
            UI_LOCALE => "zh-CN",
            _ => "",
        }
    }
}
