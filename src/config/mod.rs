// ==========================================
// 光伏功率分析系统 - 配置层
// ==========================================
// 职责: 加载选项 / 校准参考点 / DQ 容差 / 界面语言
// 存储: JSON 文件 + 环境变量 + 会话覆写
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{
    config_keys, default_config_path, ConfigError, ConfigManager, ConfigResult,
};
