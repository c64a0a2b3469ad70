// ==========================================
// 光伏功率分析系统 - API 层
// ==========================================
// 职责: 面向调用方（CLI / 渲染层）的会话门面与统一错误
// ==========================================

pub mod dashboard_api;
pub mod error;

pub use dashboard_api::{ColumnPreview, DashboardApi};
pub use error::{ApiError, ApiResult};
