// ==========================================
// 维修服务追踪系统 - 应用层
// ==========================================
// 职责: axum HTTP 集成,连接前端与后端
// ==========================================

pub mod http_routes;
pub mod state;

// 重导出
pub use http_routes::{router, serve};
pub use state::{get_default_upload_dir, AppState};
