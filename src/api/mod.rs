// ==========================================
// 维修服务追踪系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 HTTP 路由调用
// 约束: 同步接口（SQLite 阻塞调用），由路由层放入阻塞线程池
// ==========================================

pub mod customer_api;
pub mod database_api;
pub mod error;
pub mod import_api;
pub mod repair_status_api;
pub mod response;
pub mod validator;

// 重导出核心类型
pub use customer_api::CustomerApi;
pub use database_api::{DatabaseApi, DatabaseStatus};
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use repair_status_api::RepairStatusApi;
pub use response::ApiResponse;
