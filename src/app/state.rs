// ==========================================
// 维修服务追踪系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: ConnectionManager 由状态显式持有，各 API 共享同一个实例
// ==========================================

use crate::api::{CustomerApi, DatabaseApi, ImportApi, RepairStatusApi};
use crate::config::AppConfig;
use crate::repository::ConnectionManager;
use std::path::PathBuf;
use std::sync::Arc;

/// 应用状态
///
/// 所有字段均为 Arc，克隆开销小，可直接作为 axum State
#[derive(Clone)]
pub struct AppState {
    /// 进程配置
    pub config: Arc<AppConfig>,

    /// 当前数据库连接
    pub connections: Arc<ConnectionManager>,

    /// 数据库连接API
    pub database_api: Arc<DatabaseApi>,

    /// 数据导入API
    pub import_api: Arc<ImportApi>,

    /// 客户API
    pub customer_api: Arc<CustomerApi>,

    /// 维修状态查询API
    pub repair_status_api: Arc<RepairStatusApi>,

    /// 上传文件暂存目录
    pub upload_dir: PathBuf,
}

impl AppState {
    /// 创建新的AppState实例（尚未连接数据库）
    pub fn new(config: AppConfig) -> Self {
        Self::with_upload_dir(config, get_default_upload_dir())
    }

    pub fn with_upload_dir(config: AppConfig, upload_dir: PathBuf) -> Self {
        tracing::info!(upload_dir = %upload_dir.display(), "初始化AppState");

        let connections = Arc::new(ConnectionManager::new());

        Self {
            database_api: Arc::new(DatabaseApi::new(connections.clone())),
            import_api: Arc::new(ImportApi::new(connections.clone(), &config)),
            customer_api: Arc::new(CustomerApi::new(connections.clone())),
            repair_status_api: Arc::new(RepairStatusApi::new(connections.clone())),
            connections,
            config: Arc::new(config),
            upload_dir,
        }
    }
}

/// 默认的上传暂存目录
///
/// 优先使用用户本地数据目录，取不到时回退到系统临时目录
pub fn get_default_upload_dir() -> PathBuf {
    let app_dir = if cfg!(debug_assertions) {
        "rma-tracker-dev"
    } else {
        "rma-tracker"
    };

    dirs::data_local_dir()
        .map(|dir| dir.join(app_dir).join("uploads"))
        .unwrap_or_else(|| std::env::temp_dir().join(app_dir).join("uploads"))
}
