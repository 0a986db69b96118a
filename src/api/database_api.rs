// ==========================================
// 数据库连接API
// ==========================================
// 职责: 连接/测试/断开数据库，查询连接状态
// ==========================================

use crate::api::error::ApiResult;
use crate::api::validator::validate_file_path;
use crate::repository::connection_manager::{ConnectionManager, DatabaseConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// 连接状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

pub struct DatabaseApi {
    connections: Arc<ConnectionManager>,
}

impl DatabaseApi {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    /// 连接数据库（替换当前连接）
    pub fn connect(&self, config: &DatabaseConfig) -> ApiResult<()> {
        validate_file_path(&config.file_path)?;
        self.connections.connect(config).map_err(|e| {
            warn!(file_path = %config.file_path, error = %e, "数据库连接失败");
            e
        })?;
        info!(file_path = %config.file_path, "数据库已连接");
        Ok(())
    }

    /// 测试连接（不影响当前连接）
    pub fn test(&self, config: &DatabaseConfig) -> ApiResult<()> {
        validate_file_path(&config.file_path)?;
        ConnectionManager::test(config)?;
        Ok(())
    }

    pub fn disconnect(&self) -> ApiResult<()> {
        self.connections.close()?;
        Ok(())
    }

    pub fn status(&self) -> DatabaseStatus {
        let file_path = self
            .connections
            .active_path()
            .map(|p| p.display().to_string());
        DatabaseStatus {
            connected: file_path.is_some(),
            file_path,
        }
    }
}
