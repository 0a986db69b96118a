// ==========================================
// 维修服务追踪系统 - 连接管理器
// ==========================================
// 职责: 独占当前唯一的可写连接（connect / test / close）
// 约束: 同一时刻最多一个可写连接；connect 无条件关闭并替换旧连接
// 说明: 管理器由调用方持有（AppState 中的 Arc），不是进程级全局变量
// ==========================================

use crate::db;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

// ==========================================
// DatabaseConfig - 存储位置描述
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    pub file_path: String,
}

impl DatabaseConfig {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    fn path(&self) -> &Path {
        Path::new(self.file_path.trim())
    }
}

/// 当前活动连接
struct ActiveConnection {
    conn: Connection,
    path: PathBuf,
}

// ==========================================
// ConnectionManager
// ==========================================
#[derive(Default)]
pub struct ConnectionManager {
    active: Mutex<Option<ActiveConnection>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 连接数据库
    ///
    /// 流程:
    /// 1. 关闭已有连接（即使新连接随后失败，旧连接也不会恢复）
    /// 2. 打开文件（文件必须存在）
    /// 3. 存活探测
    /// 4. 确保表结构存在
    /// 5. 替换为当前连接
    pub fn connect(&self, config: &DatabaseConfig) -> RepositoryResult<()> {
        let mut guard = self.lock()?;
        if let Some(previous) = guard.take() {
            info!(path = %previous.path.display(), "关闭旧数据库连接");
            close_connection(previous);
        }

        let path = config.path();
        if path.as_os_str().is_empty() {
            return Err(RepositoryError::DatabaseConnectionError(
                "数据库路径不能为空".to_string(),
            ));
        }

        let conn = db::open_existing(path)?;
        db::probe(&conn)?;
        db::ensure_schema(&conn)?;

        info!(path = %path.display(), "数据库连接成功");
        *guard = Some(ActiveConnection {
            conn,
            path: path.to_path_buf(),
        });
        Ok(())
    }

    /// 测试连接
    ///
    /// 以只读方式独立打开并探测，随即关闭；不触碰当前活动连接，
    /// 也不要求表结构已存在
    pub fn test(config: &DatabaseConfig) -> RepositoryResult<()> {
        let path = config.path();
        if path.as_os_str().is_empty() {
            return Err(RepositoryError::DatabaseConnectionError(
                "数据库路径不能为空".to_string(),
            ));
        }

        let conn = db::open_read_only(path)?;
        db::probe(&conn)?;
        conn.close().map_err(|(_, e)| RepositoryError::from(e))?;
        debug!(path = %path.display(), "测试连接成功");
        Ok(())
    }

    /// 关闭当前连接（幂等）
    pub fn close(&self) -> RepositoryResult<()> {
        let mut guard = self.lock()?;
        if let Some(active) = guard.take() {
            info!(path = %active.path.display(), "关闭数据库连接");
            close_connection(active);
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.lock().map(|g| g.is_some()).unwrap_or(false)
    }

    /// 当前连接的文件路径
    pub fn active_path(&self) -> Option<PathBuf> {
        self.lock()
            .ok()
            .and_then(|g| g.as_ref().map(|a| a.path.clone()))
    }

    /// 借用当前连接执行一段操作（持锁期间其他写入者等待）
    pub fn with_connection<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Connection) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.lock()?;
        match guard.as_mut() {
            Some(active) => f(&mut active.conn),
            None => Err(RepositoryError::NotConnected.into()),
        }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Option<ActiveConnection>>> {
        self.active
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

fn close_connection(active: ActiveConnection) {
    if let Err((_conn, e)) = active.conn.close() {
        // 关闭失败时连接随 _conn 一起 drop
        warn!(path = %active.path.display(), error = %e, "关闭数据库连接失败");
    }
}
