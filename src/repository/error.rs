// ==========================================
// 维修服务追踪系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 每个错误通过 kind() 归入 ErrorKind
// ==========================================

use crate::domain::types::ErrorKind;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 连接错误 =====
    #[error("数据库文件不存在: {0}")]
    DatabaseFileNotFound(String),

    #[error("不是有效的数据库文件: {0}")]
    InvalidDatabaseFile(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库未连接")]
    NotConnected,

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("约束违反: {0}")]
    ConstraintViolation(String),

}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::DatabaseFileNotFound(_) => ErrorKind::NotFound,
            RepositoryError::NotFound { .. } => ErrorKind::NotFound,
            RepositoryError::InvalidDatabaseFile(_) => ErrorKind::InvalidFormat,
            RepositoryError::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            RepositoryError::DatabaseConnectionError(_)
            | RepositoryError::NotConnected
            | RepositoryError::LockError(_)
            | RepositoryError::DatabaseTransactionError(_)
            | RepositoryError::DatabaseQueryError(_) => ErrorKind::ConnectionFailure,
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, ref msg) => {
                let detail = msg.clone().unwrap_or_else(|| err.to_string());
                match failure.code {
                    rusqlite::ErrorCode::ConstraintViolation => {
                        RepositoryError::ConstraintViolation(detail)
                    }
                    rusqlite::ErrorCode::NotADatabase => {
                        RepositoryError::InvalidDatabaseFile(detail)
                    }
                    rusqlite::ErrorCode::CannotOpen => {
                        RepositoryError::DatabaseConnectionError(detail)
                    }
                    _ => RepositoryError::DatabaseQueryError(detail),
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
