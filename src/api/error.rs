// ==========================================
// 维修服务追踪系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，汇总仓储/导入错误
// 边界: HTTP 层据 kind() 选择状态码，消息原样返回前端
// ==========================================

use crate::domain::types::ErrorKind;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 下层错误
    // ==========================================
    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Import(ImportError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidInput(_) | ApiError::ValidationError(_) => ErrorKind::Validation,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Repository(e) => e.kind(),
            ApiError::Import(e) => e.kind(),
            ApiError::InternalError(_) => ErrorKind::Internal,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            other => ApiError::Repository(other),
        }
    }
}

// ==========================================
// 从 ImportError 转换（存储错误展开为仓储错误）
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(e) => ApiError::from(e),
            other => ApiError::Import(other),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_not_found_becomes_api_not_found() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "Customer".to_string(),
            id: "c-1".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_import_error_kind_preserved() {
        let err: ApiError = ImportError::Repository(RepositoryError::NotConnected).into();
        assert_eq!(err.kind(), ErrorKind::ConnectionFailure);
        assert_eq!(err.to_string(), "数据库未连接");

        let err: ApiError = ImportError::UnsupportedFormat("txt".into()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }
}
