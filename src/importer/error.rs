// ==========================================
// 维修服务追踪系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: kind() 归入 ErrorKind
// ==========================================

use crate::domain::types::{ErrorKind, RecordKind};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xls/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("快照数据库中没有可导入的表（需要 rma 或 service_orders）: {0}")]
    SnapshotTablesMissing(String),

    // ===== 数据映射错误 =====
    #[error("日期格式错误 (行 {row}, 字段 {field}): 无法解析 {value}")]
    DateFormatError {
        row: usize,
        field: String,
        value: String,
    },

    #[error("未知的枚举值 (行 {row}, 字段 {field}): {value}")]
    UnknownEnumValue {
        row: usize,
        field: String,
        value: String,
    },

    #[error("记录类型不匹配: 期望 {expected}，实际 {actual}")]
    KindMismatch {
        expected: RecordKind,
        actual: RecordKind,
    },

    // ===== 存储错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::FileNotFound(_) => ErrorKind::NotFound,
            ImportError::UnsupportedFormat(_)
            | ImportError::FileReadError(_)
            | ImportError::ExcelParseError(_)
            | ImportError::CsvParseError(_)
            | ImportError::SnapshotTablesMissing(_)
            | ImportError::DateFormatError { .. } => ErrorKind::InvalidFormat,
            ImportError::UnknownEnumValue { .. } => ErrorKind::Validation,
            ImportError::KindMismatch { .. } => ErrorKind::Internal,
            ImportError::Repository(e) => e.kind(),
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound(err.to_string()),
            _ => ImportError::FileReadError(err.to_string()),
        }
    }
}

// 实现 From<rusqlite::Error>（经仓储层错误归类）
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Repository(RepositoryError::from(err))
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
