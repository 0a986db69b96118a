// ==========================================
// 维修服务追踪系统 - 统一响应结构
// ==========================================
// 形态: { success, count?, data?, error?, code? }
// ==========================================

use crate::api::error::ApiError;
use crate::domain::types::ErrorKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// 人类可读的错误消息（前端原样展示）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// 错误分类
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorKind>,
}

impl<T> ApiResponse<T> {
    pub fn ok() -> Self {
        Self {
            success: true,
            count: None,
            data: None,
            error: None,
            code: None,
        }
    }

    pub fn with_count(count: usize) -> Self {
        Self {
            count: Some(count),
            ..Self::ok()
        }
    }

    pub fn with_data(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::ok()
        }
    }

    pub fn failure(err: &ApiError) -> Self {
        Self {
            success: false,
            count: None,
            data: None,
            error: Some(err.to_string()),
            code: Some(err.kind()),
        }
    }
}
