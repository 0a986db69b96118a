use crate::api::{ApiError, ApiResponse, ApiResult};
use crate::domain::types::ErrorKind;
use crate::importer::ImportOutcome;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

// ==========================================
// 公共工具：错误映射、阻塞调用、统一响应
// ==========================================

/// 错误 -> HTTP 状态码
///
/// 仅实体查找失败返回 404；数据库文件缺失等其他 NotFound 归入 500
pub(super) fn status_for(err: &ApiError) -> StatusCode {
    match err {
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        _ if err.kind() == ErrorKind::Validation => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 将ApiError转换为 `{success:false, error, code}` 响应
pub(super) fn map_api_error(err: ApiError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(code = %err.kind(), error = %err, "请求处理失败");
    } else {
        tracing::warn!(code = %err.kind(), error = %err, "请求被拒绝");
    }
    (status, Json(ApiResponse::<()>::failure(&err))).into_response()
}

/// 请求体无法反序列化时按输入错误返回 400
pub(super) fn map_json_rejection(rejection: JsonRejection) -> Response {
    map_api_error(ApiError::InvalidInput(rejection.body_text()))
}

/// 在阻塞线程池中执行同步 API 调用
pub(super) async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("后台任务执行失败: {}", e)))?
}

pub(super) fn respond_ok(result: ApiResult<()>) -> Response {
    match result {
        Ok(()) => Json(ApiResponse::<()>::ok()).into_response(),
        Err(e) => map_api_error(e),
    }
}

pub(super) fn respond_count(result: ApiResult<ImportOutcome>) -> Response {
    match result {
        Ok(outcome) => Json(ApiResponse::<()>::with_count(outcome.count)).into_response(),
        Err(e) => map_api_error(e),
    }
}

pub(super) fn respond_data<T: Serialize>(result: ApiResult<T>) -> Response {
    match result {
        Ok(data) => Json(ApiResponse::with_data(data)).into_response(),
        Err(e) => map_api_error(e),
    }
}
