use crate::api::{ApiError, ApiResult};
use crate::app::state::AppState;
use crate::domain::rma::RmaInput;
use crate::domain::service_order::ServiceOrderInput;
use crate::domain::types::RecordKind;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::response::Response;
use axum::Json;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::common::{map_api_error, map_json_rejection, respond_count, run_blocking};

// ==========================================
// 数据导入相关路由
// ==========================================

/// 上传表单中承载文件的字段名
const FILE_FIELD: &str = "file";

/// POST /api/rma/save
pub(super) async fn save_rmas(
    State(state): State<AppState>,
    body: Result<Json<Vec<RmaInput>>, JsonRejection>,
) -> Response {
    let Json(inputs) = match body {
        Ok(body) => body,
        Err(rejection) => return map_json_rejection(rejection),
    };
    tracing::info!(rows = inputs.len(), "收到RMA保存请求");

    let api = state.import_api.clone();
    respond_count(run_blocking(move || api.save_rmas(inputs)).await)
}

/// POST /api/service-orders/save
pub(super) async fn save_service_orders(
    State(state): State<AppState>,
    body: Result<Json<Vec<ServiceOrderInput>>, JsonRejection>,
) -> Response {
    let Json(inputs) = match body {
        Ok(body) => body,
        Err(rejection) => return map_json_rejection(rejection),
    };
    tracing::info!(rows = inputs.len(), "收到服务单保存请求");

    let api = state.import_api.clone();
    respond_count(run_blocking(move || api.save_service_orders(inputs)).await)
}

/// POST /api/rma/upload
pub(super) async fn upload_rmas(State(state): State<AppState>, multipart: Multipart) -> Response {
    upload_sheet(state, multipart, RecordKind::Rma).await
}

/// POST /api/service-orders/upload
pub(super) async fn upload_service_orders(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    upload_sheet(state, multipart, RecordKind::ServiceOrder).await
}

async fn upload_sheet(state: AppState, mut multipart: Multipart, kind: RecordKind) -> Response {
    let (file_name, bytes) = match read_file_field(&mut multipart).await {
        Ok(file) => file,
        Err(e) => return map_api_error(e),
    };
    tracing::info!(file_name = %file_name, size = bytes.len(), kind = %kind, "收到表格上传");

    let api = state.import_api.clone();
    respond_count(run_blocking(move || api.import_upload(&file_name, &bytes, kind)).await)
}

/// POST /api/import/database
///
/// 快照暂存为上传目录下的临时文件，暂存、导入与删除都在同一个阻塞任务内完成
pub(super) async fn import_database(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let (file_name, bytes) = match read_file_field(&mut multipart).await {
        Ok(file) => file,
        Err(e) => return map_api_error(e),
    };
    if bytes.is_empty() {
        return map_api_error(ApiError::InvalidInput("上传文件为空".to_string()));
    }
    tracing::info!(file_name = %file_name, size = bytes.len(), "收到数据库快照上传");

    let api = state.import_api.clone();
    let upload_dir = state.upload_dir.clone();
    let result = run_blocking(move || {
        let staged = stage_upload(&upload_dir, &bytes)?;
        api.import_snapshot(staged.path())
    })
    .await;
    respond_count(result)
}

/// 写入暂存文件；返回值 Drop 时文件被删除
fn stage_upload(upload_dir: &Path, bytes: &[u8]) -> ApiResult<NamedTempFile> {
    std::fs::create_dir_all(upload_dir)
        .map_err(|e| ApiError::InternalError(format!("无法创建上传目录: {}", e)))?;

    let mut staged = tempfile::Builder::new()
        .prefix("snapshot-")
        .suffix(".sqlite")
        .tempfile_in(upload_dir)
        .map_err(|e| ApiError::InternalError(format!("无法创建上传文件: {}", e)))?;
    staged
        .write_all(bytes)
        .map_err(|e| ApiError::InternalError(format!("无法写入上传文件: {}", e)))?;
    Ok(staged)
}

/// 读取 multipart 中的 `file` 字段，返回 (文件名, 内容)
async fn read_file_field(multipart: &mut Multipart) -> ApiResult<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(format!("表单解析失败: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidInput(format!("读取上传文件失败: {}", e)))?;
        return Ok((file_name, bytes.to_vec()));
    }
    Err(ApiError::InvalidInput(format!(
        "缺少上传字段: {}",
        FILE_FIELD
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_staged_snapshot_removed_on_drop() {
        let root = TempDir::new().unwrap();
        let upload_dir = root.path().join("uploads");

        let staged = stage_upload(&upload_dir, b"SQLite format 3\0").unwrap();
        assert!(staged.path().starts_with(&upload_dir));
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"SQLite format 3\0");
        assert_eq!(entries(&upload_dir), 1);

        drop(staged);
        assert_eq!(entries(&upload_dir), 0);
    }
}
