use crate::app::state::AppState;
use crate::repository::DatabaseConfig;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;

use super::common::{map_json_rejection, respond_data, respond_ok, run_blocking};

// ==========================================
// 数据库连接相关路由
// ==========================================

/// POST /api/database/connect
pub(super) async fn connect(
    State(state): State<AppState>,
    body: Result<Json<DatabaseConfig>, JsonRejection>,
) -> Response {
    let Json(config) = match body {
        Ok(body) => body,
        Err(rejection) => return map_json_rejection(rejection),
    };
    tracing::info!(file_path = %config.file_path, "收到数据库连接请求");

    let api = state.database_api.clone();
    respond_ok(run_blocking(move || api.connect(&config)).await)
}

/// POST /api/database/test
pub(super) async fn test(
    State(state): State<AppState>,
    body: Result<Json<DatabaseConfig>, JsonRejection>,
) -> Response {
    let Json(config) = match body {
        Ok(body) => body,
        Err(rejection) => return map_json_rejection(rejection),
    };

    let api = state.database_api.clone();
    respond_ok(run_blocking(move || api.test(&config)).await)
}

/// POST /api/database/disconnect
pub(super) async fn disconnect(State(state): State<AppState>) -> Response {
    let api = state.database_api.clone();
    respond_ok(run_blocking(move || api.disconnect()).await)
}

/// GET /api/database/status
pub(super) async fn status(State(state): State<AppState>) -> Response {
    let api = state.database_api.clone();
    respond_data(run_blocking(move || Ok(api.status())).await)
}
