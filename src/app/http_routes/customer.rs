use crate::app::state::AppState;
use crate::domain::customer::CustomerInput;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;

use super::common::{map_json_rejection, respond_data, run_blocking};

// ==========================================
// 客户相关路由
// ==========================================

/// GET /api/customers
pub(super) async fn list_customers(State(state): State<AppState>) -> Response {
    let api = state.customer_api.clone();
    respond_data(run_blocking(move || api.list()).await)
}

/// GET /api/customers/{id}
pub(super) async fn get_customer(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let api = state.customer_api.clone();
    respond_data(run_blocking(move || api.get(&id)).await)
}

/// POST /api/customers
pub(super) async fn create_customer(
    State(state): State<AppState>,
    body: Result<Json<CustomerInput>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return map_json_rejection(rejection),
    };

    let api = state.customer_api.clone();
    respond_data(run_blocking(move || api.create(input)).await)
}

/// PUT /api/customers/{id}
pub(super) async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<CustomerInput>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return map_json_rejection(rejection),
    };

    let api = state.customer_api.clone();
    respond_data(run_blocking(move || api.update(&id, input)).await)
}

/// GET /api/customers/{id}/repairs
pub(super) async fn customer_repairs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let api = state.customer_api.clone();
    respond_data(run_blocking(move || api.repair_status(&id)).await)
}
