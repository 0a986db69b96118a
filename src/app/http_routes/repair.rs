use crate::app::state::AppState;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

use super::common::{respond_data, run_blocking};

// ==========================================
// RMA / 服务单查询路由
// ==========================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ServiceOrderQuery {
    rma_number: Option<String>,
}

/// GET /api/rma
pub(super) async fn list_rmas(State(state): State<AppState>) -> Response {
    let api = state.repair_status_api.clone();
    respond_data(run_blocking(move || api.list_rmas()).await)
}

/// GET /api/rma/{rmaNumber}
pub(super) async fn get_rma(
    State(state): State<AppState>,
    Path(rma_number): Path<String>,
) -> Response {
    let api = state.repair_status_api.clone();
    respond_data(run_blocking(move || api.get_rma(&rma_number)).await)
}

/// GET /api/service-orders?rmaNumber=
pub(super) async fn list_service_orders(
    State(state): State<AppState>,
    Query(query): Query<ServiceOrderQuery>,
) -> Response {
    let api = state.repair_status_api.clone();
    respond_data(
        run_blocking(move || api.list_service_orders(query.rma_number.as_deref())).await,
    )
}

/// GET /api/service-orders/{serviceOrder}
pub(super) async fn get_service_order(
    State(state): State<AppState>,
    Path(service_order): Path<String>,
) -> Response {
    let api = state.repair_status_api.clone();
    respond_data(run_blocking(move || api.get_service_order(&service_order)).await)
}
