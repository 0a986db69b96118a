// ==========================================
// 维修服务追踪系统 - HTTP 路由（按域拆分）
// ==========================================
// 职责: axum 路由定义,连接前端与后端 API
// 约束: SQLite 调用一律放入阻塞线程池（见 common::run_blocking）
// ==========================================

mod common;
mod customer;
mod database;
mod import;
mod repair;

use crate::app::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, Uri};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// multipart 表单除文件内容外的额外余量
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// 构建完整路由（与监听分离，便于测试）
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any);

    let body_limit = state
        .import_api
        .max_upload_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let api = Router::new()
        // ===== 数据库连接 =====
        .route("/api/database/connect", post(database::connect))
        .route("/api/database/test", post(database::test))
        .route("/api/database/disconnect", post(database::disconnect))
        .route("/api/database/status", get(database::status))
        // ===== 数据导入 =====
        .route("/api/rma/save", post(import::save_rmas))
        .route("/api/rma/upload", post(import::upload_rmas))
        .route("/api/service-orders/save", post(import::save_service_orders))
        .route("/api/service-orders/upload", post(import::upload_service_orders))
        .route("/api/import/database", post(import::import_database))
        // ===== 客户 =====
        .route(
            "/api/customers",
            get(customer::list_customers).post(customer::create_customer),
        )
        .route(
            "/api/customers/{id}",
            get(customer::get_customer).put(customer::update_customer),
        )
        .route("/api/customers/{id}/repairs", get(customer::customer_repairs))
        // ===== 维修状态查询 =====
        .route("/api/rma", get(repair::list_rmas))
        .route("/api/rma/{rma_number}", get(repair::get_rma))
        .route("/api/service-orders", get(repair::list_service_orders))
        .route(
            "/api/service-orders/{service_order}",
            get(repair::get_service_order),
        );

    with_frontend_fallback(api, &state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 前端回退路由：生产模式托管静态包，开发模式重定向到开发服务器
fn with_frontend_fallback(api: Router<AppState>, state: &AppState) -> Router<AppState> {
    if state.config.is_production() {
        let static_dir = state.config.static_dir.clone();
        let index = ServeFile::new(static_dir.join("index.html"));
        api.fallback_service(ServeDir::new(static_dir).fallback(index))
    } else {
        let dev_server_url = state.config.dev_server_url.trim_end_matches('/').to_string();
        api.fallback(move |uri: Uri| {
            let target = format!("{}{}", dev_server_url, uri);
            async move { Redirect::temporary(&target) }
        })
    }
}

/// 启动 HTTP 服务，收到 SIGTERM / Ctrl-C 后优雅退出并关闭数据库连接
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let connections = state.connections.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP 服务已启动");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;

    tracing::info!("HTTP 服务已停止，关闭数据库连接");
    if let Err(e) = connections.close() {
        tracing::warn!(error = %e, "关闭数据库连接失败");
    }
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "无法监听 Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "无法监听 SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("收到退出信号");
}
