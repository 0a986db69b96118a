// ==========================================
// 维修服务追踪系统 - HTTP 服务主入口
// ==========================================
// 技术栈: axum + Rust + SQLite
// 配置: 环境变量 / .env（见 config::AppConfig）
// ==========================================

use anyhow::Context;
use rma_tracker::app::{serve, AppState};
use rma_tracker::config::AppConfig;
use rma_tracker::repository::DatabaseConfig;
use rma_tracker::{logging, APP_NAME, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("读取配置失败")?;

    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 系统版本: {}", APP_NAME, VERSION);
    tracing::info!(
        env = ?config.app_env,
        enum_policy = %config.enum_policy,
        max_upload_mb = config.max_upload_mb,
        "配置已加载"
    );
    tracing::info!("==================================================");

    let addr = config.socket_addr().context("监听地址无效")?;
    let database_path = config.database_path.clone();
    let state = AppState::new(config);

    // 启动时自动连接（失败不阻止启动，可在界面中重新连接）
    if let Some(path) = database_path {
        let db_config = DatabaseConfig::new(path.display().to_string());
        match state.database_api.connect(&db_config) {
            Ok(()) => tracing::info!(path = %path.display(), "已自动连接数据库"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "自动连接数据库失败"),
        }
    }

    serve(state, addr).await.context("HTTP 服务异常退出")?;

    tracing::info!("应用已退出");
    Ok(())
}
