// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别与输出格式
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 未设置 RUST_LOG 时的过滤规则（HTTP 请求日志由 tower_http 在 debug 级别输出）
const DEFAULT_DIRECTIVES: &str = "info,tower_http=debug";

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info，tower_http=debug）
///   例如: RUST_LOG=rma_tracker=trace,tower_http=info
/// - LOG_FORMAT: `json` 时输出 JSON 行，否则为文本
///
/// # 示例
/// ```no_run
/// use rma_tracker::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);

    if json_output(std::env::var("LOG_FORMAT").ok().as_deref()) {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// 初始化测试环境的日志系统（可重复调用）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn json_output(format: Option<&str>) -> bool {
    format
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
