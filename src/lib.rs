// ==========================================
// 维修服务追踪系统 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: RMA / 服务单导入与维修状态跟踪
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 进程配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ErrorKind, OrderStatus, ProductStatus, RecordKind, RmaStatus};

// 领域实体
pub use domain::{Customer, CustomerInput, ImportRecord, RecordBatch, RmaRecord, ServiceOrderRecord};

// 导入
pub use importer::{ImportOutcome, RecordImporter};

// 仓储
pub use repository::{ConnectionManager, DatabaseConfig};

// API
pub use api::{CustomerApi, DatabaseApi, ImportApi, RepairStatusApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "维修服务追踪系统";
