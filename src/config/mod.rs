// ==========================================
// 维修服务追踪系统 - 配置层
// ==========================================
// 职责: 进程配置（环境变量）与导入配置读取接口
// ==========================================

pub mod app_config;
pub mod import_config_trait;

// 重导出核心配置
pub use app_config::{AppConfig, AppEnv, ConfigError};
pub use import_config_trait::{EnumPolicy, ImportConfigReader};
