// ==========================================
// 维修服务追踪系统 - 应用配置
// ==========================================
// 来源: 环境变量（启动时由 dotenvy 加载 .env）
// 默认值: PORT=3000 HOST=0.0.0.0 STATIC_DIR=dist MAX_UPLOAD_MB=50
// ==========================================

use crate::config::import_config_trait::{EnumPolicy, ImportConfigReader};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_STATIC_DIR: &str = "dist";
pub const DEFAULT_DEV_SERVER_URL: &str = "http://localhost:5173";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "production" || v == "prod" => AppEnv::Production,
            _ => AppEnv::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub app_env: AppEnv,
    /// 生产模式下的前端静态文件目录
    pub static_dir: PathBuf,
    /// 开发模式下回退路由重定向的目标
    pub dev_server_url: String,
    /// 启动时自动连接的数据库文件
    pub database_path: Option<PathBuf>,
    pub enum_policy: EnumPolicy,
    pub max_upload_mb: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            app_env: AppEnv::Development,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            dev_server_url: DEFAULT_DEV_SERVER_URL.to_string(),
            database_path: None,
            enum_policy: EnumPolicy::default(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl AppConfig {
    /// 加载 .env（若存在）后读取环境变量
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源构建配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let enum_policy = match non_empty("IMPORT_ENUM_POLICY") {
            Some(raw) => raw.parse::<EnumPolicy>().map_err(ConfigError::InvalidEnumPolicy)?,
            None => defaults.enum_policy,
        };

        let max_upload_mb = match non_empty("MAX_UPLOAD_MB") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|mb| *mb > 0)
                .ok_or(ConfigError::InvalidNumber {
                    key: "MAX_UPLOAD_MB",
                    value: raw,
                })?,
            None => defaults.max_upload_mb,
        };

        Ok(Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port,
            app_env: AppEnv::parse(non_empty("APP_ENV").as_deref()),
            static_dir: non_empty("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            dev_server_url: non_empty("DEV_SERVER_URL").unwrap_or(defaults.dev_server_url),
            database_path: non_empty("DATABASE_PATH").map(PathBuf::from),
            enum_policy,
            max_upload_mb,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.host.clone()))
    }
}

impl ImportConfigReader for AppConfig {
    fn enum_policy(&self) -> EnumPolicy {
        self.enum_policy
    }

    fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无效的端口号: {0}")]
    InvalidPort(String),

    #[error("无效的监听地址: {0}")]
    InvalidHost(String),

    #[error("{0}")]
    InvalidEnumPolicy(String),

    #[error("无效的数值 ({key}): {value}")]
    InvalidNumber { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.static_dir, PathBuf::from("dist"));
        assert_eq!(config.enum_policy, EnumPolicy::PassThrough);
        assert!(!config.is_production());
        assert!(config.database_path.is_none());
        assert_eq!(config.max_upload_bytes(), 50 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8081"),
            ("APP_ENV", "production"),
            ("IMPORT_ENUM_POLICY", "reject"),
            ("DATABASE_PATH", "/srv/rma.db"),
        ])
        .unwrap();
        assert_eq!(config.port, 8081);
        assert!(config.is_production());
        assert_eq!(config.enum_policy, EnumPolicy::Reject);
        assert_eq!(config.database_path, Some(PathBuf::from("/srv/rma.db")));
        assert_eq!(config.socket_addr().unwrap().port(), 8081);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            config_from(&[("MAX_UPLOAD_MB", "0")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            config_from(&[("IMPORT_ENUM_POLICY", "strict")]),
            Err(ConfigError::InvalidEnumPolicy(_))
        ));
    }

    #[test]
    fn test_huge_upload_limit_saturates() {
        let huge = usize::MAX.to_string();
        let config = config_from(&[("MAX_UPLOAD_MB", huge.as_str())]).unwrap();
        assert_eq!(config.max_upload_mb, usize::MAX);
        assert_eq!(config.max_upload_bytes(), usize::MAX);
    }
}
