// ==========================================
// 维修服务追踪系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// EnumPolicy - 未知枚举取值的处理策略
// ==========================================
// 作用字段: Status / Product Status / Order Status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumPolicy {
    /// 原样写入（默认）
    #[default]
    PassThrough,
    /// 视为校验错误，整次导入失败
    Reject,
}

impl fmt::Display for EnumPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumPolicy::PassThrough => write!(f, "passthrough"),
            EnumPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for EnumPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "passthrough" | "pass_through" | "pass-through" => Ok(EnumPolicy::PassThrough),
            "reject" => Ok(EnumPolicy::Reject),
            other => Err(format!("未知的枚举策略: {}（可选 passthrough / reject）", other)),
        }
    }
}

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: AppConfig（环境变量）
pub trait ImportConfigReader: Send + Sync {
    /// 未知枚举取值的处理策略
    ///
    /// # 默认值
    /// - PassThrough
    fn enum_policy(&self) -> EnumPolicy;

    /// 上传文件大小上限（字节）
    fn max_upload_bytes(&self) -> usize;
}
