// ==========================================
// 维修服务追踪系统 - 领域类型定义
// ==========================================
// 职责: RMA 状态、产品维修阶段、订单状态、记录类型、错误分类
// 序列化格式: snake_case (与数据库/前端一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// RMA 状态 (RMA Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RmaStatus {
    Pending,    // 待处理（导入默认值）
    Approved,   // 已批准
    InProgress, // 维修中
    Completed,  // 已完成
    Cancelled,  // 已取消
}

impl RmaStatus {
    /// 导入时缺省的 RMA 状态
    pub const DEFAULT: RmaStatus = RmaStatus::Pending;

    pub fn as_str(&self) -> &'static str {
        match self {
            RmaStatus::Pending => "pending",
            RmaStatus::Approved => "approved",
            RmaStatus::InProgress => "in_progress",
            RmaStatus::Completed => "completed",
            RmaStatus::Cancelled => "cancelled",
        }
    }

    /// 是否为终态（完成/取消）
    pub fn is_closed(&self) -> bool {
        matches!(self, RmaStatus::Completed | RmaStatus::Cancelled)
    }
}

impl fmt::Display for RmaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RmaStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(RmaStatus::Pending),
            "approved" => Ok(RmaStatus::Approved),
            "in_progress" => Ok(RmaStatus::InProgress),
            "completed" => Ok(RmaStatus::Completed),
            "cancelled" => Ok(RmaStatus::Cancelled),
            other => Err(format!("未知的 RMA 状态: {}", other)),
        }
    }
}

// ==========================================
// 产品维修阶段 (Product Status)
// ==========================================
// 维修工作流共 14 个阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    AwaitingTest,
    Rework,
    Retest,
    FinalTest,
    CleanAndLabel,
    Inspection,
    AwaitingParts,
    WithSupport,
    WithEngineering,
    AwaitingCustomer,
    CreditHeld,
    SubContractor,
    Completed,
    Shipped,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 14] = [
        ProductStatus::AwaitingTest,
        ProductStatus::Rework,
        ProductStatus::Retest,
        ProductStatus::FinalTest,
        ProductStatus::CleanAndLabel,
        ProductStatus::Inspection,
        ProductStatus::AwaitingParts,
        ProductStatus::WithSupport,
        ProductStatus::WithEngineering,
        ProductStatus::AwaitingCustomer,
        ProductStatus::CreditHeld,
        ProductStatus::SubContractor,
        ProductStatus::Completed,
        ProductStatus::Shipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::AwaitingTest => "awaiting_test",
            ProductStatus::Rework => "rework",
            ProductStatus::Retest => "retest",
            ProductStatus::FinalTest => "final_test",
            ProductStatus::CleanAndLabel => "clean_and_label",
            ProductStatus::Inspection => "inspection",
            ProductStatus::AwaitingParts => "awaiting_parts",
            ProductStatus::WithSupport => "with_support",
            ProductStatus::WithEngineering => "with_engineering",
            ProductStatus::AwaitingCustomer => "awaiting_customer",
            ProductStatus::CreditHeld => "credit_held",
            ProductStatus::SubContractor => "sub_contractor",
            ProductStatus::Completed => "completed",
            ProductStatus::Shipped => "shipped",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ProductStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == trimmed)
            .ok_or_else(|| format!("未知的产品状态: {}", trimmed))
    }
}

// ==========================================
// 服务单状态 (Order Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,   // 打开（导入默认值）
    Closed, // 关闭
}

impl OrderStatus {
    pub const DEFAULT: OrderStatus = OrderStatus::Open;

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "open" => Ok(OrderStatus::Open),
            "closed" => Ok(OrderStatus::Closed),
            other => Err(format!("未知的订单状态: {}", other)),
        }
    }
}

// ==========================================
// 记录类型 (Record Kind)
// ==========================================
// 导入器/写入器只处理这两种固定记录形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Rma,
    ServiceOrder,
}

impl RecordKind {
    /// 目标表名
    pub fn table_name(&self) -> &'static str {
        match self {
            RecordKind::Rma => "rma",
            RecordKind::ServiceOrder => "service_orders",
        }
    }

    /// 自然主键列名
    pub fn key_column(&self) -> &'static str {
        match self {
            RecordKind::Rma => "rma_number",
            RecordKind::ServiceOrder => "service_order",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Rma => write!(f, "RMA"),
            RecordKind::ServiceOrder => write!(f, "ServiceOrder"),
        }
    }
}

// ==========================================
// 错误分类 (Error Kind)
// ==========================================
// 各层错误统一归类，测试按分类断言而不是按消息文本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidFormat,
    ConstraintViolation,
    ConnectionFailure,
    Validation,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "NOT_FOUND"),
            ErrorKind::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorKind::ConstraintViolation => write!(f, "CONSTRAINT_VIOLATION"),
            ErrorKind::ConnectionFailure => write!(f, "CONNECTION_FAILURE"),
            ErrorKind::Validation => write!(f, "VALIDATION"),
            ErrorKind::Internal => write!(f, "INTERNAL"),
        }
    }
}
