// ==========================================
// 维修服务追踪系统 - 客户领域模型
// ==========================================
// 对齐: customers 表（主键 id 为不透明字符串，UUID v4 生成）
// 生命周期: 表单创建/编辑，无删除流程
// ==========================================

use crate::domain::record::iso_instant;
use crate::domain::rma::RmaView;
use crate::domain::service_order::ServiceOrderView;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Customer - 客户
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String, // 公司名称
    pub contact_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    #[serde(with = "iso_instant")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_instant")]
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// CustomerInput - 客户表单提交
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInput {
    pub name: String,
    pub contact_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

// ==========================================
// 客户维修状态视图
// ==========================================
// 关联规则: rma.customer_id = customer.id，
// 或 customer_id 为空且 customer_name 与客户名称一致（表格导入通常不带 ID）

/// 单个 RMA 及其服务单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RmaRepairStatus {
    pub rma: RmaView,
    pub service_orders: Vec<ServiceOrderView>,
    /// 未关闭的服务单数量
    pub open_orders: usize,
}

/// 客户整体维修状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRepairStatus {
    pub customer: Customer,
    pub rmas: Vec<RmaRepairStatus>,
    pub total_rmas: usize,
    pub open_rmas: usize,
}
