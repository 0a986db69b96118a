// ==========================================
// 维修服务追踪系统 - RMA 领域模型
// ==========================================
// 对齐: rma 表（自然主键 rma_number）
// 规则: 同一 rma_number 重复导入时整行替换（后写入者胜）
// ==========================================

use crate::domain::record::{iso_instant, CellValue, RawRow};
use crate::domain::types::RmaStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// 表头常量（与导入模板一致，精确匹配）
// ==========================================
pub mod headers {
    pub const RMA_NUMBER: &str = "RMA Number";
    pub const CUSTOMER_ID: &str = "Customer ID";
    pub const CUSTOMER_NAME: &str = "Customer Name";
    pub const CUSTOMER_EMAIL: &str = "Customer Email";
    pub const CONTACT_NAME: &str = "Contact Name";
    pub const CONTACT_EMAIL: &str = "Contact Email";
    pub const DATE_SUBMITTED: &str = "Date Submitted";
    pub const STATUS: &str = "Status";
}

// ==========================================
// RmaRecord - 规范化 RMA 记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RmaRecord {
    // ===== 主键 =====
    pub rma_number: String,

    // ===== 客户信息 =====
    pub customer_id: Option<String>, // 关联 customers（声明外键，写入时不校验）
    pub customer_name: String,
    pub customer_email: String,
    pub contact_name: String,
    pub contact_email: String,

    // ===== 状态 =====
    #[serde(with = "iso_instant")]
    pub date_submitted: DateTime<Utc>,
    pub status: String, // 未知取值原样透传（见 EnumPolicy）
}

impl RmaRecord {
    /// 已知状态（未知取值返回 None）
    pub fn status_kind(&self) -> Option<RmaStatus> {
        self.status.parse().ok()
    }
}

// ==========================================
// RmaView - 读取视图（含数据库生成的 created_at）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RmaView {
    #[serde(flatten)]
    pub record: RmaRecord,
    pub created_at: Option<String>,
}

// ==========================================
// RmaInput - 前端提交的 RMA 对象（/api/rma/save）
// ==========================================
// 所有字段可缺省，缺省策略与表格导入一致
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RmaInput {
    pub rma_number: Option<String>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub date_submitted: Option<String>,
    pub status: Option<String>,
}

impl RmaInput {
    /// 转为与表格导入相同的原始行
    pub fn into_raw_row(self, row_number: usize) -> RawRow {
        let mut row = RawRow::new(row_number);
        let fields = [
            (headers::RMA_NUMBER, self.rma_number),
            (headers::CUSTOMER_ID, self.customer_id),
            (headers::CUSTOMER_NAME, self.customer_name),
            (headers::CUSTOMER_EMAIL, self.customer_email),
            (headers::CONTACT_NAME, self.contact_name),
            (headers::CONTACT_EMAIL, self.contact_email),
            (headers::DATE_SUBMITTED, self.date_submitted),
            (headers::STATUS, self.status),
        ];
        for (header, value) in fields {
            if let Some(v) = value {
                row.insert(header, CellValue::Text(v));
            }
        }
        row
    }
}
