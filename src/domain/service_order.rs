// ==========================================
// 维修服务追踪系统 - 服务单领域模型
// ==========================================
// 对齐: service_orders 表（自然主键 service_order）
// 规则: rma_number 为可选引用（声明外键，写入时不校验）
// ==========================================

use crate::domain::record::{iso_instant, iso_instant_opt, CellValue, RawRow};
use crate::domain::types::{OrderStatus, ProductStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// 表头常量
// ==========================================
pub mod headers {
    pub const SERVICE_ORDER: &str = "Service Order";
    pub const SALES_ORDER: &str = "Sales Order";
    pub const PRODUCT_STATUS: &str = "Product Status";
    pub const ORDER_STATUS: &str = "Order Status";
    pub const MATERIAL: &str = "Material";
    pub const MATERIAL_DESCRIPTION: &str = "Material Description";
    pub const SERIAL: &str = "Serial";
    pub const ORDER_CREATED_DATE: &str = "Order Created Date";
    pub const CUSTOMER_REQUIRED_DATE: &str = "Customer Required Date";
    pub const ESTIMATED_COMPLETION_DATE: &str = "Estimated Completion Date";
    pub const RMA_NUMBER: &str = "RMA Number";
}

// ==========================================
// ServiceOrderRecord - 规范化服务单记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrderRecord {
    // ===== 主键 =====
    pub service_order: String,

    // ===== 订单信息 =====
    pub sales_order: String,
    pub product_status: String, // 维修阶段，未知取值原样透传
    pub order_status: String,   // open / closed

    // ===== 物料信息 =====
    pub material: String,
    pub material_description: String,
    pub serial: String,

    // ===== 时间信息 =====
    #[serde(with = "iso_instant")]
    pub order_created_date: DateTime<Utc>, // 必填，缺省为导入时刻
    #[serde(with = "iso_instant_opt", default)]
    pub customer_required_date: Option<DateTime<Utc>>, // 可选，缺省为空
    #[serde(with = "iso_instant_opt", default)]
    pub estimated_completion_date: Option<DateTime<Utc>>, // 可选，缺省为空

    // ===== 关联 =====
    pub rma_number: Option<String>,
}

impl ServiceOrderRecord {
    pub fn product_status_kind(&self) -> Option<ProductStatus> {
        self.product_status.parse().ok()
    }

    pub fn order_status_kind(&self) -> Option<OrderStatus> {
        self.order_status.parse().ok()
    }
}

// ==========================================
// ServiceOrderView - 读取视图
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrderView {
    #[serde(flatten)]
    pub record: ServiceOrderRecord,
    pub created_at: Option<String>,
}

// ==========================================
// ServiceOrderInput - 前端提交的服务单对象（/api/service-orders/save）
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceOrderInput {
    pub service_order: Option<String>,
    pub sales_order: Option<String>,
    pub product_status: Option<String>,
    pub order_status: Option<String>,
    pub material: Option<String>,
    pub material_description: Option<String>,
    pub serial: Option<String>,
    pub order_created_date: Option<String>,
    pub customer_required_date: Option<String>,
    pub estimated_completion_date: Option<String>,
    pub rma_number: Option<String>,
}

impl ServiceOrderInput {
    pub fn into_raw_row(self, row_number: usize) -> RawRow {
        let mut row = RawRow::new(row_number);
        let fields = [
            (headers::SERVICE_ORDER, self.service_order),
            (headers::SALES_ORDER, self.sales_order),
            (headers::PRODUCT_STATUS, self.product_status),
            (headers::ORDER_STATUS, self.order_status),
            (headers::MATERIAL, self.material),
            (headers::MATERIAL_DESCRIPTION, self.material_description),
            (headers::SERIAL, self.serial),
            (headers::ORDER_CREATED_DATE, self.order_created_date),
            (headers::CUSTOMER_REQUIRED_DATE, self.customer_required_date),
            (headers::ESTIMATED_COMPLETION_DATE, self.estimated_completion_date),
            (headers::RMA_NUMBER, self.rma_number),
        ];
        for (header, value) in fields {
            if let Some(v) = value {
                row.insert(header, CellValue::Text(v));
            }
        }
        row
    }
}
