// ==========================================
// 维修服务追踪系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、导入中间结构
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod customer;
pub mod record;
pub mod rma;
pub mod service_order;
pub mod types;

// 重导出核心类型
pub use customer::{Customer, CustomerInput, CustomerRepairStatus, RmaRepairStatus};
pub use record::{format_instant, parse_instant, CellValue, ImportRecord, RawRow, RecordBatch};
pub use rma::{RmaInput, RmaRecord, RmaView};
pub use service_order::{ServiceOrderInput, ServiceOrderRecord, ServiceOrderView};
pub use types::{ErrorKind, OrderStatus, ProductStatus, RecordKind, RmaStatus};
