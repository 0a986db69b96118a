// ==========================================
// 维修服务追踪系统 - 外部数据库快照读取
// ==========================================
// 职责: 以只读方式读取另一个 SQLite 文件中的 rma / service_orders 表，
//       按列名映射为导入表头，产出与表格导入相同的原始行
// 红线: 不写入快照文件
// ==========================================

use crate::db;
use crate::domain::record::{CellValue, RawRow};
use crate::domain::rma::headers as rma_headers;
use crate::domain::service_order::headers as so_headers;
use crate::domain::types::RecordKind;
use crate::importer::error::{ImportError, ImportResult};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// 快照中读取到的原始行（表不存在时为 None）
#[derive(Debug, Default)]
pub struct SnapshotRows {
    pub rmas: Option<Vec<RawRow>>,
    pub service_orders: Option<Vec<RawRow>>,
}

pub struct SnapshotReader;

impl SnapshotReader {
    /// 读取快照文件
    ///
    /// 文件不存在 → NotFound；不是 SQLite → InvalidFormat；
    /// 两张表都不存在 → InvalidFormat
    pub fn read(path: &Path) -> ImportResult<SnapshotRows> {
        let conn = db::open_read_only(path)?;
        db::probe(&conn)?;

        let rows = SnapshotRows {
            rmas: Self::read_table(&conn, RecordKind::Rma)?,
            service_orders: Self::read_table(&conn, RecordKind::ServiceOrder)?,
        };

        if rows.rmas.is_none() && rows.service_orders.is_none() {
            return Err(ImportError::SnapshotTablesMissing(path.display().to_string()));
        }

        info!(
            path = %path.display(),
            rmas = rows.rmas.as_ref().map_or(0, Vec::len),
            service_orders = rows.service_orders.as_ref().map_or(0, Vec::len),
            "快照读取完成"
        );
        Ok(rows)
    }

    fn read_table(conn: &Connection, kind: RecordKind) -> ImportResult<Option<Vec<RawRow>>> {
        let table = kind.table_name();
        if !db::table_exists(conn, table)? {
            debug!(table, "快照中不存在该表，跳过");
            return Ok(None);
        }

        let mut stmt = conn.prepare(&format!("SELECT * FROM {}", table))?;
        let headers: Vec<Option<&'static str>> = stmt
            .column_names()
            .iter()
            .map(|name| column_header(kind, name))
            .collect();

        let mut rows = Vec::new();
        let mut source = stmt.query([])?;
        let mut index = 0;
        while let Some(source_row) = source.next()? {
            index += 1;
            let mut row = RawRow::new(index);
            for (col_idx, header) in headers.iter().enumerate() {
                if let Some(header) = header {
                    row.insert(*header, to_cell_value(source_row.get_ref(col_idx)?));
                }
            }
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(Some(rows))
    }
}

/// 快照列名 → 导入表头（不区分大小写；未知列返回 None）
fn column_header(kind: RecordKind, column: &str) -> Option<&'static str> {
    let column = column.trim().to_lowercase();
    let header = match kind {
        RecordKind::Rma => match column.as_str() {
            "rma_number" => rma_headers::RMA_NUMBER,
            "customer_id" => rma_headers::CUSTOMER_ID,
            "customer_name" => rma_headers::CUSTOMER_NAME,
            "customer_email" => rma_headers::CUSTOMER_EMAIL,
            "contact_name" => rma_headers::CONTACT_NAME,
            "contact_email" => rma_headers::CONTACT_EMAIL,
            "date_submitted" => rma_headers::DATE_SUBMITTED,
            "status" => rma_headers::STATUS,
            _ => return None,
        },
        RecordKind::ServiceOrder => match column.as_str() {
            "service_order" => so_headers::SERVICE_ORDER,
            "sales_order" => so_headers::SALES_ORDER,
            "product_status" => so_headers::PRODUCT_STATUS,
            "order_status" => so_headers::ORDER_STATUS,
            "material" => so_headers::MATERIAL,
            "material_description" => so_headers::MATERIAL_DESCRIPTION,
            "serial" => so_headers::SERIAL,
            "order_created_date" => so_headers::ORDER_CREATED_DATE,
            "customer_required_date" => so_headers::CUSTOMER_REQUIRED_DATE,
            "estimated_completion_date" => so_headers::ESTIMATED_COMPLETION_DATE,
            "rma_number" => so_headers::RMA_NUMBER,
            _ => return None,
        },
    };
    Some(header)
}

fn to_cell_value(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => CellValue::Empty,
        ValueRef::Integer(i) => CellValue::Int(i),
        ValueRef::Real(f) => CellValue::Float(f),
        ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
    }
}
