// ==========================================
// 维修服务追踪系统 - 维修状态查询仓储
// ==========================================
// 职责: RMA / 服务单只读查询，组装客户维修状态视图
// 说明: 只读，不开启事务
// ==========================================

use crate::domain::customer::{Customer, CustomerRepairStatus, RmaRepairStatus};
use crate::domain::record::parse_instant;
use crate::domain::rma::{RmaRecord, RmaView};
use crate::domain::service_order::{ServiceOrderRecord, ServiceOrderView};
use crate::domain::types::OrderStatus;
use crate::repository::customer_repo::parse_stored_instant;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

const RMA_COLUMNS: &str = "rma_number, customer_id, customer_name, customer_email, \
     contact_name, contact_email, date_submitted, status, created_at";

const SERVICE_ORDER_COLUMNS: &str = "service_order, sales_order, product_status, \
     order_status, material, material_description, serial, order_created_date, \
     customer_required_date, estimated_completion_date, rma_number, created_at";

pub struct RepairQueryRepository;

impl RepairQueryRepository {
    /// 全部 RMA（按提交日期倒序）
    pub fn list_rmas(conn: &Connection) -> RepositoryResult<Vec<RmaView>> {
        let sql = format!(
            "SELECT {} FROM rma ORDER BY date_submitted DESC, rma_number",
            RMA_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], map_rma_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn find_rma(conn: &Connection, rma_number: &str) -> RepositoryResult<Option<RmaView>> {
        let sql = format!("SELECT {} FROM rma WHERE rma_number = ?1", RMA_COLUMNS);
        let rma = conn
            .query_row(&sql, params![rma_number], map_rma_row)
            .optional()?;
        Ok(rma)
    }

    pub fn find_service_order(
        conn: &Connection,
        service_order: &str,
    ) -> RepositoryResult<Option<ServiceOrderView>> {
        let sql = format!(
            "SELECT {} FROM service_orders WHERE service_order = ?1",
            SERVICE_ORDER_COLUMNS
        );
        let order = conn
            .query_row(&sql, params![service_order], map_service_order_row)
            .optional()?;
        Ok(order)
    }

    /// 服务单列表，可按 RMA 编号过滤
    pub fn list_service_orders(
        conn: &Connection,
        rma_number: Option<&str>,
    ) -> RepositoryResult<Vec<ServiceOrderView>> {
        let rows = match rma_number {
            Some(number) => {
                let sql = format!(
                    "SELECT {} FROM service_orders WHERE rma_number = ?1 \
                     ORDER BY order_created_date, service_order",
                    SERVICE_ORDER_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![number], map_service_order_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM service_orders ORDER BY order_created_date, service_order",
                    SERVICE_ORDER_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], map_service_order_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    }

    /// 客户维修状态
    ///
    /// RMA 归属: customer_id 等于客户 id，或 customer_id 为空且客户名称一致
    pub fn customer_repair_status(
        conn: &Connection,
        customer: Customer,
    ) -> RepositoryResult<CustomerRepairStatus> {
        let sql = format!(
            "SELECT {} FROM rma \
             WHERE customer_id = ?1 \
                OR ((customer_id IS NULL OR customer_id = '') AND customer_name = ?2) \
             ORDER BY date_submitted DESC, rma_number",
            RMA_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rmas = stmt
            .query_map(params![customer.id, customer.name], map_rma_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut orders_by_rma: HashMap<String, Vec<ServiceOrderView>> = HashMap::new();
        if !rmas.is_empty() {
            let sql = format!(
                "SELECT {} FROM service_orders \
                 WHERE rma_number IN (SELECT rma_number FROM rma \
                     WHERE customer_id = ?1 \
                        OR ((customer_id IS NULL OR customer_id = '') AND customer_name = ?2)) \
                 ORDER BY order_created_date, service_order",
                SERVICE_ORDER_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let orders = stmt
                .query_map(params![customer.id, customer.name], map_service_order_row)?
                .collect::<Result<Vec<_>, _>>()?;
            for order in orders {
                if let Some(number) = order.record.rma_number.clone() {
                    orders_by_rma.entry(number).or_default().push(order);
                }
            }
        }

        let rmas: Vec<RmaRepairStatus> = rmas
            .into_iter()
            .map(|rma| {
                let service_orders = orders_by_rma
                    .remove(&rma.record.rma_number)
                    .unwrap_or_default();
                let open_orders = service_orders
                    .iter()
                    .filter(|o| o.record.order_status_kind() != Some(OrderStatus::Closed))
                    .count();
                RmaRepairStatus {
                    rma,
                    service_orders,
                    open_orders,
                }
            })
            .collect();

        let open_rmas = rmas
            .iter()
            .filter(|r| {
                r.rma
                    .record
                    .status_kind()
                    .map(|s| !s.is_closed())
                    .unwrap_or(true)
            })
            .count();

        Ok(CustomerRepairStatus {
            customer,
            total_rmas: rmas.len(),
            open_rmas,
            rmas,
        })
    }
}

fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

fn optional_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(row
        .get::<_, Option<String>>(idx)?
        .filter(|s| !s.trim().is_empty()))
}

fn map_rma_row(row: &Row<'_>) -> rusqlite::Result<RmaView> {
    Ok(RmaView {
        record: RmaRecord {
            rma_number: row.get(0)?,
            customer_id: optional_text(row, 1)?,
            customer_name: text(row, 2)?,
            customer_email: text(row, 3)?,
            contact_name: text(row, 4)?,
            contact_email: text(row, 5)?,
            date_submitted: parse_stored_instant(row.get(6)?),
            status: text(row, 7)?,
        },
        created_at: row.get(8)?,
    })
}

fn map_service_order_row(row: &Row<'_>) -> rusqlite::Result<ServiceOrderView> {
    Ok(ServiceOrderView {
        record: ServiceOrderRecord {
            service_order: row.get(0)?,
            sales_order: text(row, 1)?,
            product_status: text(row, 2)?,
            order_status: text(row, 3)?,
            material: text(row, 4)?,
            material_description: text(row, 5)?,
            serial: text(row, 6)?,
            order_created_date: parse_stored_instant(row.get(7)?),
            customer_required_date: optional_text(row, 8)?.and_then(|s| parse_instant(&s)),
            estimated_completion_date: optional_text(row, 9)?.and_then(|s| parse_instant(&s)),
            rma_number: optional_text(row, 10)?,
        },
        created_at: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::domain::customer::CustomerInput;
    use crate::domain::record::RecordBatch;
    use crate::repository::customer_repo::CustomerRepository;
    use crate::repository::record_writer::RecordWriter;
    use chrono::{TimeZone, Utc};

    fn memory_store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::ensure_schema(&conn).unwrap();
        conn
    }

    fn rma(number: &str, customer_id: Option<&str>, name: &str, status: &str) -> RmaRecord {
        RmaRecord {
            rma_number: number.to_string(),
            customer_id: customer_id.map(str::to_string),
            customer_name: name.to_string(),
            customer_email: String::new(),
            contact_name: String::new(),
            contact_email: String::new(),
            date_submitted: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            status: status.to_string(),
        }
    }

    fn order(number: &str, rma_number: &str, order_status: &str) -> ServiceOrderRecord {
        ServiceOrderRecord {
            service_order: number.to_string(),
            sales_order: "SO-1".to_string(),
            product_status: "rework".to_string(),
            order_status: order_status.to_string(),
            material: "M-1".to_string(),
            material_description: "Pump".to_string(),
            serial: "SN-1".to_string(),
            order_created_date: Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap(),
            customer_required_date: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            estimated_completion_date: None,
            rma_number: Some(rma_number.to_string()),
        }
    }

    #[test]
    fn test_find_rma_round_trip() {
        let mut conn = memory_store();
        let record = rma("RMA-1", None, "Acme", "approved");
        RecordWriter::write_batch(&mut conn, &RecordBatch::Rma(vec![record.clone()])).unwrap();

        let view = RepairQueryRepository::find_rma(&conn, "RMA-1").unwrap().unwrap();
        assert_eq!(view.record, record);
        assert!(view.created_at.is_some());
        assert!(RepairQueryRepository::find_rma(&conn, "RMA-2").unwrap().is_none());
    }

    #[test]
    fn test_list_service_orders_filter() {
        let mut conn = memory_store();
        let batch = RecordBatch::ServiceOrders(vec![
            order("SV-1", "RMA-1", "open"),
            order("SV-2", "RMA-2", "open"),
        ]);
        RecordWriter::write_batch(&mut conn, &batch).unwrap();

        let all = RepairQueryRepository::list_service_orders(&conn, None).unwrap();
        assert_eq!(all.len(), 2);
        let filtered = RepairQueryRepository::list_service_orders(&conn, Some("RMA-2")).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].record, order("SV-2", "RMA-2", "open"));
    }

    #[test]
    fn test_find_service_order() {
        let mut conn = memory_store();
        let batch = RecordBatch::ServiceOrders(vec![
            order("SV-1", "RMA-1", "open"),
            order("SV-2", "RMA-1", "closed"),
        ]);
        RecordWriter::write_batch(&mut conn, &batch).unwrap();

        let view = RepairQueryRepository::find_service_order(&conn, "SV-2")
            .unwrap()
            .unwrap();
        assert_eq!(view.record, order("SV-2", "RMA-1", "closed"));
        assert!(RepairQueryRepository::find_service_order(&conn, "SV-9")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_customer_repair_status_matches_by_id_or_name() {
        let mut conn = memory_store();
        let customer = CustomerRepository::create(
            &conn,
            &CustomerInput {
                name: "Acme".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();

        let rmas = RecordBatch::Rma(vec![
            rma("RMA-1", Some(&customer.id), "Acme Ltd", "in_progress"),
            rma("RMA-2", None, "Acme", "completed"),
            rma("RMA-3", None, "Other", "pending"),
        ]);
        let orders = RecordBatch::ServiceOrders(vec![
            order("SV-1", "RMA-1", "open"),
            order("SV-2", "RMA-1", "closed"),
            order("SV-3", "RMA-3", "open"),
        ]);
        RecordWriter::write_batches(&mut conn, &[rmas, orders]).unwrap();

        let status = RepairQueryRepository::customer_repair_status(&conn, customer).unwrap();
        assert_eq!(status.total_rmas, 2);
        assert_eq!(status.open_rmas, 1);

        let rma_1 = status
            .rmas
            .iter()
            .find(|r| r.rma.record.rma_number == "RMA-1")
            .unwrap();
        assert_eq!(rma_1.service_orders.len(), 2);
        assert_eq!(rma_1.open_orders, 1);
    }
}
