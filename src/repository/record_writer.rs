// ==========================================
// 维修服务追踪系统 - 冲突解决写入器
// ==========================================
// 职责: 以 INSERT OR REPLACE（按自然主键）批量落库
// 事务: 一批一个事务；任意一行失败则整批回滚
// 红线: Repository 不含业务规则，只做数据写入
// ==========================================

use crate::domain::record::{format_instant, RecordBatch};
use crate::domain::rma::RmaRecord;
use crate::domain::service_order::ServiceOrderRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Transaction};
use tracing::{debug, error, info};

const UPSERT_RMA_SQL: &str = r#"
    INSERT OR REPLACE INTO rma (
        rma_number, customer_id, customer_name, customer_email,
        contact_name, contact_email, date_submitted, status
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

const UPSERT_SERVICE_ORDER_SQL: &str = r#"
    INSERT OR REPLACE INTO service_orders (
        service_order, sales_order, product_status,
        order_status, material, material_description,
        serial, order_created_date, customer_required_date,
        estimated_completion_date, rma_number
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

// ==========================================
// RecordWriter
// ==========================================
pub struct RecordWriter;

impl RecordWriter {
    /// 写入单个批次（一个事务）
    ///
    /// # 返回
    /// - Ok(usize): 写入的记录数
    /// - Err: 任意一行失败，整批回滚
    pub fn write_batch(conn: &mut Connection, batch: &RecordBatch) -> RepositoryResult<usize> {
        Self::write_batches(conn, std::slice::from_ref(batch))
    }

    /// 在同一个事务中依次写入多个批次
    pub fn write_batches(conn: &mut Connection, batches: &[RecordBatch]) -> RepositoryResult<usize> {
        let total: usize = batches.iter().map(RecordBatch::len).sum();
        if total == 0 {
            debug!("空批次，跳过写入");
            return Ok(0);
        }

        // Transaction 在 drop 时回滚，任何 ? 提前返回都不会留下半批数据
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut written = 0;
        for batch in batches {
            written += Self::upsert_in_tx(&tx, batch).map_err(|e| {
                error!(kind = %batch.kind(), error = %e, "批次写入失败，事务回滚");
                e
            })?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        info!(count = written, "批次写入完成");
        Ok(written)
    }

    /// 在事务中执行 upsert（按批内顺序，重复主键后者覆盖前者）
    pub fn upsert_in_tx(tx: &Transaction, batch: &RecordBatch) -> RepositoryResult<usize> {
        match batch {
            RecordBatch::Rma(records) => Self::upsert_rmas(tx, records),
            RecordBatch::ServiceOrders(records) => Self::upsert_service_orders(tx, records),
        }
    }

    fn upsert_rmas(tx: &Transaction, records: &[RmaRecord]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(UPSERT_RMA_SQL)?;

        let mut count = 0;
        for rma in records {
            require_key("rma_number", &rma.rma_number)?;
            stmt.execute(params![
                rma.rma_number,
                rma.customer_id,
                rma.customer_name,
                rma.customer_email,
                rma.contact_name,
                rma.contact_email,
                format_instant(&rma.date_submitted),
                rma.status,
            ])
            .map_err(|e| row_error("rma_number", &rma.rma_number, e))?;
            count += 1;
        }

        Ok(count)
    }

    fn upsert_service_orders(
        tx: &Transaction,
        records: &[ServiceOrderRecord],
    ) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(UPSERT_SERVICE_ORDER_SQL)?;

        let mut count = 0;
        for order in records {
            require_key("service_order", &order.service_order)?;
            stmt.execute(params![
                order.service_order,
                order.sales_order,
                order.product_status,
                order.order_status,
                order.material,
                order.material_description,
                order.serial,
                format_instant(&order.order_created_date),
                order.customer_required_date.as_ref().map(format_instant),
                order.estimated_completion_date.as_ref().map(format_instant),
                order.rma_number,
            ])
            .map_err(|e| row_error("service_order", &order.service_order, e))?;
            count += 1;
        }

        Ok(count)
    }
}

/// 自然主键不能为空（不依赖表结构中的 CHECK，已有库可能没有该约束）
fn require_key(key_column: &str, key: &str) -> RepositoryResult<()> {
    if key.trim().is_empty() {
        return Err(RepositoryError::ConstraintViolation(format!(
            "{} 不能为空",
            key_column
        )));
    }
    Ok(())
}

/// 附带主键信息的行级错误
fn row_error(key_column: &str, key: &str, err: rusqlite::Error) -> RepositoryError {
    match RepositoryError::from(err) {
        RepositoryError::ConstraintViolation(msg) => {
            RepositoryError::ConstraintViolation(format!("{}='{}': {}", key_column, key, msg))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::domain::types::ErrorKind;
    use chrono::{TimeZone, Utc};

    fn memory_store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::ensure_schema(&conn).unwrap();
        conn
    }

    fn rma(number: &str, status: &str) -> RmaRecord {
        RmaRecord {
            rma_number: number.to_string(),
            customer_id: None,
            customer_name: "Acme".to_string(),
            customer_email: "ops@acme.test".to_string(),
            contact_name: "Jo".to_string(),
            contact_email: "jo@acme.test".to_string(),
            date_submitted: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            status: status.to_string(),
        }
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut conn = memory_store();
        let written = RecordWriter::write_batch(&mut conn, &RecordBatch::Rma(vec![])).unwrap();
        assert_eq!(written, 0);
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let mut conn = memory_store();
        let batch = RecordBatch::Rma(vec![rma("RMA-1", "pending"), rma("RMA-1", "approved")]);
        assert_eq!(RecordWriter::write_batch(&mut conn, &batch).unwrap(), 2);

        let status: String = conn
            .query_row("SELECT status FROM rma WHERE rma_number = 'RMA-1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(status, "approved");
        assert_eq!(count(&conn, "rma"), 1);
    }

    #[test]
    fn test_failed_row_rolls_back_batch() {
        let mut conn = memory_store();
        let batch = RecordBatch::Rma(vec![rma("RMA-1", "pending"), rma("", "pending")]);
        let err = RecordWriter::write_batch(&mut conn, &batch).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(count(&conn, "rma"), 0);
    }

    #[test]
    fn test_blank_key_rejected_without_check_constraint() {
        // 旧版服务端建的库：主键列没有 CHECK
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE rma (rma_number TEXT PRIMARY KEY, customer_id TEXT, customer_name TEXT,
                 customer_email TEXT, contact_name TEXT, contact_email TEXT,
                 date_submitted DATE, status TEXT, created_at DATETIME DEFAULT CURRENT_TIMESTAMP);
             CREATE TABLE service_orders (service_order TEXT PRIMARY KEY, sales_order TEXT,
                 product_status TEXT, order_status TEXT, material TEXT, material_description TEXT,
                 serial TEXT, order_created_date DATE, customer_required_date DATE,
                 estimated_completion_date DATE, rma_number TEXT,
                 created_at DATETIME DEFAULT CURRENT_TIMESTAMP);",
        )
        .unwrap();

        let batch = RecordBatch::Rma(vec![rma("RMA-1", "pending"), rma("  ", "pending")]);
        let err = RecordWriter::write_batch(&mut conn, &batch).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(count(&conn, "rma"), 0);

        let order = ServiceOrderRecord {
            service_order: String::new(),
            sales_order: String::new(),
            product_status: String::new(),
            order_status: "open".to_string(),
            material: String::new(),
            material_description: String::new(),
            serial: String::new(),
            order_created_date: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            customer_required_date: None,
            estimated_completion_date: None,
            rma_number: None,
        };
        let err = RecordWriter::write_batch(&mut conn, &RecordBatch::ServiceOrders(vec![order]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(count(&conn, "service_orders"), 0);
    }
}
