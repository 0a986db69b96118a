// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、连接管理器、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use rma_tracker::db;
use rma_tracker::domain::{RmaInput, ServiceOrderInput};
use rma_tracker::repository::{ConnectionManager, DatabaseConfig};
use rusqlite::Connection;
use std::error::Error;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().display().to_string();

    let conn = Connection::open(&db_path)?;
    db::ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库（已建表）
pub fn open_test_store() -> Result<(NamedTempFile, Connection), Box<dyn Error>> {
    let (temp_file, db_path) = create_test_db()?;
    let conn = Connection::open(&db_path)?;
    db::configure_sqlite_connection(&conn)?;
    Ok((temp_file, conn))
}

/// 创建旧版服务端建出的数据库（主键列没有 CHECK 约束）
pub fn create_legacy_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().display().to_string();

    let conn = Connection::open(&db_path)?;
    conn.execute_batch(
        r#"
        CREATE TABLE customers (
            id TEXT PRIMARY KEY, name TEXT NOT NULL, contact_name TEXT, phone TEXT,
            email TEXT, address TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE rma (
            rma_number TEXT PRIMARY KEY, customer_id TEXT, customer_name TEXT,
            customer_email TEXT, contact_name TEXT, contact_email TEXT,
            date_submitted DATE, status TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (customer_id) REFERENCES customers(id)
        );
        CREATE TABLE service_orders (
            service_order TEXT PRIMARY KEY, sales_order TEXT, product_status TEXT,
            order_status TEXT, material TEXT, material_description TEXT, serial TEXT,
            order_created_date DATE, customer_required_date DATE,
            estimated_completion_date DATE, rma_number TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (rma_number) REFERENCES rma(rma_number)
        );
        "#,
    )?;

    Ok((temp_file, db_path))
}

/// 已连接到临时数据库的连接管理器
pub fn connected_manager() -> Result<(NamedTempFile, Arc<ConnectionManager>), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let manager = Arc::new(ConnectionManager::new());
    manager.connect(&DatabaseConfig::new(temp_file.path().display().to_string()))?;
    Ok((temp_file, manager))
}

/// 直接统计表行数（绕过仓储层）
pub fn count_rows(db_path: &str, table: &str) -> Result<i64, Box<dyn Error>> {
    let conn = Connection::open(db_path)?;
    let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(count)
}

/// 构造 RMA 提交对象
pub fn rma_input(rma_number: &str, status: Option<&str>) -> RmaInput {
    RmaInput {
        rma_number: Some(rma_number.to_string()),
        customer_name: Some("Acme Industrial".to_string()),
        customer_email: Some("service@acme.test".to_string()),
        date_submitted: Some("2024-03-01".to_string()),
        status: status.map(str::to_string),
        ..Default::default()
    }
}

/// 构造服务单提交对象
pub fn service_order_input(service_order: &str, rma_number: Option<&str>) -> ServiceOrderInput {
    ServiceOrderInput {
        service_order: Some(service_order.to_string()),
        sales_order: Some(format!("SAL-{}", service_order)),
        material: Some("PUMP-200".to_string()),
        order_created_date: Some("2024-03-02".to_string()),
        rma_number: rma_number.map(str::to_string),
        ..Default::default()
    }
}

/// 创建外部快照数据库（列名为 snake_case）
pub fn create_snapshot_db(
    rmas: &[(&str, &str)],
    service_orders: &[(&str, &str)],
) -> Result<NamedTempFile, Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let conn = Connection::open(temp_file.path())?;

    conn.execute_batch(
        r#"
        CREATE TABLE rma (rma_number TEXT, customer_name TEXT, status TEXT, date_submitted TEXT);
        CREATE TABLE service_orders (service_order TEXT, order_status TEXT, rma_number TEXT);
        "#,
    )?;
    for (number, status) in rmas {
        conn.execute(
            "INSERT INTO rma VALUES (?1, 'Snapshot Co', ?2, '2023-12-31')",
            [number, status],
        )?;
    }
    for (order, rma_number) in service_orders {
        conn.execute(
            "INSERT INTO service_orders VALUES (?1, 'closed', ?2)",
            [order, rma_number],
        )?;
    }
    Ok(temp_file)
}
