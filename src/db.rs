// ==========================================
// 维修服务追踪系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有连接的打开方式与 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表（CREATE TABLE IF NOT EXISTS）与存活探测
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 建表语句
///
/// 说明：
/// - 外键仅声明，不在写入时校验（foreign_keys 保持关闭）
/// - 自然主键不允许为空字符串：空主键视为畸形记录，写入失败并回滚整批
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS customers (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    contact_name TEXT,
    phone TEXT,
    email TEXT,
    address TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS rma (
    rma_number TEXT PRIMARY KEY CHECK (rma_number <> ''),
    customer_id TEXT,
    customer_name TEXT,
    customer_email TEXT,
    contact_name TEXT,
    contact_email TEXT,
    date_submitted DATE,
    status TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (customer_id) REFERENCES customers(id)
);

CREATE TABLE IF NOT EXISTS service_orders (
    service_order TEXT PRIMARY KEY CHECK (service_order <> ''),
    sales_order TEXT,
    product_status TEXT,
    order_status TEXT,
    material TEXT,
    material_description TEXT,
    serial TEXT,
    order_created_date DATE,
    customer_required_date DATE,
    estimated_completion_date DATE,
    rma_number TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (rma_number) REFERENCES rma(rma_number)
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独设置，这里显式关闭（外键只声明）
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开已存在的数据库文件（读写，不自动创建）
pub fn open_existing(db_path: &Path) -> RepositoryResult<Connection> {
    ensure_file_exists(db_path)?;
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(db_path, flags).map_err(|e| open_error(db_path, e))?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 以只读方式打开已存在的数据库文件
pub fn open_read_only(db_path: &Path) -> RepositoryResult<Connection> {
    ensure_file_exists(db_path)?;
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(db_path, flags).map_err(|e| open_error(db_path, e))?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(conn)
}

/// 存活探测
///
/// `SELECT 1` 不读取文件头，因此再读一次 schema_version，
/// 让非 SQLite 文件在这里暴露为 NotADatabase
pub fn probe(conn: &Connection) -> RepositoryResult<()> {
    let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
    if one != 1 {
        return Err(RepositoryError::DatabaseConnectionError(
            "存活探测返回异常结果".to_string(),
        ));
    }
    let _schema_version: i64 = conn.query_row("PRAGMA schema_version", [], |row| row.get(0))?;
    Ok(())
}

/// 确保三张业务表存在
pub fn ensure_schema(conn: &Connection) -> RepositoryResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// 表是否存在
pub fn table_exists(conn: &Connection, table: &str) -> RepositoryResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn ensure_file_exists(db_path: &Path) -> RepositoryResult<()> {
    if !db_path.is_file() {
        return Err(RepositoryError::DatabaseFileNotFound(
            db_path.display().to_string(),
        ));
    }
    Ok(())
}

fn open_error(db_path: &Path, err: rusqlite::Error) -> RepositoryError {
    match RepositoryError::from(err) {
        RepositoryError::InvalidDatabaseFile(msg) => {
            RepositoryError::InvalidDatabaseFile(format!("{} ({})", db_path.display(), msg))
        }
        other => RepositoryError::DatabaseConnectionError(format!(
            "{}: {}",
            db_path.display(),
            other
        )),
    }
}
