// ==========================================
// 维修服务追踪系统 - 客户仓储
// ==========================================
// 职责: customers 表的创建/更新/查询
// 红线: 不含校验规则（由 API 层负责）
// ==========================================

use crate::domain::customer::{Customer, CustomerInput};
use crate::domain::record::{format_instant, parse_instant};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const SELECT_COLUMNS: &str =
    "id, name, contact_name, phone, email, address, created_at, updated_at";

pub struct CustomerRepository;

impl CustomerRepository {
    /// 创建客户（生成 UUID 作为 id）
    pub fn create(
        conn: &Connection,
        input: &CustomerInput,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Customer> {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            contact_name: input.contact_name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            email: input.email.trim().to_string(),
            address: input.address.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            r#"
            INSERT INTO customers (
                id, name, contact_name, phone, email, address, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                customer.id,
                customer.name,
                customer.contact_name,
                customer.phone,
                customer.email,
                customer.address,
                format_instant(&customer.created_at),
                format_instant(&customer.updated_at),
            ],
        )?;

        Ok(customer)
    }

    /// 更新客户（整体替换表单字段，保留 created_at）
    pub fn update(
        conn: &Connection,
        id: &str,
        input: &CustomerInput,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Customer> {
        let affected = conn.execute(
            r#"
            UPDATE customers
            SET name = ?2, contact_name = ?3, phone = ?4, email = ?5, address = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
            params![
                id,
                input.name.trim(),
                input.contact_name.trim(),
                input.phone.trim(),
                input.email.trim(),
                input.address.trim(),
                format_instant(&now),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Customer".to_string(),
                id: id.to_string(),
            });
        }

        Self::find_by_id(conn, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Customer".to_string(),
            id: id.to_string(),
        })
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> RepositoryResult<Option<Customer>> {
        let sql = format!("SELECT {} FROM customers WHERE id = ?1", SELECT_COLUMNS);
        let customer = conn
            .query_row(&sql, params![id], map_customer_row)
            .optional()?;
        Ok(customer)
    }

    /// 按名称排序列出全部客户
    pub fn list(conn: &Connection) -> RepositoryResult<Vec<Customer>> {
        let sql = format!(
            "SELECT {} FROM customers ORDER BY name COLLATE NOCASE, id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let customers = stmt
            .query_map([], map_customer_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(customers)
    }
}

fn map_customer_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        contact_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        phone: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        email: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        address: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        created_at: parse_stored_instant(row.get::<_, Option<String>>(6)?),
        updated_at: parse_stored_instant(row.get::<_, Option<String>>(7)?),
    })
}

/// 解析库中的时间戳
///
/// 兼容 ISO 瞬时与 SQLite CURRENT_TIMESTAMP 格式；无法解析时取 UNIX 纪元
pub(crate) fn parse_stored_instant(raw: Option<String>) -> DateTime<Utc> {
    raw.as_deref()
        .and_then(|s| {
            parse_instant(s).or_else(|| {
                NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|dt| dt.and_utc())
            })
        })
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
