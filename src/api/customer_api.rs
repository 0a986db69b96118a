// ==========================================
// 客户API
// ==========================================
// 职责: 客户创建/编辑/查询，客户维修状态
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_customer_input;
use crate::domain::customer::{Customer, CustomerInput, CustomerRepairStatus};
use crate::repository::connection_manager::ConnectionManager;
use crate::repository::customer_repo::CustomerRepository;
use crate::repository::error::RepositoryError;
use crate::repository::repair_query_repo::RepairQueryRepository;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub struct CustomerApi {
    connections: Arc<ConnectionManager>,
}

impl CustomerApi {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    pub fn list(&self) -> ApiResult<Vec<Customer>> {
        let customers = self
            .connections
            .with_connection(|conn| CustomerRepository::list(conn))?;
        Ok(customers)
    }

    pub fn get(&self, id: &str) -> ApiResult<Customer> {
        self.connections
            .with_connection(|conn| CustomerRepository::find_by_id(conn, id))?
            .ok_or_else(|| customer_not_found(id))
    }

    pub fn create(&self, input: CustomerInput) -> ApiResult<Customer> {
        validate_customer_input(&input)?;
        let customer = self
            .connections
            .with_connection(|conn| CustomerRepository::create(conn, &input, Utc::now()))?;
        info!(customer_id = %customer.id, "客户已创建");
        Ok(customer)
    }

    pub fn update(&self, id: &str, input: CustomerInput) -> ApiResult<Customer> {
        validate_customer_input(&input)?;
        let customer = self
            .connections
            .with_connection(|conn| CustomerRepository::update(conn, id, &input, Utc::now()))?;
        info!(customer_id = %customer.id, "客户已更新");
        Ok(customer)
    }

    /// 客户维修状态（RMA 及其服务单）
    pub fn repair_status(&self, id: &str) -> ApiResult<CustomerRepairStatus> {
        self.connections
            .with_connection(|conn| -> ApiResult<CustomerRepairStatus> {
                let customer = CustomerRepository::find_by_id(conn, id)?
                    .ok_or_else(|| customer_not_found(id))?;
                Ok(RepairQueryRepository::customer_repair_status(conn, customer)?)
            })
    }
}

fn customer_not_found(id: &str) -> ApiError {
    ApiError::from(RepositoryError::NotFound {
        entity: "Customer".to_string(),
        id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ErrorKind;
    use crate::repository::connection_manager::DatabaseConfig;
    use tempfile::NamedTempFile;

    fn connected() -> (NamedTempFile, CustomerApi) {
        let file = NamedTempFile::new().unwrap();
        let connections = Arc::new(ConnectionManager::new());
        connections
            .connect(&DatabaseConfig::new(file.path().display().to_string()))
            .unwrap();
        (file, CustomerApi::new(connections))
    }

    fn input(name: &str) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            contact_name: "Pat".to_string(),
            phone: "555-0100".to_string(),
            email: "pat@acme.test".to_string(),
            address: "1 Main St".to_string(),
        }
    }

    #[test]
    fn test_create_list_get() {
        let (_file, api) = connected();
        let created = api.create(input("Acme")).unwrap();
        api.create(input("Beta")).unwrap();

        let names: Vec<String> = api.list().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Acme".to_string(), "Beta".to_string()]);
        assert_eq!(api.get(&created.id).unwrap(), created);
    }

    #[test]
    fn test_invalid_form_not_written() {
        let (_file, api) = connected();
        let err = api
            .create(CustomerInput {
                email: "bad".to_string(),
                ..input("Acme")
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(api.list().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_customer() {
        let (_file, api) = connected();
        assert_eq!(api.get("missing").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(
            api.repair_status("missing").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
