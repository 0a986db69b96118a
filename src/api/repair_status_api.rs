// ==========================================
// 维修状态查询API
// ==========================================
// 职责: RMA / 服务单只读查询
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::rma::RmaView;
use crate::domain::service_order::ServiceOrderView;
use crate::repository::connection_manager::ConnectionManager;
use crate::repository::error::RepositoryError;
use crate::repository::repair_query_repo::RepairQueryRepository;
use std::sync::Arc;

pub struct RepairStatusApi {
    connections: Arc<ConnectionManager>,
}

impl RepairStatusApi {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    pub fn list_rmas(&self) -> ApiResult<Vec<RmaView>> {
        let rmas = self
            .connections
            .with_connection(|conn| RepairQueryRepository::list_rmas(conn))?;
        Ok(rmas)
    }

    pub fn get_rma(&self, rma_number: &str) -> ApiResult<RmaView> {
        self.connections
            .with_connection(|conn| RepairQueryRepository::find_rma(conn, rma_number))?
            .ok_or_else(|| {
                ApiError::from(RepositoryError::NotFound {
                    entity: "RMA".to_string(),
                    id: rma_number.to_string(),
                })
            })
    }

    pub fn get_service_order(&self, service_order: &str) -> ApiResult<ServiceOrderView> {
        self.connections
            .with_connection(|conn| RepairQueryRepository::find_service_order(conn, service_order))?
            .ok_or_else(|| {
                ApiError::from(RepositoryError::NotFound {
                    entity: "ServiceOrder".to_string(),
                    id: service_order.to_string(),
                })
            })
    }

    /// 服务单列表（rma_number 为空串时不过滤）
    pub fn list_service_orders(&self, rma_number: Option<&str>) -> ApiResult<Vec<ServiceOrderView>> {
        let filter = rma_number.map(str::trim).filter(|s| !s.is_empty());
        let orders = self
            .connections
            .with_connection(|conn| RepairQueryRepository::list_service_orders(conn, filter))?;
        Ok(orders)
    }
}
