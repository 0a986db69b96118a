// ==========================================
// 数据导入API
// ==========================================
// 职责: 封装表格上传、快照导入与前端对象保存
// 约束: 所有写入借用 ConnectionManager 的当前连接
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ImportConfigReader;
use crate::domain::rma::RmaInput;
use crate::domain::service_order::ServiceOrderInput;
use crate::domain::types::RecordKind;
use crate::importer::{ImportOutcome, RecordImporter, SourceFormat};
use crate::repository::connection_manager::ConnectionManager;
use std::path::Path;
use std::sync::Arc;

/// 导入API
pub struct ImportApi {
    connections: Arc<ConnectionManager>,
    importer: RecordImporter,
    max_upload_bytes: usize,
}

impl ImportApi {
    pub fn new(connections: Arc<ConnectionManager>, config: &dyn ImportConfigReader) -> Self {
        Self {
            connections,
            importer: RecordImporter::from_config(config),
            max_upload_bytes: config.max_upload_bytes(),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// 保存 RMA 对象数组
    pub fn save_rmas(&self, inputs: Vec<RmaInput>) -> ApiResult<ImportOutcome> {
        let outcome = self
            .connections
            .with_connection(|conn| self.importer.save_rmas(conn, inputs))?;
        Ok(outcome)
    }

    /// 保存服务单对象数组
    pub fn save_service_orders(&self, inputs: Vec<ServiceOrderInput>) -> ApiResult<ImportOutcome> {
        let outcome = self
            .connections
            .with_connection(|conn| self.importer.save_service_orders(conn, inputs))?;
        Ok(outcome)
    }

    /// 导入上传的表格文件（按文件名扩展名选择解析器）
    ///
    /// # 参数
    /// - file_name: 客户端提供的文件名
    /// - bytes: 文件内容
    /// - kind: 目标记录类型
    pub fn import_upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        kind: RecordKind,
    ) -> ApiResult<ImportOutcome> {
        self.check_upload(bytes)?;
        let format = SourceFormat::from_path(Path::new(file_name))?;
        let outcome = self
            .connections
            .with_connection(|conn| self.importer.import_bytes(conn, bytes, format, kind))?;
        Ok(outcome)
    }

    /// 导入外部 SQLite 快照文件
    pub fn import_snapshot(&self, snapshot_path: &Path) -> ApiResult<ImportOutcome> {
        let outcome = self.connections.with_connection(|conn| {
            self.importer.import_database_snapshot(conn, snapshot_path)
        })?;
        Ok(outcome)
    }

    fn check_upload(&self, bytes: &[u8]) -> ApiResult<()> {
        if bytes.is_empty() {
            return Err(ApiError::InvalidInput("上传文件为空".to_string()));
        }
        if bytes.len() > self.max_upload_bytes {
            return Err(ApiError::InvalidInput(format!(
                "上传文件过大: {} 字节（上限 {} 字节）",
                bytes.len(),
                self.max_upload_bytes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::domain::types::ErrorKind;
    use crate::repository::connection_manager::DatabaseConfig;
    use tempfile::NamedTempFile;

    fn connected() -> (NamedTempFile, ImportApi) {
        let file = NamedTempFile::new().unwrap();
        let connections = Arc::new(ConnectionManager::new());
        connections
            .connect(&DatabaseConfig::new(file.path().display().to_string()))
            .unwrap();
        let api = ImportApi::new(connections, &AppConfig::default());
        (file, api)
    }

    #[test]
    fn test_save_requires_connection() {
        let api = ImportApi::new(Arc::new(ConnectionManager::new()), &AppConfig::default());
        let err = api.save_rmas(vec![RmaInput::default()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionFailure);
    }

    #[test]
    fn test_upload_csv() {
        let (_file, api) = connected();
        let csv = b"RMA Number,Status\nRMA-1,approved\nRMA-2,\n";
        let outcome = api.import_upload("rmas.CSV", csv, RecordKind::Rma).unwrap();
        assert_eq!(outcome.count, 2);
    }

    #[test]
    fn test_upload_rejects_unknown_extension_and_empty_body() {
        let (_file, api) = connected();
        let err = api
            .import_upload("rmas.txt", b"RMA Number\nRMA-1\n", RecordKind::Rma)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);

        let err = api.import_upload("rmas.csv", b"", RecordKind::Rma).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
