// ==========================================
// 维修服务追踪系统 - 导入编排器
// ==========================================
// 职责: 整合导入流程，从数据源到数据库
// 流程: 解析 → 规范化 → 落库（一批一个事务）
// 约束: 任一阶段失败则整次导入失败，不做部分恢复
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::record::{ImportRecord, RawRow, RecordBatch};
use crate::domain::rma::RmaInput;
use crate::domain::service_order::ServiceOrderInput;
use crate::domain::types::RecordKind;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::RecordNormalizer;
use crate::importer::file_parser::{SourceFormat, UniversalFileParser};
use crate::importer::record_importer_trait::RowNormalizer;
use crate::importer::snapshot_reader::SnapshotReader;
use crate::repository::record_writer::RecordWriter;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    /// 写入的记录数（批内重复主键按行计数）
    pub count: usize,
    pub elapsed_ms: u64,
}

// ==========================================
// RecordImporter - 导入编排器
// ==========================================
pub struct RecordImporter {
    normalizer: Box<dyn RowNormalizer>,
}

impl Default for RecordImporter {
    fn default() -> Self {
        Self::new(Box::new(RecordNormalizer::default()))
    }
}

impl RecordImporter {
    pub fn new(normalizer: Box<dyn RowNormalizer>) -> Self {
        Self { normalizer }
    }

    pub fn from_config(config: &dyn ImportConfigReader) -> Self {
        Self::new(Box::new(RecordNormalizer::from_config(config)))
    }

    /// 导入电子表格（第一个工作表）
    #[instrument(skip_all, fields(kind = %kind, bytes = bytes.len()))]
    pub fn import_workbook(
        &self,
        conn: &mut Connection,
        bytes: &[u8],
        kind: RecordKind,
    ) -> ImportResult<ImportOutcome> {
        self.import_bytes(conn, bytes, SourceFormat::Spreadsheet, kind)
    }

    /// 导入 CSV 内容
    #[instrument(skip_all, fields(kind = %kind, bytes = bytes.len()))]
    pub fn import_csv(
        &self,
        conn: &mut Connection,
        bytes: &[u8],
        kind: RecordKind,
    ) -> ImportResult<ImportOutcome> {
        self.import_bytes(conn, bytes, SourceFormat::Csv, kind)
    }

    /// 按指定格式导入内存内容
    pub fn import_bytes(
        &self,
        conn: &mut Connection,
        bytes: &[u8],
        format: SourceFormat,
        kind: RecordKind,
    ) -> ImportResult<ImportOutcome> {
        let start = Instant::now();
        info!(kind = %kind, format = ?format, "开始导入");

        // === 步骤 1: 解析 ===
        debug!("步骤 1: 解析文件内容");
        let rows = UniversalFileParser
            .parse_bytes(bytes, format)
            .inspect_err(|e| error!(error = %e, "文件解析失败"))?;

        self.finish(conn, rows, kind, Utc::now(), start)
    }

    /// 导入磁盘文件（按扩展名选择解析器）
    #[instrument(skip_all, fields(kind = %kind, path = %file_path.display()))]
    pub fn import_file(
        &self,
        conn: &mut Connection,
        file_path: &Path,
        kind: RecordKind,
    ) -> ImportResult<ImportOutcome> {
        let start = Instant::now();
        info!("开始导入文件");

        debug!("步骤 1: 解析文件");
        let rows = UniversalFileParser
            .parse(file_path)
            .inspect_err(|e| error!(error = %e, "文件解析失败"))?;

        self.finish(conn, rows, kind, Utc::now(), start)
    }

    /// 导入外部 SQLite 快照（rma 与 service_orders 同一事务，RMA 先写）
    #[instrument(skip_all, fields(path = %snapshot_path.display()))]
    pub fn import_database_snapshot(
        &self,
        conn: &mut Connection,
        snapshot_path: &Path,
    ) -> ImportResult<ImportOutcome> {
        let start = Instant::now();
        let now = Utc::now();
        info!("开始导入数据库快照");

        // === 步骤 1: 读取快照 ===
        debug!("步骤 1: 读取快照");
        let snapshot = SnapshotReader::read(snapshot_path)?;

        // === 步骤 2: 规范化 ===
        debug!("步骤 2: 规范化");
        let mut batches = Vec::with_capacity(2);
        if let Some(rows) = snapshot.rmas {
            batches.push(self.normalize_rows(&rows, RecordKind::Rma, now)?);
        }
        if let Some(rows) = snapshot.service_orders {
            batches.push(self.normalize_rows(&rows, RecordKind::ServiceOrder, now)?);
        }

        // === 步骤 3: 落库 ===
        debug!("步骤 3: 落库");
        let count = RecordWriter::write_batches(conn, &batches)?;

        let outcome = ImportOutcome {
            count,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        info!(count = outcome.count, elapsed_ms = outcome.elapsed_ms, "快照导入完成");
        Ok(outcome)
    }

    /// 保存前端提交的 RMA 对象（与表格导入同一缺省策略）
    #[instrument(skip_all, fields(rows = inputs.len()))]
    pub fn save_rmas(
        &self,
        conn: &mut Connection,
        inputs: Vec<RmaInput>,
    ) -> ImportResult<ImportOutcome> {
        let rows = inputs
            .into_iter()
            .enumerate()
            .map(|(idx, input)| input.into_raw_row(idx + 1))
            .collect();
        self.import_rows(conn, rows, RecordKind::Rma, Utc::now())
    }

    /// 保存前端提交的服务单对象
    #[instrument(skip_all, fields(rows = inputs.len()))]
    pub fn save_service_orders(
        &self,
        conn: &mut Connection,
        inputs: Vec<ServiceOrderInput>,
    ) -> ImportResult<ImportOutcome> {
        let rows = inputs
            .into_iter()
            .enumerate()
            .map(|(idx, input)| input.into_raw_row(idx + 1))
            .collect();
        self.import_rows(conn, rows, RecordKind::ServiceOrder, Utc::now())
    }

    /// 规范化并写入已解析的原始行
    pub fn import_rows(
        &self,
        conn: &mut Connection,
        rows: Vec<RawRow>,
        kind: RecordKind,
        now: DateTime<Utc>,
    ) -> ImportResult<ImportOutcome> {
        self.finish(conn, rows, kind, now, Instant::now())
    }

    fn finish(
        &self,
        conn: &mut Connection,
        rows: Vec<RawRow>,
        kind: RecordKind,
        now: DateTime<Utc>,
        start: Instant,
    ) -> ImportResult<ImportOutcome> {
        info!(total_rows = rows.len(), "解析完成");

        // === 步骤 2: 规范化 ===
        debug!("步骤 2: 规范化");
        let batch = self
            .normalize_rows(&rows, kind, now)
            .inspect_err(|e| error!(error = %e, "记录规范化失败"))?;

        // === 步骤 3: 落库 ===
        debug!("步骤 3: 落库");
        let count = RecordWriter::write_batch(conn, &batch)?;

        let outcome = ImportOutcome {
            count,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        info!(kind = %kind, count = outcome.count, elapsed_ms = outcome.elapsed_ms, "导入完成");
        Ok(outcome)
    }

    /// 逐行规范化（保持源顺序），汇总为单一类型批次
    fn normalize_rows(
        &self,
        rows: &[RawRow],
        kind: RecordKind,
        now: DateTime<Utc>,
    ) -> ImportResult<RecordBatch> {
        let mut batch = match kind {
            RecordKind::Rma => RecordBatch::Rma(Vec::with_capacity(rows.len())),
            RecordKind::ServiceOrder => RecordBatch::ServiceOrders(Vec::with_capacity(rows.len())),
        };

        for row in rows {
            match (self.normalizer.normalize(row, kind, now)?, &mut batch) {
                (ImportRecord::Rma(record), RecordBatch::Rma(records)) => records.push(record),
                (ImportRecord::ServiceOrder(record), RecordBatch::ServiceOrders(records)) => {
                    records.push(record)
                }
                (record, _) => {
                    return Err(ImportError::KindMismatch {
                        expected: kind,
                        actual: record.kind(),
                    })
                }
            }
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::domain::types::ErrorKind;

    fn memory_store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::ensure_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_import_csv_counts_rows_written() {
        let mut conn = memory_store();
        let csv = "Service Order,Order Status,RMA Number\nSV-1,,RMA-1\nSV-2,closed,\n";

        let outcome = RecordImporter::default()
            .import_csv(&mut conn, csv.as_bytes(), RecordKind::ServiceOrder)
            .unwrap();
        assert_eq!(outcome.count, 2);

        let open: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM service_orders WHERE order_status = 'open'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(open, 1);
    }

    #[test]
    fn test_save_rmas_applies_defaults() {
        let mut conn = memory_store();
        let inputs = vec![RmaInput {
            rma_number: Some("RMA-5".to_string()),
            ..Default::default()
        }];

        let outcome = RecordImporter::default().save_rmas(&mut conn, inputs).unwrap();
        assert_eq!(outcome.count, 1);

        let status: String = conn
            .query_row("SELECT status FROM rma WHERE rma_number = 'RMA-5'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(status, "pending");
    }

    #[test]
    fn test_parse_failure_writes_nothing() {
        let mut conn = memory_store();
        let err = RecordImporter::default()
            .import_workbook(&mut conn, b"garbage", RecordKind::Rma)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_bad_date_aborts_whole_import() {
        let mut conn = memory_store();
        let csv = "RMA Number,Date Submitted\nRMA-1,2024-01-01\nRMA-2,someday\n";
        let err = RecordImporter::default()
            .import_csv(&mut conn, csv.as_bytes(), RecordKind::Rma)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM rma", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
