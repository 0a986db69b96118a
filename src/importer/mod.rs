// ==========================================
// 维修服务追踪系统 - 导入层
// ==========================================
// 职责: 外部数据导入,生成规范记录并落库
// 支持: Excel/ODS, CSV, SQLite 快照, 前端 JSON 对象
// ==========================================

// 模块声明
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod record_importer;
pub mod record_importer_trait;
pub mod snapshot_reader;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::RecordNormalizer;
pub use file_parser::{CsvParser, ExcelParser, SourceFormat, UniversalFileParser};
pub use record_importer::{ImportOutcome, RecordImporter};
pub use snapshot_reader::{SnapshotReader, SnapshotRows};

// 重导出 Trait 接口
pub use record_importer_trait::{FileParser, RowNormalizer};
