// ==========================================
// 维修服务追踪系统 - 导入管道 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 阶段: 文件解析 → 记录规范化 → 落库
// ==========================================

use crate::domain::record::{ImportRecord, RawRow};
use crate::domain::types::RecordKind;
use crate::importer::error::ImportResult;
use chrono::{DateTime, Utc};
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 解析内存中的文件内容为原始行
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 数据行（不含表头，已跳过全空行）
    /// - Err: 格式错误
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>>;

    /// 解析磁盘文件
    fn parse_file(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        let bytes = std::fs::read(file_path)?;
        self.parse_bytes(&bytes)
    }
}

// ==========================================
// RowNormalizer Trait
// ==========================================
// 用途: 记录规范化接口（阶段 1）
// 实现者: RecordNormalizer
pub trait RowNormalizer: Send + Sync {
    /// 将原始行规范化为指定类型的记录
    ///
    /// # 参数
    /// - row: 原始行
    /// - kind: 目标记录类型
    /// - now: 当前时刻（必填日期缺省值）
    fn normalize(
        &self,
        row: &RawRow,
        kind: RecordKind,
        now: DateTime<Utc>,
    ) -> ImportResult<ImportRecord>;
}
