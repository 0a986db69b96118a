// ==========================================
// 维修服务追踪系统 - 导入中间结构
// ==========================================
// 用途: 文件解析 → RawRow（弱类型单元格）→ 规范化 → ImportRecord / RecordBatch
// 生命周期: 仅在导入流程内
// ==========================================

use crate::domain::rma::RmaRecord;
use crate::domain::service_order::ServiceOrderRecord;
use crate::domain::types::RecordKind;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use std::collections::HashMap;

// ==========================================
// CellValue - 单元格原始值
// ==========================================
// 来源: 电子表格单元格 / CSV 字段 / 外部 SQLite 列
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// 空单元格或纯空白文本
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 转为文本（空值返回 None）
    ///
    /// 整数值的浮点数不带小数部分输出（Excel 把 1001 存为 1001.0）
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) => Some(format_float(*f)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::DateTime(dt) => Some(format_instant(&dt.and_utc())),
        }
    }
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// ==========================================
// RawRow - 原始行（表头 → 单元格）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: HashMap<String, CellValue>,
    /// 源文件中的数据行号（从 1 开始，不含表头）
    pub row_number: usize,
}

impl RawRow {
    pub fn new(row_number: usize) -> Self {
        Self {
            cells: HashMap::new(),
            row_number,
        }
    }

    pub fn insert(&mut self, header: impl Into<String>, value: CellValue) {
        self.cells.insert(header.into(), value);
    }

    /// 按表头精确查找
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }

    /// 整行为空（所有单元格为空）
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut row = RawRow::new(0);
        for (header, value) in iter {
            row.insert(header, value);
        }
        row
    }
}

// ==========================================
// ImportRecord - 规范化后的单条记录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum ImportRecord {
    Rma(RmaRecord),
    ServiceOrder(ServiceOrderRecord),
}

impl ImportRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            ImportRecord::Rma(_) => RecordKind::Rma,
            ImportRecord::ServiceOrder(_) => RecordKind::ServiceOrder,
        }
    }

    /// 自然主键
    pub fn natural_key(&self) -> &str {
        match self {
            ImportRecord::Rma(r) => &r.rma_number,
            ImportRecord::ServiceOrder(o) => &o.service_order,
        }
    }
}

// ==========================================
// RecordBatch - 同一类型的记录批次
// ==========================================
// 一批只含一种记录，由类型保证
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBatch {
    Rma(Vec<RmaRecord>),
    ServiceOrders(Vec<ServiceOrderRecord>),
}

impl RecordBatch {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordBatch::Rma(_) => RecordKind::Rma,
            RecordBatch::ServiceOrders(_) => RecordKind::ServiceOrder,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordBatch::Rma(records) => records.len(),
            RecordBatch::ServiceOrders(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ==========================================
// 规范日期格式（ISO-8601 瞬时，毫秒精度，Z 结尾）
// ==========================================

/// 格式化为规范 ISO 瞬时字符串，例如 `2024-03-01T00:00:00.000Z`
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 解析规范 ISO 瞬时字符串（也接受其他 RFC 3339 偏移）
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// serde 适配: DateTime<Utc> ⇄ 规范 ISO 字符串
pub mod iso_instant {
    use super::{format_instant, parse_instant};
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_instant(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse_instant(&raw).ok_or_else(|| de::Error::custom(format!("无效的日期: {}", raw)))
    }
}

/// serde 适配: Option<DateTime<Utc>> ⇄ 规范 ISO 字符串 / null
pub mod iso_instant_opt {
    use super::{format_instant, parse_instant};
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_some(&format_instant(v)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_instant(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("无效的日期: {}", raw))),
        }
    }
}
