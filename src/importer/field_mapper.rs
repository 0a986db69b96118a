// ==========================================
// 维修服务追踪系统 - 记录规范化器
// ==========================================
// 职责: 原始行（表头 → 单元格）→ 规范记录 + 类型转换 + 缺省值
// 约束: 纯函数，当前时刻由调用方传入
// ==========================================
// 缺省策略:
// - 文本字段缺失/空 → ""
// - 必填日期（Date Submitted / Order Created Date）缺失 → now
// - 可选日期（Customer Required / Estimated Completion）缺失 → None
// - Status 缺失 → pending；Order Status 缺失 → open
// - 未知枚举取值按 EnumPolicy 处理
// ==========================================

use crate::config::import_config_trait::{EnumPolicy, ImportConfigReader};
use crate::domain::record::{parse_instant, CellValue, ImportRecord, RawRow};
use crate::domain::rma::{headers as rma_headers, RmaRecord};
use crate::domain::service_order::{headers as so_headers, ServiceOrderRecord};
use crate::domain::types::{OrderStatus, ProductStatus, RecordKind, RmaStatus};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::record_importer_trait::RowNormalizer;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use std::str::FromStr;
use tracing::debug;

/// 带时间的文本日期格式
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// 纯日期文本格式
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNormalizer {
    enum_policy: EnumPolicy,
}

impl RecordNormalizer {
    pub fn new(enum_policy: EnumPolicy) -> Self {
        Self { enum_policy }
    }

    pub fn from_config(config: &dyn ImportConfigReader) -> Self {
        Self::new(config.enum_policy())
    }

    pub fn enum_policy(&self) -> EnumPolicy {
        self.enum_policy
    }

    pub fn normalize_rma(&self, row: &RawRow, now: DateTime<Utc>) -> ImportResult<RmaRecord> {
        Ok(RmaRecord {
            // 主键
            rma_number: get_string(row, rma_headers::RMA_NUMBER),

            // 客户信息
            customer_id: get_optional(row, rma_headers::CUSTOMER_ID),
            customer_name: get_string(row, rma_headers::CUSTOMER_NAME),
            customer_email: get_string(row, rma_headers::CUSTOMER_EMAIL),
            contact_name: get_string(row, rma_headers::CONTACT_NAME),
            contact_email: get_string(row, rma_headers::CONTACT_EMAIL),

            // 状态
            date_submitted: parse_date(row, rma_headers::DATE_SUBMITTED)?.unwrap_or(now),
            status: self.resolve_enum::<RmaStatus>(
                row,
                rma_headers::STATUS,
                Some(RmaStatus::DEFAULT.as_str()),
            )?,
        })
    }

    pub fn normalize_service_order(
        &self,
        row: &RawRow,
        now: DateTime<Utc>,
    ) -> ImportResult<ServiceOrderRecord> {
        Ok(ServiceOrderRecord {
            // 主键
            service_order: get_string(row, so_headers::SERVICE_ORDER),

            // 订单信息
            sales_order: get_string(row, so_headers::SALES_ORDER),
            product_status: self.resolve_enum::<ProductStatus>(
                row,
                so_headers::PRODUCT_STATUS,
                None,
            )?,
            order_status: self.resolve_enum::<OrderStatus>(
                row,
                so_headers::ORDER_STATUS,
                Some(OrderStatus::DEFAULT.as_str()),
            )?,

            // 物料信息
            material: get_string(row, so_headers::MATERIAL),
            material_description: get_string(row, so_headers::MATERIAL_DESCRIPTION),
            serial: get_string(row, so_headers::SERIAL),

            // 时间信息
            order_created_date: parse_date(row, so_headers::ORDER_CREATED_DATE)?.unwrap_or(now),
            customer_required_date: parse_date(row, so_headers::CUSTOMER_REQUIRED_DATE)?,
            estimated_completion_date: parse_date(row, so_headers::ESTIMATED_COMPLETION_DATE)?,

            // 关联（可选引用，空值写 NULL）
            rma_number: get_optional(row, so_headers::RMA_NUMBER),
        })
    }

    /// 枚举字段: 缺失取缺省值；未知取值按策略透传或拒绝
    fn resolve_enum<E: FromStr>(
        &self,
        row: &RawRow,
        header: &str,
        default: Option<&str>,
    ) -> ImportResult<String> {
        let value = match get_optional(row, header) {
            Some(v) => v,
            None => return Ok(default.unwrap_or_default().to_string()),
        };

        if value.parse::<E>().is_ok() {
            return Ok(value);
        }

        match self.enum_policy {
            EnumPolicy::PassThrough => {
                debug!(row = row.row_number, field = header, value = %value, "未知枚举值，原样透传");
                Ok(value)
            }
            EnumPolicy::Reject => Err(ImportError::UnknownEnumValue {
                row: row.row_number,
                field: header.to_string(),
                value,
            }),
        }
    }
}

impl RowNormalizer for RecordNormalizer {
    fn normalize(
        &self,
        row: &RawRow,
        kind: RecordKind,
        now: DateTime<Utc>,
    ) -> ImportResult<ImportRecord> {
        match kind {
            RecordKind::Rma => self.normalize_rma(row, now).map(ImportRecord::Rma),
            RecordKind::ServiceOrder => self
                .normalize_service_order(row, now)
                .map(ImportRecord::ServiceOrder),
        }
    }
}

/// 提取文本字段（缺失/空 → ""）
fn get_string(row: &RawRow, header: &str) -> String {
    get_optional(row, header).unwrap_or_default()
}

/// 提取可选文本字段（缺失/空 → None）
fn get_optional(row: &RawRow, header: &str) -> Option<String> {
    row.get(header).and_then(CellValue::to_text)
}

/// 解析日期字段（缺失/空 → None；无法解析 → DateFormatError）
fn parse_date(row: &RawRow, header: &str) -> ImportResult<Option<DateTime<Utc>>> {
    let cell = match row.get(header) {
        Some(cell) if !cell.is_blank() => cell,
        _ => return Ok(None),
    };

    let parsed = match cell {
        CellValue::DateTime(dt) => Some(dt.and_utc()),
        CellValue::Int(i) => excel_serial_to_datetime(*i as f64).map(|dt| dt.and_utc()),
        CellValue::Float(f) => excel_serial_to_datetime(*f).map(|dt| dt.and_utc()),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Bool(_) | CellValue::Empty => None,
    };

    parsed.map(Some).ok_or_else(|| ImportError::DateFormatError {
        row: row.row_number,
        field: header.to_string(),
        value: cell.to_text().unwrap_or_default(),
    })
}

/// 解析文本日期
///
/// 依次尝试 RFC 3339、带时间格式、纯日期格式；无时区的值按 UTC 处理
pub fn parse_date_text(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Some(instant) = parse_instant(trimmed) {
        return Some(instant);
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

/// Excel 序列日期 → NaiveDateTime（1900 日期系统）
///
/// Excel 把 1900 年当作闰年，序列号 60 对应不存在的 1900-02-29，
/// 因此 60 之前的序列号需要补一天
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }

    let mut days = serial.trunc() as i64;
    if days < 60 {
        days += 1;
    }
    let millis = (serial.fract() * 86_400_000.0).round() as i64;

    NaiveDate::from_ymd_opt(1899, 12, 30)?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::milliseconds(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ErrorKind;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    fn row(cells: &[(&str, CellValue)]) -> RawRow {
        cells.iter().cloned().collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_rma_defaults() {
        let normalizer = RecordNormalizer::default();
        let rma = normalizer
            .normalize_rma(&row(&[(rma_headers::RMA_NUMBER, text("RMA-1"))]), now())
            .unwrap();

        assert_eq!(rma.rma_number, "RMA-1");
        assert_eq!(rma.status, "pending");
        assert_eq!(rma.date_submitted, now());
        assert_eq!(rma.customer_name, "");
        assert_eq!(rma.customer_id, None);
    }

    #[test]
    fn test_service_order_defaults() {
        let normalizer = RecordNormalizer::default();
        let order = normalizer
            .normalize_service_order(
                &row(&[
                    (so_headers::SERVICE_ORDER, CellValue::Float(1001.0)),
                    (so_headers::RMA_NUMBER, text("  ")),
                ]),
                now(),
            )
            .unwrap();

        assert_eq!(order.service_order, "1001");
        assert_eq!(order.order_status, "open");
        assert_eq!(order.product_status, "");
        assert_eq!(order.order_created_date, now());
        assert_eq!(order.customer_required_date, None);
        assert_eq!(order.estimated_completion_date, None);
        assert_eq!(order.rma_number, None);
    }

    #[test]
    fn test_date_sources() {
        let normalizer = RecordNormalizer::default();
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        for cell in [
            text("2024-03-01"),
            text("2024/03/01"),
            text("03/01/2024"),
            text("20240301"),
            text("2024-03-01T00:00:00.000Z"),
            text("2024-03-01 00:00:00"),
            CellValue::Float(45352.0),
            CellValue::Int(45352),
            CellValue::DateTime(expected.naive_utc()),
        ] {
            let rma = normalizer
                .normalize_rma(&row(&[(rma_headers::DATE_SUBMITTED, cell.clone())]), now())
                .unwrap();
            assert_eq!(rma.date_submitted, expected, "单元格 {:?}", cell);
        }
    }

    #[test]
    fn test_unparseable_date_is_invalid_format() {
        let normalizer = RecordNormalizer::default();
        let mut raw = row(&[(so_headers::CUSTOMER_REQUIRED_DATE, text("next tuesday"))]);
        raw.row_number = 7;

        let err = normalizer.normalize_service_order(&raw, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert!(err.to_string().contains("行 7"));
    }

    #[test]
    fn test_enum_policy() {
        let raw = row(&[
            (so_headers::PRODUCT_STATUS, text("on_the_moon")),
            (so_headers::ORDER_STATUS, text("closed")),
        ]);

        let order = RecordNormalizer::new(EnumPolicy::PassThrough)
            .normalize_service_order(&raw, now())
            .unwrap();
        assert_eq!(order.product_status, "on_the_moon");
        assert_eq!(order.order_status, "closed");

        let err = RecordNormalizer::new(EnumPolicy::Reject)
            .normalize_service_order(&raw, now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_unknown_headers_ignored() {
        let normalizer = RecordNormalizer::default();
        let rma = normalizer
            .normalize(
                &row(&[
                    (rma_headers::RMA_NUMBER, text("RMA-9")),
                    ("rma number", text("ignored")),
                    ("Notes", text("ignored")),
                ]),
                RecordKind::Rma,
                now(),
            )
            .unwrap();
        assert_eq!(rma.natural_key(), "RMA-9");
        assert_eq!(rma.kind(), RecordKind::Rma);
    }

    #[test]
    fn test_excel_serial_conversion() {
        let date = |serial: f64| excel_serial_to_datetime(serial).unwrap();
        assert_eq!(date(1.0), NaiveDate::from_ymd_opt(1900, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(date(61.0), NaiveDate::from_ymd_opt(1900, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(
            date(45292.5),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
        );
        assert!(excel_serial_to_datetime(0.0).is_none());
        assert!(excel_serial_to_datetime(f64::NAN).is_none());
    }
}
