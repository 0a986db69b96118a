// ==========================================
// 维修服务追踪系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析（只读第一个工作表，第一行为表头）
// 支持: Excel (.xlsx/.xlsm/.xls/.xlsb) / ODS (.ods) / CSV (.csv)
// ==========================================

use crate::domain::record::{CellValue, RawRow};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::record_importer_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

// ==========================================
// 源文件格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Spreadsheet,
    Csv,
}

impl SourceFormat {
    /// 根据扩展名判断格式（不区分大小写）
    pub fn from_extension(ext: &str) -> ImportResult<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(SourceFormat::Spreadsheet),
            "csv" => Ok(SourceFormat::Csv),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> ImportResult<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }

    pub fn parser(&self) -> &'static dyn FileParser {
        match self {
            SourceFormat::Spreadsheet => &ExcelParser,
            SourceFormat::Csv => &CsvParser,
        }
    }
}

/// 统一表头文本（去除首尾空白与 BOM）
fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        // 读取表头
        let headers: Vec<String> = reader.headers()?.iter().map(clean_header).collect();

        // 读取所有行
        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut row = RawRow::new(idx + 1);

            for (col_idx, value) in record.iter().enumerate() {
                match headers.get(col_idx) {
                    Some(header) if !header.is_empty() => {
                        let cell = if value.trim().is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::Text(value.to_string())
                        };
                        row.insert(header.clone(), cell);
                    }
                    _ => {}
                }
            }

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }

            rows.push(row);
        }

        debug!(rows = rows.len(), "CSV 解析完成");
        Ok(rows)
    }
}

// ==========================================
// Excel Parser 实现（calamine 自动识别 xlsx/xls/xlsb/ods）
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("工作簿中没有工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）；空工作表视为零行
        let mut source_rows = range.rows();
        let headers: Vec<String> = match source_rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| clean_header(&cell.to_string()))
                .collect(),
            None => return Ok(Vec::new()),
        };

        // 读取数据行
        let mut rows = Vec::new();
        for (idx, data_row) in source_rows.enumerate() {
            let mut row = RawRow::new(idx + 1);

            for (col_idx, cell) in data_row.iter().enumerate() {
                match headers.get(col_idx) {
                    Some(header) if !header.is_empty() => {
                        row.insert(header.clone(), to_cell_value(cell));
                    }
                    _ => {}
                }
            }

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }

            rows.push(row);
        }

        debug!(sheet = %sheet_name, rows = rows.len(), "工作表解析完成");
        Ok(rows)
    }
}

/// calamine 单元格 → CellValue
fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        // as_datetime 按工作簿自身的日期系统（1900/1904）换算
        Data::DateTime(dt) if dt.is_datetime() => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Float(dt.as_f64())),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        // #N/A / #REF! 等错误单元格视为空
        Data::Error(_) => CellValue::Empty,
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 解析磁盘文件
    ///
    /// 文件不存在 → NotFound；扩展名不支持 → InvalidFormat
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRow>> {
        let path = file_path.as_ref();
        if !path.is_file() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        SourceFormat::from_path(path)?.parser().parse_file(path)
    }

    /// 按格式解析内存中的内容
    pub fn parse_bytes(&self, bytes: &[u8], format: SourceFormat) -> ImportResult<Vec<RawRow>> {
        format.parser().parse_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ErrorKind;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_parser_trims_headers_and_skips_blank_rows() {
        let csv = "\u{feff} RMA Number ,Status\nRMA-1,approved\n,\nRMA-2,\n";
        let rows = CsvParser.parse_bytes(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].get("RMA Number"),
            Some(&CellValue::Text("RMA-1".to_string()))
        );
        assert_eq!(rows[1].get("Status"), Some(&CellValue::Empty));
        assert_eq!(rows[1].row_number, 3);
    }

    #[test]
    fn test_csv_parser_flexible_row_length() {
        let csv = "A,B,C\n1\n2,3,4,5\n";
        let rows = CsvParser.parse_bytes(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[1].len(), 3);
    }

    #[test]
    fn test_excel_parser_rejects_garbage() {
        let err = ExcelParser.parse_bytes(b"not a workbook at all").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    fn midnight(year: i32, month: u32, day: u32) -> CellValue {
        CellValue::DateTime(
            NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_excel_parser_reads_rows_and_date_cells() {
        let bytes = include_bytes!("../../tests/fixtures/rma_three_rows.xlsx");
        let rows = ExcelParser.parse_bytes(bytes).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].row_number, 1);
        assert_eq!(
            rows[0].get("RMA Number"),
            Some(&CellValue::Text("RMA-100".to_string()))
        );
        assert_eq!(rows[0].get("Date Submitted"), Some(&midnight(2024, 3, 1)));
        assert_eq!(rows[1].get("Status"), Some(&CellValue::Empty));
        assert_eq!(rows[1].get("Date Submitted"), Some(&midnight(2024, 3, 2)));
        assert_eq!(
            rows[2].get("Status"),
            Some(&CellValue::Text("completed".to_string()))
        );
    }

    #[test]
    fn test_excel_parser_uses_1904_date_system() {
        // 1904 日期系统中 43890 对应 2024-03-01
        let bytes = include_bytes!("../../tests/fixtures/rma_1904.xlsx");
        let rows = ExcelParser.parse_bytes(bytes).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Date Submitted"), Some(&midnight(2024, 3, 1)));
    }

    #[test]
    fn test_excel_parser_numeric_key_cell() {
        let bytes = include_bytes!("../../tests/fixtures/service_orders.xlsx");
        let rows = ExcelParser.parse_bytes(bytes).unwrap();

        let key = rows[0].get("Service Order").unwrap();
        assert_eq!(key, &CellValue::Float(70001.0));
        assert_eq!(key.to_text().as_deref(), Some("70001"));
    }

    #[test]
    fn test_source_format_from_extension() {
        assert_eq!(
            SourceFormat::from_extension("XLSX").unwrap(),
            SourceFormat::Spreadsheet
        );
        assert_eq!(SourceFormat::from_extension(".csv").unwrap(), SourceFormat::Csv);
        assert_eq!(
            SourceFormat::from_extension("txt").unwrap_err().kind(),
            ErrorKind::InvalidFormat
        );
    }

    #[test]
    fn test_universal_parser_missing_file() {
        let err = UniversalFileParser
            .parse("/nonexistent/sheet.xlsx")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_universal_parser_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Service Order,Order Status").unwrap();
        writeln!(file, "SV-1,closed").unwrap();
        file.flush().unwrap();

        let rows = UniversalFileParser.parse(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_universal_parser_unsupported_extension() {
        let file = NamedTempFile::new().unwrap();
        let err = UniversalFileParser.parse(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }
}
