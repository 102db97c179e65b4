//! Spreadsheet row extraction using calamine.
//!
//! Every sheet is read in workbook order. The first row of a sheet is its
//! header; each later row becomes a header-keyed map, and rows from all sheets
//! are concatenated.

use std::io::Cursor;

use async_trait::async_trait;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde_json::Value;

use crate::error::{ExtractError, ExtractResult};
use crate::types::{FileType, Row, StructuredData};
use crate::Extractor;

/// Spreadsheet extractor for `.xls` and `.xlsx` workbooks.
///
/// Wraps synchronous calamine calls in spawn_blocking to avoid blocking the
/// async runtime.
#[derive(Debug, Clone, Default)]
pub struct TabularExtractor;

impl TabularExtractor {
    /// Create new tabular extractor.
    pub fn new() -> Self {
        Self
    }

    /// Read all sheets synchronously (called within spawn_blocking).
    fn extract_sync(content: Vec<u8>) -> Result<Vec<Row>, ExtractError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(content))
            .map_err(|e| ExtractError::Spreadsheet(format!("Failed to open workbook: {}", e)))?;

        let mut rows = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
                ExtractError::Spreadsheet(format!("Failed to read sheet '{}': {}", sheet_name, e))
            })?;
            let sheet_rows = Self::sheet_rows(&range);
            tracing::debug!(sheet = %sheet_name, rows = sheet_rows.len(), "Read sheet");
            rows.extend(sheet_rows);
        }

        Ok(rows)
    }

    /// Convert one sheet into header-keyed rows.
    fn sheet_rows(range: &Range<Data>) -> Vec<Row> {
        let mut cells = range.rows();
        let Some(header_cells) = cells.next() else {
            return Vec::new();
        };

        let headers: Vec<String> = header_cells
            .iter()
            .enumerate()
            .map(|(index, cell)| Self::header_name(index, cell))
            .collect();

        cells
            .map(|row_cells| {
                let mut row = Row::new();
                for (index, header) in headers.iter().enumerate() {
                    let value = row_cells.get(index).map(Self::cell_value).unwrap_or(Value::Null);
                    row.insert(header.clone(), value);
                }
                row
            })
            .collect()
    }

    fn header_name(index: usize, cell: &Data) -> String {
        let text = cell.to_string();
        if text.trim().is_empty() {
            format!("Column{}", index)
        } else {
            text
        }
    }

    fn cell_value(cell: &Data) -> Value {
        match cell {
            Data::Empty => Value::Null,
            Data::String(s) => Value::String(s.clone()),
            Data::Int(i) => Value::from(*i),
            Data::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Data::Bool(b) => Value::Bool(*b),
            // Dates, durations and cell errors keep calamine's textual form.
            other => Value::String(other.to_string()),
        }
    }
}

#[async_trait]
impl Extractor for TabularExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<StructuredData> {
        let content = content.to_vec();
        let rows = tokio::task::spawn_blocking(move || Self::extract_sync(content)).await??;
        Ok(StructuredData::Rows(rows))
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::Excel]
    }

    fn name(&self) -> &str {
        "calamine"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sheet(cells: &[&[Data]]) -> Range<Data> {
        let height = cells.len() as u32;
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn test_header_row_keys_each_data_row() {
        let range = sheet(&[&[text("Name"), text("Age")], &[text("Ana"), text("30")]]);

        let rows = TabularExtractor::sheet_rows(&range);

        assert_eq!(rows.len(), 1);
        assert_eq!(Value::Object(rows[0].clone()), json!({"Name": "Ana", "Age": "30"}));
    }

    #[test]
    fn test_blank_headers_are_synthesized() {
        let range = sheet(&[
            &[text("Id"), Data::Empty, text("  ")],
            &[Data::Int(7), Data::Float(1.5), Data::Bool(true)],
        ]);

        let rows = TabularExtractor::sheet_rows(&range);

        assert_eq!(
            Value::Object(rows[0].clone()),
            json!({"Id": 7, "Column1": 1.5, "Column2": true})
        );
    }

    #[test]
    fn test_every_row_keeps_header_key_set() {
        let range = sheet(&[
            &[text("A"), text("B")],
            &[text("x"), Data::Empty],
            &[Data::Empty, text("y")],
        ]);

        let rows = TabularExtractor::sheet_rows(&range);

        assert_eq!(rows.len(), 2);
        for row in &rows {
            let keys: Vec<&String> = row.keys().collect();
            assert_eq!(keys, vec!["A", "B"]);
        }
        assert_eq!(rows[0]["B"], Value::Null);
        assert_eq!(rows[1]["B"], json!("y"));
    }

    #[test]
    fn test_header_only_sheet_has_no_rows() {
        let range = sheet(&[&[text("Only"), text("Header")]]);
        assert!(TabularExtractor::sheet_rows(&range).is_empty());
    }

    #[test]
    fn test_empty_sheet_has_no_rows() {
        let range: Range<Data> = Range::empty();
        assert!(TabularExtractor::sheet_rows(&range).is_empty());
    }

    #[tokio::test]
    async fn test_xlsx_workbook_rows() {
        let workbook = include_bytes!("../tests/fixtures/report.xlsx");

        let data = TabularExtractor::new().extract(workbook).await.unwrap();

        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!([{"Name": "Ana", "Age": "30"}])
        );
    }

    #[tokio::test]
    async fn test_xlsx_sheets_concatenate_in_workbook_order() {
        let workbook = include_bytes!("../tests/fixtures/two_sheets.xlsx");

        let data = TabularExtractor::new().extract(workbook).await.unwrap();

        let StructuredData::Rows(rows) = &data else {
            panic!("expected rows, got {:?}", data);
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!([
                {"Name": "Ana", "Age": "30"},
                {"City": "Lima"},
                {"City": "Quito"}
            ])
        );
    }

    #[tokio::test]
    async fn test_invalid_workbook_is_an_error() {
        let extractor = TabularExtractor::new();
        let result = extractor.extract(b"definitely not a spreadsheet").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_supports_only_excel() {
        let extractor = TabularExtractor::new();
        assert!(extractor.supports(FileType::Excel));
        assert!(!extractor.supports(FileType::Text));
    }
}
