//! Excel exporter implementation - database table → Excel (.xlsx)

use crate::config::ConnectionConfig;
use crate::db;
use crate::error::{TransferError, TransferResult};
use crate::types::{CellValue, Column, Dataset, TypeTag};
use rusqlite::Connection;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Result of reading a table
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Rows(Dataset<CellValue>),
    /// The query returned no rows
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Exported(ExportSummary),
    /// Nothing was written because the table had no rows
    NothingToExport,
}

/// Excel exporter for database tables
pub struct ExcelExporter {
    config: ConnectionConfig,
}

impl ExcelExporter {
    /// Create a new Excel exporter
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    /// Read every row of `table` in `database`.
    ///
    /// The connection is closed before returning, whatever the outcome.
    pub fn fetch(&self, database: &str, table: &str) -> TransferResult<Fetched> {
        let conn = db::connect(&self.config, database).inspect_err(|e| {
            error!(database, error = %e, "connection failed");
        })?;

        let result = Self::query_table(&conn, table);
        db::close(conn, database);

        if let Err(e) = &result {
            error!(table, error = %e, "query failed");
        }
        result
    }

    /// Run `SELECT *` against `table` on an open connection.
    pub fn query_table(conn: &Connection, table: &str) -> TransferResult<Fetched> {
        let sql = format!("SELECT * FROM {}", db::quote_ident(table));
        let mut stmt = conn.prepare(&sql)?;

        let columns: Vec<Column> = stmt
            .columns()
            .iter()
            .map(|c| Column {
                name: c.name().to_string(),
                type_tag: c.decl_type().map(TypeTag::parse),
            })
            .collect();
        let mut dataset = Dataset::new(columns);
        let width = dataset.width();

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for (idx, column) in dataset.columns().iter().enumerate() {
                let value = row.get_ref(idx)?;
                cells.push(CellValue::from_value_ref(value, column.type_tag.as_ref()));
            }
            dataset.push_row(cells)?;
        }

        if dataset.is_empty() {
            warn!(table, "ResultSet empty");
            return Ok(Fetched::Empty);
        }

        info!(table, rows = dataset.row_count(), "Data retrieved from table");
        Ok(Fetched::Rows(dataset))
    }

    /// Write `dataset` to sheet `sheet_name` of a new workbook `<workbook>.xlsx`.
    ///
    /// Row 0 holds the column names; data row `i` lands on sheet row `i + 1`.
    pub fn write_to_sheet<P: AsRef<Path>>(
        dataset: &Dataset<CellValue>,
        workbook: P,
        sheet_name: &str,
    ) -> TransferResult<PathBuf> {
        let path = super::workbook_path(workbook);

        let mut book = Workbook::new();
        let worksheet = book.add_worksheet();
        worksheet.set_name(sheet_name)?;

        // Header row
        for (col_idx, name) in dataset.column_names().into_iter().enumerate() {
            worksheet.write_string(0, column_number(col_idx)?, name)?;
        }

        // Data rows (starting at row 1)
        for (data_idx, row) in dataset.rows().iter().enumerate() {
            let sheet_row = row_number(data_idx + 1)?;
            for (col_idx, cell) in row.iter().enumerate() {
                Self::write_cell(worksheet, sheet_row, column_number(col_idx)?, cell)?;
            }
        }

        // Size columns once, after the widest value is known
        worksheet.autofit();

        book.save(&path).inspect_err(|e| {
            error!(path = %path.display(), error = %e, "failed to save workbook");
        })?;

        info!(
            path = %path.display(),
            sheet = sheet_name,
            rows = dataset.row_count(),
            "Workbook written"
        );
        Ok(path)
    }

    /// Fetch `table` and write it to `<workbook>.xlsx`.
    pub fn export_table<P: AsRef<Path>>(
        &self,
        database: &str,
        table: &str,
        workbook: P,
        sheet_name: &str,
    ) -> TransferResult<ExportOutcome> {
        let dataset = match self.fetch(database, table)? {
            Fetched::Rows(dataset) => dataset,
            Fetched::Empty => return Ok(ExportOutcome::NothingToExport),
        };

        let path = Self::write_to_sheet(&dataset, workbook, sheet_name)?;
        Ok(ExportOutcome::Exported(ExportSummary {
            path,
            rows: dataset.row_count(),
            columns: dataset.width(),
        }))
    }

    /// Write a single cell, choosing the sheet type from the value's type
    fn write_cell(
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        value: &CellValue,
    ) -> TransferResult<()> {
        match value {
            CellValue::Int(i) => {
                worksheet.write_number(row, col, *i)?;
            }
            CellValue::Long(i) => {
                worksheet.write_number(row, col, *i as f64)?;
            }
            CellValue::Float(f) => {
                worksheet.write_number(row, col, *f)?;
            }
            CellValue::Double(f) => {
                worksheet.write_number(row, col, *f)?;
            }
            CellValue::Bool(b) => {
                worksheet.write_boolean(row, col, *b)?;
            }
            CellValue::Text(s) => {
                worksheet.write_string(row, col, s)?;
            }
            CellValue::Null => {
                worksheet.write_string(row, col, "")?;
            }
            CellValue::Other(s) => {
                debug!(row, col, "unsupported data type, written as text");
                worksheet.write_string(row, col, s)?;
            }
        }
        Ok(())
    }
}

fn column_number(idx: usize) -> TransferResult<u16> {
    u16::try_from(idx).map_err(|_| TransferError::SheetTooLarge(format!("column {}", idx)))
}

fn row_number(idx: usize) -> TransferResult<u32> {
    u32::try_from(idx).map_err(|_| TransferError::SheetTooLarge(format!("row {}", idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_dataset() -> Dataset<CellValue> {
        let mut dataset = Dataset::new(vec![
            Column::with_type("id", TypeTag::Integer),
            Column::with_type("name", TypeTag::Other("VARCHAR".into())),
            Column::with_type("active", TypeTag::Bit),
        ]);
        dataset
            .push_row(vec![
                CellValue::Int(1),
                CellValue::Text("Alice".into()),
                CellValue::Bool(true),
            ])
            .unwrap();
        dataset
            .push_row(vec![
                CellValue::Int(2),
                CellValue::Text("Bob".into()),
                CellValue::Bool(false),
            ])
            .unwrap();
        dataset
    }

    #[test]
    fn test_write_to_sheet_layout() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("people");

        let path = ExcelExporter::write_to_sheet(&sample_dataset(), &base, "T").unwrap();
        assert_eq!(path, dir.path().join("people.xlsx"));
        assert!(path.exists());

        let mut book: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(book.sheet_names(), vec!["T".to_string()]);
        let range = book.worksheet_range("T").unwrap();

        assert_eq!(range.get_value((0, 0)), Some(&Data::String("id".into())));
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("name".into())));
        assert_eq!(range.get_value((0, 2)), Some(&Data::String("active".into())));

        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(1.0)));
        assert_eq!(range.get_value((1, 1)), Some(&Data::String("Alice".into())));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Bool(true)));
        assert_eq!(range.get_value((2, 0)), Some(&Data::Float(2.0)));
        assert_eq!(range.get_value((2, 2)), Some(&Data::Bool(false)));
    }

    #[test]
    fn test_write_to_sheet_float_and_unsupported_values() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("raw");
        let mut dataset = Dataset::new(vec![
            Column::with_type("ratio", TypeTag::Real),
            Column::new("raw"),
            Column::new("note"),
        ]);
        dataset
            .push_row(vec![
                CellValue::Float(0.5),
                CellValue::Other("ff00".into()),
                CellValue::Text("x".into()),
            ])
            .unwrap();

        let path = ExcelExporter::write_to_sheet(&dataset, &base, "raw").unwrap();

        let mut book: Xlsx<_> = open_workbook(&path).unwrap();
        let range = book.worksheet_range("raw").unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(0.5)));
        assert_eq!(range.get_value((1, 1)), Some(&Data::String("ff00".into())));
        assert_eq!(range.get_value((1, 2)), Some(&Data::String("x".into())));
    }

    #[test]
    fn test_write_to_sheet_invalid_sheet_name() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("bad");

        let result = ExcelExporter::write_to_sheet(&sample_dataset(), &base, "bad[name]");
        assert!(matches!(result, Err(TransferError::WorkbookWrite(_))));
        assert!(!dir.path().join("bad.xlsx").exists());
    }

    #[test]
    fn test_write_to_sheet_unwritable_path() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("missing_dir").join("out");

        let result = ExcelExporter::write_to_sheet(&sample_dataset(), &base, "T");
        assert!(result.is_err());
    }

    #[test]
    fn test_query_table_empty() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();

        let fetched = ExcelExporter::query_table(&conn, "t").unwrap();
        assert_eq!(fetched, Fetched::Empty);
    }

    #[test]
    fn test_query_table_native_types() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (id INTEGER, big BIGINT, ratio REAL, score DOUBLE, ok BIT, note TEXT, raw BLOB);
             INSERT INTO t VALUES (7, 9000000000, 0.5, 2.25, 1, NULL, x'ff00');",
        )
        .unwrap();

        let Fetched::Rows(dataset) = ExcelExporter::query_table(&conn, "t").unwrap() else {
            panic!("Expected rows");
        };
        assert_eq!(
            dataset.column_names(),
            vec!["id", "big", "ratio", "score", "ok", "note", "raw"]
        );
        assert_eq!(
            dataset.rows()[0],
            vec![
                CellValue::Int(7),
                CellValue::Long(9_000_000_000),
                CellValue::Float(0.5),
                CellValue::Double(2.25),
                CellValue::Bool(true),
                CellValue::Null,
                CellValue::Other("ff00".into()),
            ]
        );
    }

    #[test]
    fn test_query_table_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        let result = ExcelExporter::query_table(&conn, "ghost");
        assert!(matches!(result, Err(TransferError::Database(_))));
    }
}
