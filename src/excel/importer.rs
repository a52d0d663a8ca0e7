//! Excel importer implementation - Excel (.xlsx) → database table

use crate::config::ConnectionConfig;
use crate::db;
use crate::error::{TransferError, TransferResult};
use crate::excel::convert::convert_row;
use crate::types::{SheetRow, SqlValue, TypeTag};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use rusqlite::{params_from_iter, Connection};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Outcome of inserting one row of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Statement ran; affected row count
    Inserted(usize),
    Failed(String),
}

impl RowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Inserted(n) if *n > 0)
    }
}

/// Per-row results of a batch insert, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<RowOutcome>,
}

impl BatchReport {
    pub fn inserted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.inserted()
    }

    /// Indices of the rows that did not insert
    pub fn failed_rows(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| !o.is_success())
            .map(|(idx, _)| idx)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub report: BatchReport,
}

/// Excel importer for loading sheet rows into database tables
pub struct ExcelImporter {
    config: ConnectionConfig,
}

impl ExcelImporter {
    /// Create a new Excel importer
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    /// Read every data row of `sheet_name` in `<workbook>.xlsx` as text.
    ///
    /// The first row present in the sheet is the header and is skipped.
    /// Rows with no populated cell are dropped, and each row ends at its own
    /// last populated column; gaps before that read as `""`.
    pub fn read_sheet<P: AsRef<Path>>(
        workbook: P,
        sheet_name: &str,
    ) -> TransferResult<Vec<SheetRow>> {
        let path = super::workbook_path(workbook);

        let mut book = open_workbook::<Xlsx<_>, _>(&path).inspect_err(|e| {
            error!(path = %path.display(), error = %e, "failed to open workbook");
        })?;

        if !book.sheet_names().iter().any(|name| name == sheet_name) {
            error!(path = %path.display(), sheet = sheet_name, "sheet not found");
            return Err(TransferError::SheetNotFound {
                workbook: path.display().to_string(),
                sheet: sheet_name.to_string(),
            });
        }

        let range = book.worksheet_range(sheet_name).inspect_err(|e| {
            error!(sheet = sheet_name, error = %e, "failed to read sheet");
        })?;

        let rows = data_rows(&range);
        if rows.is_empty() {
            warn!(sheet = sheet_name, "no data rows in sheet");
        } else {
            info!(sheet = sheet_name, rows = rows.len(), "Data retrieved from excel");
        }
        Ok(rows)
    }

    /// Declared type of every column of `table`, in column order.
    ///
    /// Types are probed through `SELECT *`, which needs at least one row:
    /// an empty table is `TransferError::EmptyTarget`.
    pub fn resolve_column_types(
        conn: &Connection,
        table: &str,
    ) -> TransferResult<Vec<TypeTag>> {
        let sql = format!("SELECT * FROM {}", db::quote_ident(table));
        let mut stmt = conn.prepare(&sql)?;

        let types: Vec<TypeTag> = stmt
            .columns()
            .iter()
            .map(|c| TypeTag::parse(c.decl_type().unwrap_or_default()))
            .collect();

        let mut rows = stmt.query([])?;
        if rows.next()?.is_none() {
            warn!(table, "ResultSet empty");
            return Err(TransferError::EmptyTarget(table.to_string()));
        }

        debug!(table, ?types, "column types resolved");
        Ok(types)
    }

    /// Convert `rows` to the column types of `table` and insert them as one batch.
    ///
    /// The connection is closed before returning, whatever the outcome.
    pub fn insert(
        &self,
        rows: &[SheetRow],
        database: &str,
        table: &str,
    ) -> TransferResult<BatchReport> {
        let mut conn = db::connect(&self.config, database).inspect_err(|e| {
            error!(database, error = %e, "connection failed");
        })?;

        let result = Self::insert_rows(&mut conn, rows, table);
        db::close(conn, database);

        if let Err(e) = &result {
            error!(table, error = %e, "insert failed");
        }
        result
    }

    /// Batch insert on an open connection.
    ///
    /// Every row is converted before anything is written, so a malformed
    /// value aborts the whole batch. A row the database rejects is recorded
    /// as failed and the rest of the batch still runs.
    pub fn insert_rows(
        conn: &mut Connection,
        rows: &[SheetRow],
        table: &str,
    ) -> TransferResult<BatchReport> {
        if rows.is_empty() {
            info!(table, "nothing to insert");
            return Ok(BatchReport::default());
        }

        let types = Self::resolve_column_types(conn, table)?;

        let params: Vec<Vec<SqlValue>> = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| convert_row(&types, row, idx))
            .collect::<TransferResult<_>>()?;

        let sql = insert_statement(table, types.len());
        let tx = conn.transaction()?;
        let mut report = BatchReport::default();
        {
            let mut stmt = tx.prepare(&sql)?;
            for (idx, values) in params.iter().enumerate() {
                let outcome = match stmt.execute(params_from_iter(values.iter())) {
                    Ok(count) => RowOutcome::Inserted(count),
                    Err(e) => RowOutcome::Failed(e.to_string()),
                };
                if !outcome.is_success() {
                    warn!(table, row = idx, ?outcome, "One or more inserts failed");
                }
                report.outcomes.push(outcome);
            }
        }
        tx.commit()?;

        info!(
            table,
            inserted = report.inserted(),
            failed = report.failed(),
            "Batch insert finished"
        );
        Ok(report)
    }

    /// Read `sheet_name` from `<workbook>.xlsx` and insert its rows into `table`.
    pub fn import_sheet<P: AsRef<Path>>(
        &self,
        workbook: P,
        sheet_name: &str,
        database: &str,
        table: &str,
    ) -> TransferResult<ImportSummary> {
        let rows = Self::read_sheet(workbook, sheet_name)?;
        let report = self.insert(&rows, database, table)?;
        Ok(ImportSummary {
            rows_read: rows.len(),
            report,
        })
    }
}

/// Data rows of a sheet range, header excluded.
///
/// Rows are keyed by their position in the sheet, so rows that hold no
/// populated cell never appear. Columns are absolute: a range that starts
/// past column A still places each cell at its sheet column.
fn data_rows(range: &Range<Data>) -> Vec<SheetRow> {
    let first_col = range.start().map_or(0, |(_, col)| col as usize);

    let mut present: BTreeMap<usize, Vec<(usize, &Data)>> = BTreeMap::new();
    for (row, col, value) in range.used_cells() {
        present.entry(row).or_default().push((first_col + col, value));
    }

    present
        .into_values()
        .skip(1)
        .map(|cells| {
            let width = cells.iter().map(|(col, _)| col + 1).max().unwrap_or(0);
            let mut row: SheetRow = vec![Some(String::new()); width];
            for (col, value) in cells {
                row[col] = cell_text(Some(value));
            }
            row
        })
        .collect()
}

/// Text form of a sheet cell
fn cell_text(cell: Option<&Data>) -> Option<String> {
    match cell {
        None | Some(Data::Empty) => Some(String::new()),
        Some(Data::Int(i)) => Some(i.to_string()),
        Some(Data::Float(f)) => Some(number_text(*f)),
        Some(Data::Bool(b)) => Some(b.to_string()),
        Some(Data::String(s)) => Some(s.clone()),
        // Dates are numeric cells: keep the serial number
        Some(Data::DateTime(dt)) => Some(dt.as_f64().to_string()),
        Some(Data::DateTimeIso(s)) | Some(Data::DurationIso(s)) => Some(s.clone()),
        Some(_) => None,
    }
}

/// Shortest round-trip digits, switching to `1E+21` / `1E-7` exponent form
/// for magnitudes the spreadsheet engine also shows in scientific notation.
fn number_text(f: f64) -> String {
    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-6..1e21).contains(&magnitude) {
        let text = format!("{:E}", f);
        return match text.split_once('E') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}E+{exp}"),
            _ => text,
        };
    }
    f.to_string()
}

/// `INSERT INTO table VALUES (?, ?, ...)` with one placeholder per column
fn insert_statement(table: &str, width: usize) -> String {
    let placeholders = vec!["?"; width].join(", ");
    format!("INSERT INTO {} VALUES ({})", db::quote_ident(table), placeholders)
}
