//! Table Extractor - move tables between a database and Excel sheets
//!
//! This library exports a database table to a sheet of a new `.xlsx`
//! workbook and imports sheet rows back into a table.
//!
//! # Features
//!
//! - Export: `SELECT *` result → header row plus one sheet row per record,
//!   with numeric, boolean and text cells chosen from the database values
//! - Import: every sheet cell is read as text, then converted to the declared
//!   type of the destination column and inserted as one batch
//! - Per-row batch outcomes, explicit empty-result outcomes
//!
//! # Example
//!
//! ```no_run
//! use table_extractor::config::ConnectionConfig;
//! use table_extractor::excel::{ExcelExporter, ExcelImporter, ExportOutcome};
//!
//! let config = ConnectionConfig::default();
//!
//! let exporter = ExcelExporter::new(config.clone());
//! if let ExportOutcome::Exported(summary) = exporter.export_table("shop", "orders", "orders", "orders")? {
//!     println!("Wrote {} rows to {}", summary.rows, summary.path.display());
//! }
//!
//! let importer = ExcelImporter::new(config);
//! let summary = importer.import_sheet("orders", "orders", "archive", "orders")?;
//! println!("Inserted {} of {}", summary.report.inserted(), summary.rows_read);
//! # Ok::<(), table_extractor::error::TransferError>(())
//! ```

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod excel;
pub mod types;

// Re-export commonly used types
pub use config::ConnectionConfig;
pub use error::{TransferError, TransferResult};
pub use types::{CellValue, Column, Dataset, SheetRow, SqlValue, TypeTag};
