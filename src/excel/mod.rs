//! Excel import/export module
//!
//! This module provides bidirectional database ↔ Excel transfer:
//! - Export: table → sheet (.xlsx), cell types follow the database values
//! - Import: sheet (.xlsx) → table, text cells converted to the column types

pub mod convert;
mod exporter;
mod importer;

pub use convert::convert;
pub use exporter::{ExcelExporter, ExportOutcome, ExportSummary, Fetched};
pub use importer::{BatchReport, ExcelImporter, ImportSummary, RowOutcome};

use std::path::{Path, PathBuf};

pub const WORKBOOK_EXTENSION: &str = "xlsx";

/// `<base>.xlsx`. The base may include directories.
pub fn workbook_path<P: AsRef<Path>>(base: P) -> PathBuf {
    let mut name = base.as_ref().as_os_str().to_os_string();
    name.push(".");
    name.push(WORKBOOK_EXTENSION);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workbook_path() {
        assert_eq!(workbook_path("report"), PathBuf::from("report.xlsx"));
        assert_eq!(
            workbook_path(Path::new("out").join("q1.sales")),
            Path::new("out").join("q1.sales.xlsx")
        );
    }
}
