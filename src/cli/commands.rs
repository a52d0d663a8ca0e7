use crate::config::ConnectionConfig;
use crate::error::TransferResult;
use crate::excel::{self, BatchReport, ExcelExporter, ExcelImporter, ExportOutcome};
use colored::Colorize;
use std::path::PathBuf;

/// Build the connection config from an optional YAML file plus CLI overrides
pub fn load_config(
    config_file: Option<PathBuf>,
    base_uri: Option<String>,
    create: bool,
) -> TransferResult<ConnectionConfig> {
    let mut config = match config_file {
        Some(path) => ConnectionConfig::from_yaml_file(path)?,
        None => ConnectionConfig::default(),
    };
    if let Some(base_uri) = base_uri {
        config = config.with_base_uri(base_uri);
    }
    if create {
        config = config.with_create_if_missing(true);
    }
    Ok(config)
}

/// Execute the export command
pub fn export(
    config: ConnectionConfig,
    database: String,
    table: String,
    workbook: PathBuf,
    sheet: Option<String>,
    verbose: bool,
) -> TransferResult<()> {
    let sheet = sheet.unwrap_or_else(|| table.clone());

    println!("{}", "📤 Table Extractor - Excel Export".bold().green());
    println!("   Table:  {}.{}", database, table);
    println!(
        "   Output: {} [{}]\n",
        excel::workbook_path(&workbook).display(),
        sheet
    );

    if verbose {
        println!("   Connection: {}\n", config.connection_uri(&database).cyan());
    }

    let exporter = ExcelExporter::new(config);
    match exporter.export_table(&database, &table, &workbook, &sheet)? {
        ExportOutcome::Exported(summary) => {
            println!("{}", "✅ Export Complete!".bold().green());
            println!(
                "   {} rows × {} columns → {}\n",
                summary.rows,
                summary.columns,
                summary.path.display()
            );
        }
        ExportOutcome::NothingToExport => {
            println!(
                "{}",
                format!("⚠️  Table '{}' is empty, nothing exported\n", table).yellow()
            );
        }
    }

    Ok(())
}

/// Execute the import command
pub fn import(
    config: ConnectionConfig,
    database: String,
    table: String,
    workbook: PathBuf,
    sheet: Option<String>,
    verbose: bool,
) -> TransferResult<()> {
    let sheet = sheet.unwrap_or_else(|| table.clone());

    println!("{}", "📥 Table Extractor - Excel Import".bold().green());
    println!(
        "   Input: {} [{}]",
        excel::workbook_path(&workbook).display(),
        sheet
    );
    println!("   Table: {}.{}\n", database, table);

    if verbose {
        println!("   Connection: {}\n", config.connection_uri(&database).cyan());
    }

    let importer = ExcelImporter::new(config);
    let summary = importer.import_sheet(&workbook, &sheet, &database, &table)?;

    if summary.rows_read == 0 {
        println!("{}", "⚠️  Sheet has no data rows, nothing imported\n".yellow());
        return Ok(());
    }

    println!("{}", "✅ Import Complete!".bold().green());
    println!(
        "   {} of {} rows inserted\n",
        summary.report.inserted(),
        summary.rows_read
    );

    if let Some(line) = failure_line(&summary.report) {
        println!("{}\n", line.yellow());
    }

    Ok(())
}

/// Warning line listing failed rows (sheet row numbers), if any
fn failure_line(report: &BatchReport) -> Option<String> {
    let failed = report.failed_rows();
    if failed.is_empty() {
        return None;
    }
    // Data row 0 sits on sheet row 2 (1-based, after the header)
    let rows: Vec<String> = failed.iter().map(|idx| (idx + 2).to_string()).collect();
    Some(format!(
        "⚠️  {} row(s) failed to insert (sheet rows {})",
        failed.len(),
        rows.join(", ")
    ))
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
