use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use table_extractor::cli;

#[derive(Parser)]
#[command(name = "tablex")]
#[command(about = "Move tables between a database and Excel (.xlsx) sheets.")]
#[command(long_about = "Table Extractor - database tables ↔ Excel sheets

COMMANDS:
  export   - Table to a sheet of a new <workbook>.xlsx
  import   - Sheet rows into an existing table

DATABASES:
  A database name selects <base-uri><name>.db (default base: file:./).
  Override with --base-uri, TABLEX_BASE_URI or a YAML --config file:

    base_uri: \"file:/srv/data/\"
    busy_timeout_ms: 5000
    create_if_missing: false

EXAMPLES:
  tablex export shop orders --workbook orders            # shop.db → orders.xlsx
  tablex import shop orders --workbook orders --sheet Q1  # orders.xlsx[Q1] → shop.db

Set RUST_LOG=table_extractor=debug for detailed logs.")]
#[command(version)]
struct Cli {
    /// YAML connection config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// URI prefix the database name is appended to
    #[arg(long, global = true, env = "TABLEX_BASE_URI")]
    base_uri: Option<String>,

    /// Create the database file if it does not exist
    #[arg(long, global = true)]
    create: bool,

    /// Show verbose output and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Export a database table to an Excel sheet.

Runs SELECT * against the table and writes a new workbook <workbook>.xlsx:
row 1 holds the column names, every record follows on its own row.
Integer, floating point and boolean values become numeric/boolean cells,
text stays text, NULL becomes an empty cell.

An empty table writes nothing.")]
    /// Export a database table to an Excel sheet
    Export {
        /// Database name
        database: String,

        /// Table to export
        table: String,

        /// Workbook file name without the .xlsx extension
        #[arg(short, long)]
        workbook: PathBuf,

        /// Sheet name (defaults to the table name)
        #[arg(short, long)]
        sheet: Option<String>,
    },

    #[command(long_about = "Import Excel sheet rows into a database table.

Reads <workbook>.xlsx, skips the header row and converts every cell to the
declared type of the matching table column (by position), then inserts all
rows as one batch. Rows the database rejects are reported and skipped.

NOTE: column types are probed from the table's existing rows, so the
target table must not be empty.")]
    /// Import Excel sheet rows into a database table
    Import {
        /// Database name
        database: String,

        /// Destination table
        table: String,

        /// Workbook file name without the .xlsx extension
        #[arg(short, long)]
        workbook: PathBuf,

        /// Sheet name (defaults to the table name)
        #[arg(short, long)]
        sheet: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "table_extractor=debug"
    } else {
        "table_extractor=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli::load_config(cli.config, cli.base_uri, cli.create)
        .context("Failed to load connection config")?;

    match cli.command {
        Commands::Export {
            database,
            table,
            workbook,
            sheet,
        } => cli::export(config, database, table, workbook, sheet, cli.verbose)
            .context("Export failed"),

        Commands::Import {
            database,
            table,
            workbook,
            sheet,
        } => cli::import(config, database, table, workbook, sheet, cli.verbose)
            .context("Import failed"),
    }
}
