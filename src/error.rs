use thiserror::Error;

pub type TransferResult<T> = Result<T, TransferError>;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Failed to connect to {uri}: {source}")]
    Connection {
        uri: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to write workbook: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to read workbook: {0}")]
    WorkbookRead(#[from] calamine::XlsxError),

    #[error("Sheet '{sheet}' not found in {workbook}")]
    SheetNotFound { workbook: String, sheet: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Table '{0}' is empty, column types cannot be probed")]
    EmptyTarget(String),

    #[error("Cannot convert '{value}' to {type_name}: {reason}")]
    Conversion {
        type_name: String,
        value: String,
        reason: String,
    },

    #[error("Row {row} has {found} cells, table has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Sheet too large: {0}")]
    SheetTooLarge(String),
}

impl TransferError {
    /// Build a conversion error for a value that does not parse as `type_name`.
    pub fn conversion(
        type_name: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        TransferError::Conversion {
            type_name: type_name.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}
