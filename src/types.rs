use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use std::fmt;

use crate::error::{TransferError, TransferResult};

//==============================================================================
// Type tags
//==============================================================================

/// SQL column type name used to select a conversion rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Numeric,
    Decimal,
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    DoublePrecision,
    Date,
    Time,
    Timestamp,
    /// Any other declared type (VARCHAR, TEXT, ...), kept normalized
    Other(String),
}

impl TypeTag {
    /// Parse a declared column type.
    ///
    /// Case and whitespace are ignored and a `(size)` suffix is dropped, so
    /// `double precision` and `VARCHAR(20)` both resolve.
    pub fn parse(declared: &str) -> Self {
        let base = match declared.find('(') {
            Some(idx) => &declared[..idx],
            None => declared,
        };
        let name: String = base
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        match name.as_str() {
            "NUMERIC" => TypeTag::Numeric,
            "DECIMAL" | "DEC" => TypeTag::Decimal,
            "BIT" | "BOOLEAN" | "BOOL" => TypeTag::Bit,
            "TINYINT" => TypeTag::TinyInt,
            "SMALLINT" => TypeTag::SmallInt,
            "INTEGER" | "INT" => TypeTag::Integer,
            "BIGINT" => TypeTag::BigInt,
            "REAL" => TypeTag::Real,
            "FLOAT" => TypeTag::Float,
            "DOUBLEPRECISION" | "DOUBLE" => TypeTag::DoublePrecision,
            "DATE" => TypeTag::Date,
            "TIME" => TypeTag::Time,
            "TIMESTAMP" | "DATETIME" => TypeTag::Timestamp,
            _ => TypeTag::Other(name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TypeTag::Numeric => "NUMERIC",
            TypeTag::Decimal => "DECIMAL",
            TypeTag::Bit => "BIT",
            TypeTag::TinyInt => "TINYINT",
            TypeTag::SmallInt => "SMALLINT",
            TypeTag::Integer => "INTEGER",
            TypeTag::BigInt => "BIGINT",
            TypeTag::Real => "REAL",
            TypeTag::Float => "FLOAT",
            TypeTag::DoublePrecision => "DOUBLEPRECISION",
            TypeTag::Date => "DATE",
            TypeTag::Time => "TIME",
            TypeTag::Timestamp => "TIMESTAMP",
            TypeTag::Other(name) => name,
        }
    }

    /// True for tags whose values are stored as plain text
    pub fn is_textual(&self) -> bool {
        matches!(self, TypeTag::Other(_))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//==============================================================================
// Columns and datasets
//==============================================================================

/// Column descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Declared type, when the source exposes one
    pub type_tag: Option<TypeTag>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: None,
        }
    }

    pub fn with_type(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag: Some(type_tag),
        }
    }
}

/// A row read from a sheet: one text cell per column, `None` for unreadable cells
pub type SheetRow = Vec<Option<String>>;

/// Column descriptors plus rows, every row exactly as wide as the column list
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<T> {
    columns: Vec<Column>,
    rows: Vec<Vec<T>>,
}

impl<T> Dataset<T> {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Fails when the row width differs from the column count.
    pub fn push_row(&mut self, row: Vec<T>) -> TransferResult<()> {
        if row.len() != self.columns.len() {
            return Err(TransferError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//==============================================================================
// Cell values (database → sheet)
//==============================================================================

/// A database value as fetched, typed the way the driver would hand it out
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Text(String),
    /// A value with no spreadsheet counterpart, kept in its text form
    Other(String),
}

impl CellValue {
    /// Map a raw SQLite value, refined by the column's declared type.
    pub fn from_value_ref(value: ValueRef<'_>, declared: Option<&TypeTag>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(i) => match declared {
                Some(TypeTag::Bit) => CellValue::Bool(i != 0),
                Some(TypeTag::BigInt) => CellValue::Long(i),
                _ => match i32::try_from(i) {
                    Ok(small) => CellValue::Int(small),
                    Err(_) => CellValue::Long(i),
                },
            },
            ValueRef::Real(f) => match declared {
                Some(TypeTag::Real) => CellValue::Float(f as f32),
                _ => CellValue::Double(f),
            },
            ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => CellValue::Other(
                bytes.iter().map(|b| format!("{:02x}", b)).collect(),
            ),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Long(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Double(v) => write!(f, "{}", v),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Text(s) | CellValue::Other(s) => f.write_str(s),
        }
    }
}

//==============================================================================
// SQL values (sheet → database)
//==============================================================================

/// A cell converted for insertion into a typed column
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    /// Validated decimal literal, kept as text to preserve precision
    Decimal(String),
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    Timestamp(chrono::NaiveDateTime),
    Text(String),
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlValue::Null => Ok(ToSqlOutput::Owned(Value::Null)),
            SqlValue::Decimal(s) | SqlValue::Text(s) => Ok(ToSqlOutput::from(s.as_str())),
            SqlValue::Bool(b) => Ok(ToSqlOutput::from(*b)),
            SqlValue::Int(i) => Ok(ToSqlOutput::from(*i)),
            SqlValue::Long(i) => Ok(ToSqlOutput::from(*i)),
            SqlValue::Float(v) => Ok(ToSqlOutput::from(f64::from(*v))),
            SqlValue::Double(v) => Ok(ToSqlOutput::from(*v)),
            SqlValue::Date(d) => d.to_sql(),
            SqlValue::Time(t) => t.to_sql(),
            SqlValue::Timestamp(ts) => ts.to_sql(),
        }
    }
}
