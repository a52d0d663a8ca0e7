//! Text → typed value conversion, dispatched on the destination column's type tag
//!
//! Every branch parses from text. Blank text in a typed column is NULL, since
//! NULLs are exported as empty cells.

use crate::error::{TransferError, TransferResult};
use crate::types::{SqlValue, TypeTag};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid decimal regex")
    })
}

/// Convert one sheet cell for a column of type `tag`.
pub fn convert(tag: &TypeTag, value: Option<&str>) -> TransferResult<SqlValue> {
    let Some(text) = value else {
        return Ok(SqlValue::Null);
    };

    if tag.is_textual() {
        return Ok(SqlValue::Text(text.to_string()));
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(SqlValue::Null);
    }

    match tag {
        TypeTag::Numeric | TypeTag::Decimal => parse_decimal(tag, trimmed),
        TypeTag::Bit => parse_bool(trimmed),
        TypeTag::TinyInt => parse_integer(tag, trimmed, i8::MIN.into(), i8::MAX.into())
            .map(|v| SqlValue::Int(v as i32)),
        TypeTag::SmallInt => parse_integer(tag, trimmed, i16::MIN.into(), i16::MAX.into())
            .map(|v| SqlValue::Int(v as i32)),
        TypeTag::Integer => parse_integer(tag, trimmed, i32::MIN.into(), i32::MAX.into())
            .map(|v| SqlValue::Int(v as i32)),
        TypeTag::BigInt => parse_integer(tag, trimmed, i64::MIN, i64::MAX).map(SqlValue::Long),
        TypeTag::Real => trimmed
            .parse::<f32>()
            .map(SqlValue::Float)
            .map_err(|e| TransferError::conversion(tag.name(), text, e)),
        TypeTag::Float | TypeTag::DoublePrecision => trimmed
            .parse::<f64>()
            .map(SqlValue::Double)
            .map_err(|e| TransferError::conversion(tag.name(), text, e)),
        TypeTag::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(SqlValue::Date)
            .map_err(|e| TransferError::conversion(tag.name(), text, e)),
        TypeTag::Time => NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
            .map(SqlValue::Time)
            .map_err(|e| TransferError::conversion(tag.name(), text, e)),
        TypeTag::Timestamp => parse_timestamp(trimmed),
        TypeTag::Other(_) => Ok(SqlValue::Text(text.to_string())),
    }
}

/// Convert a whole row against the column types, padding short rows with NULL.
pub fn convert_row(
    types: &[TypeTag],
    row: &[Option<String>],
    row_index: usize,
) -> TransferResult<Vec<SqlValue>> {
    if row.len() > types.len() {
        return Err(TransferError::RowWidth {
            row: row_index,
            expected: types.len(),
            found: row.len(),
        });
    }

    types
        .iter()
        .enumerate()
        .map(|(idx, tag)| {
            let cell = row.get(idx).and_then(|c| c.as_deref());
            convert(tag, cell)
        })
        .collect()
}

fn parse_decimal(tag: &TypeTag, text: &str) -> TransferResult<SqlValue> {
    if !decimal_pattern().is_match(text) {
        return Err(TransferError::conversion(
            tag.name(),
            text,
            "not a decimal number",
        ));
    }
    let canonical = text.strip_prefix('+').unwrap_or(text);
    Ok(SqlValue::Decimal(canonical.to_string()))
}

fn parse_bool(text: &str) -> TransferResult<SqlValue> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(SqlValue::Bool(true)),
        "false" | "0" => Ok(SqlValue::Bool(false)),
        _ => Err(TransferError::conversion(
            "BIT",
            text,
            "expected true/false or 1/0",
        )),
    }
}

/// Parse an integer within `[min, max]`. Integral float text ("42.0") is
/// accepted, since numeric sheet cells may carry a fractional rendering.
fn parse_integer(tag: &TypeTag, text: &str, min: i64, max: i64) -> TransferResult<i64> {
    let value = match text.parse::<i64>() {
        Ok(v) => v,
        Err(int_err) => {
            let float = text
                .parse::<f64>()
                .map_err(|_| TransferError::conversion(tag.name(), text, &int_err))?;
            if !float.is_finite() || float.fract() != 0.0 {
                return Err(TransferError::conversion(
                    tag.name(),
                    text,
                    "not an integral value",
                ));
            }
            if float < i64::MIN as f64 || float >= i64::MAX as f64 {
                return Err(TransferError::conversion(tag.name(), text, "out of range"));
            }
            float as i64
        }
    };

    if value < min || value > max {
        return Err(TransferError::conversion(
            tag.name(),
            text,
            format!("out of range {}..={}", min, max),
        ));
    }
    Ok(value)
}

fn parse_timestamp(text: &str) -> TransferResult<SqlValue> {
    let mut last_err = None;
    for format in TIMESTAMP_FORMATS {
        match NaiveDateTime::parse_from_str(text, format) {
            Ok(ts) => return Ok(SqlValue::Timestamp(ts)),
            Err(e) => last_err = Some(e),
        }
    }
    let reason = last_err.map(|e| e.to_string()).unwrap_or_default();
    Err(TransferError::conversion("TIMESTAMP", text, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ok(tag: TypeTag, text: &str) -> SqlValue {
        convert(&tag, Some(text)).unwrap()
    }

    #[test]
    fn test_null_passes_through_every_tag() {
        for tag in [
            TypeTag::Integer,
            TypeTag::Bit,
            TypeTag::Date,
            TypeTag::Other("VARCHAR".to_string()),
        ] {
            assert_eq!(convert(&tag, None).unwrap(), SqlValue::Null);
        }
    }

    #[test]
    fn test_integer_from_text() {
        assert_eq!(ok(TypeTag::Integer, "123"), SqlValue::Int(123));
        assert_eq!(ok(TypeTag::Integer, " -7 "), SqlValue::Int(-7));
        assert_eq!(ok(TypeTag::Integer, "42.0"), SqlValue::Int(42));
        assert_eq!(ok(TypeTag::SmallInt, "32767"), SqlValue::Int(32767));
        assert_eq!(ok(TypeTag::TinyInt, "-128"), SqlValue::Int(-128));
        assert_eq!(
            ok(TypeTag::BigInt, "9000000000"),
            SqlValue::Long(9_000_000_000)
        );
    }

    #[test]
    fn test_integer_rejects_bad_text() {
        assert!(convert(&TypeTag::Integer, Some("abc")).is_err());
        assert!(convert(&TypeTag::Integer, Some("1.5")).is_err());
        assert!(convert(&TypeTag::Integer, Some("3000000000")).is_err());
        assert!(convert(&TypeTag::TinyInt, Some("128")).is_err());
        assert!(convert(&TypeTag::SmallInt, Some("40000")).is_err());

        let err = convert(&TypeTag::Integer, Some("abc")).unwrap_err();
        match err {
            TransferError::Conversion {
                type_name, value, ..
            } => {
                assert_eq!(type_name, "INTEGER");
                assert_eq!(value, "abc");
            }
            other => panic!("Expected Conversion error, got {:?}", other),
        }
    }

    #[test]
    fn test_bit_from_text() {
        assert_eq!(ok(TypeTag::Bit, "true"), SqlValue::Bool(true));
        assert_eq!(ok(TypeTag::Bit, "FALSE"), SqlValue::Bool(false));
        assert_eq!(ok(TypeTag::Bit, "1"), SqlValue::Bool(true));
        assert_eq!(ok(TypeTag::Bit, "0"), SqlValue::Bool(false));
        assert!(convert(&TypeTag::Bit, Some("yes")).is_err());
    }

    #[test]
    fn test_decimal_keeps_precision() {
        assert_eq!(
            ok(TypeTag::Decimal, "12345678901234567890.123456789"),
            SqlValue::Decimal("12345678901234567890.123456789".to_string())
        );
        assert_eq!(
            ok(TypeTag::Numeric, "+3.50"),
            SqlValue::Decimal("3.50".to_string())
        );
        assert_eq!(
            ok(TypeTag::Numeric, "1e-3"),
            SqlValue::Decimal("1e-3".to_string())
        );
        assert!(convert(&TypeTag::Decimal, Some("12,5")).is_err());
        assert!(convert(&TypeTag::Decimal, Some(".")).is_err());
    }

    #[test]
    fn test_floating_point_from_text() {
        assert_eq!(ok(TypeTag::Real, "1.5"), SqlValue::Float(1.5));
        assert_eq!(ok(TypeTag::Float, "2.25"), SqlValue::Double(2.25));
        assert_eq!(
            ok(TypeTag::DoublePrecision, "-0.125"),
            SqlValue::Double(-0.125)
        );
        assert!(convert(&TypeTag::Float, Some("two")).is_err());
    }

    #[test]
    fn test_temporal_from_text() {
        assert_eq!(
            ok(TypeTag::Date, "2024-02-29"),
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert_eq!(
            ok(TypeTag::Time, "13:45:10"),
            SqlValue::Time(NaiveTime::from_hms_opt(13, 45, 10).unwrap())
        );
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(
            ok(TypeTag::Timestamp, "2024-01-02 03:04:05"),
            SqlValue::Timestamp(expected)
        );
        assert_eq!(
            ok(TypeTag::Timestamp, "2024-01-02T03:04:05"),
            SqlValue::Timestamp(expected)
        );
        assert!(convert(&TypeTag::Date, Some("02/29/2024")).is_err());
        assert!(convert(&TypeTag::Time, Some("25:00:00")).is_err());
        assert!(convert(&TypeTag::Timestamp, Some("yesterday")).is_err());
    }

    #[test]
    fn test_blank_typed_cell_is_null() {
        assert_eq!(ok(TypeTag::Integer, ""), SqlValue::Null);
        assert_eq!(ok(TypeTag::Date, "   "), SqlValue::Null);
    }

    #[test]
    fn test_other_tags_keep_text() {
        let varchar = TypeTag::Other("VARCHAR".to_string());
        assert_eq!(ok(varchar.clone(), "Alice"), SqlValue::Text("Alice".into()));
        assert_eq!(ok(varchar, ""), SqlValue::Text(String::new()));
    }

    #[test]
    fn test_convert_row_pads_and_rejects() {
        let types = vec![
            TypeTag::Integer,
            TypeTag::Other("TEXT".to_string()),
            TypeTag::Bit,
        ];
        let row = vec![Some("1".to_string()), Some("Alice".to_string())];
        assert_eq!(
            convert_row(&types, &row, 0).unwrap(),
            vec![
                SqlValue::Int(1),
                SqlValue::Text("Alice".to_string()),
                SqlValue::Null
            ]
        );

        let wide = vec![Some("1".to_string()); 4];
        assert!(matches!(
            convert_row(&types, &wide, 3),
            Err(TransferError::RowWidth {
                row: 3,
                expected: 3,
                found: 4
            })
        ));
    }
}
