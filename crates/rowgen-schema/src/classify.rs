//! Column classification.
//!
//! Turns one raw catalog column record into a [`ColumnDescriptor`]. Every
//! derived field is a pure function of the raw record plus the
//! whitespace-split comment tags; classification consults no external state.

use crate::error::{SchemaError, SchemaResult};
use crate::model::{ColumnDescriptor, FieldMap, ValueType};
use serde_json::Value;

/// SQL types treated as numeric.
const NUMERIC_TYPES: &[&str] = &[
    "int",
    "smallint",
    "tinyint",
    "mediumint",
    "bigint",
    "float",
    "decimal",
    "double",
];

/// SQL types treated as time-related.
const TIME_TYPES: &[&str] = &["datetime", "date", "time", "timestamp", "year"];

/// SQL types that allow a decimal point.
const DECIMAL_TYPES: &[&str] = &["float", "double", "decimal"];

/// Comment tag forcing the semantic value type to boolean.
pub const TAG_BOOLEAN: &str = "BOOLEAN";

/// Comment tag forcing the computed default to the CURRENT_TIMESTAMP marker.
pub const TAG_CURRENT_TIMESTAMP: &str = "CURRENT_TIMESTAMP";

/// Classify one raw catalog column record.
pub fn classify_column(raw: &FieldMap) -> SchemaResult<ColumnDescriptor> {
    let name = require_str(raw, "COLUMN_NAME")?;
    let data_type = get_str(raw, "DATA_TYPE").to_lowercase();
    let column_type = get_str(raw, "COLUMN_TYPE").to_lowercase();
    let nullable = get_str(raw, "IS_NULLABLE").eq_ignore_ascii_case("YES");
    let raw_default = get_opt_str(raw, "COLUMN_DEFAULT");
    let character_max_length = get_u64(raw, "CHARACTER_MAXIMUM_LENGTH");
    let numeric_precision = get_u64(raw, "NUMERIC_PRECISION");
    let comment = get_str(raw, "COLUMN_COMMENT");
    let extra = get_str(raw, "EXTRA");
    let ordinal = get_u64(raw, "ORDINAL_POSITION").unwrap_or(0) as u32;

    let comment_tags: Vec<String> = comment.split_whitespace().map(str::to_string).collect();
    let auto_increment = extra.contains("auto_increment");
    let numeric = is_numeric_type(&data_type);
    let time_related = is_time_type(&data_type);

    let value_type = if comment_tags.iter().any(|t| t == TAG_BOOLEAN) {
        ValueType::Boolean
    } else {
        match data_type.as_str() {
            "int" | "tinyint" | "smallint" | "mediumint" | "bigint" => ValueType::Int,
            "float" | "decimal" | "double" => ValueType::Float,
            _ => ValueType::String,
        }
    };

    let default_value = compute_default(
        raw_default.as_deref(),
        &comment_tags,
        nullable,
        auto_increment,
        numeric,
    );

    let max_length = compute_max_length(
        character_max_length,
        numeric_precision,
        &data_type,
        &column_type,
        time_related,
    );

    let enum_values = if data_type == "enum" {
        parse_enum_values(&column_type)
    } else {
        Vec::new()
    };

    let date_format = if time_related {
        Some(date_format_for(&data_type).to_string())
    } else {
        None
    };

    Ok(ColumnDescriptor {
        label: label_for(&name),
        name,
        data_type,
        column_type,
        nullable,
        raw_default,
        character_max_length,
        numeric_precision,
        comment,
        extra,
        ordinal,
        comment_tags,
        enum_values,
        value_type,
        auto_increment,
        default_value,
        max_length,
        date_format,
        // Filled in by the assembler from the primary-key catalog query.
        primary_position: None,
    })
}

pub fn is_numeric_type(data_type: &str) -> bool {
    NUMERIC_TYPES.contains(&data_type)
}

pub fn is_time_type(data_type: &str) -> bool {
    TIME_TYPES.contains(&data_type)
}

/// Computed default: an explicit catalog default wins (subject to the
/// CURRENT_TIMESTAMP tag); a missing default on a NOT NULL, non-auto-increment
/// column substitutes `0` for numeric types and the empty string otherwise.
fn compute_default(
    raw_default: Option<&str>,
    tags: &[String],
    nullable: bool,
    auto_increment: bool,
    numeric: bool,
) -> Value {
    if tags.iter().any(|t| t == TAG_CURRENT_TIMESTAMP) {
        return Value::String(TAG_CURRENT_TIMESTAMP.to_string());
    }

    match raw_default {
        Some(d) => Value::String(d.to_string()),
        None => {
            if !nullable && !auto_increment {
                if numeric {
                    Value::from(0)
                } else {
                    Value::String(String::new())
                }
            } else {
                Value::Null
            }
        }
    }
}

/// Computed max length: character length, else numeric precision plus slots
/// for the sign and decimal point, else free-text widths for time types.
fn compute_max_length(
    character_max_length: Option<u64>,
    numeric_precision: Option<u64>,
    data_type: &str,
    column_type: &str,
    time_related: bool,
) -> Option<u64> {
    if let Some(len) = character_max_length.filter(|l| *l > 0) {
        return Some(len);
    }

    if let Some(precision) = numeric_precision.filter(|p| *p > 0) {
        let mut len = precision;
        // Signed fields need a slot for the negative symbol.
        if !column_type.contains("unsigned") {
            len += 1;
        }
        // Types that can carry decimals need a slot for the decimal point.
        if DECIMAL_TYPES.contains(&data_type) {
            len += 1;
        }
        return Some(len);
    }

    if time_related {
        return Some(match data_type {
            "year" => 4,
            // HH:MM:SS aa
            "time" => 11,
            // Dates are entered in many free-text formats; 50 covers them.
            _ => 50,
        });
    }

    None
}

/// Parse the member list out of an `enum(...)` type string.
fn parse_enum_values(column_type: &str) -> Vec<String> {
    let Some(inner) = column_type
        .strip_prefix("enum(")
        .and_then(|s| s.strip_suffix(')'))
    else {
        return Vec::new();
    };

    inner
        .split(',')
        .map(|part| part.trim().trim_matches('\'').to_string())
        .collect()
}

fn date_format_for(data_type: &str) -> &'static str {
    match data_type {
        "date" => "%Y-%m-%d",
        "time" => "%H:%M:%S",
        "year" => "%Y",
        _ => "%Y-%m-%d %H:%M:%S",
    }
}

fn label_for(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

// ==================== raw field access ====================

pub(crate) fn require_str(raw: &FieldMap, field: &str) -> SchemaResult<String> {
    match raw.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(SchemaError::decode(
            field,
            format!("expected string, got {other}"),
        )),
        None => Err(SchemaError::decode(field, "missing field")),
    }
}

pub(crate) fn get_str(raw: &FieldMap, field: &str) -> String {
    get_opt_str(raw, field).unwrap_or_default()
}

pub(crate) fn get_opt_str(raw: &FieldMap, field: &str) -> Option<String> {
    match raw.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn get_u64(raw: &FieldMap, field: &str) -> Option<u64> {
    match raw.get(field) {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(fields: &[(&str, Value)]) -> FieldMap {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn base_column(name: &str, data_type: &str) -> FieldMap {
        raw(&[
            ("COLUMN_NAME", json!(name)),
            ("DATA_TYPE", json!(data_type)),
            ("COLUMN_TYPE", json!(data_type)),
            ("IS_NULLABLE", json!("NO")),
            ("ORDINAL_POSITION", json!(1)),
        ])
    }

    #[test]
    fn signed_decimal_max_length_adds_sign_and_point() {
        let mut c = base_column("price", "decimal");
        c.insert("COLUMN_TYPE".into(), json!("decimal(5,2)"));
        c.insert("NUMERIC_PRECISION".into(), json!(5));
        let col = classify_column(&c).unwrap();
        assert_eq!(col.max_length, Some(7));
    }

    #[test]
    fn unsigned_int_max_length_has_no_sign_slot() {
        let mut c = base_column("count", "int");
        c.insert("COLUMN_TYPE".into(), json!("int(10) unsigned"));
        c.insert("NUMERIC_PRECISION".into(), json!(10));
        let col = classify_column(&c).unwrap();
        assert_eq!(col.max_length, Some(10));
    }

    #[test]
    fn character_length_wins_over_precision() {
        let mut c = base_column("title", "varchar");
        c.insert("CHARACTER_MAXIMUM_LENGTH".into(), json!(255));
        let col = classify_column(&c).unwrap();
        assert_eq!(col.max_length, Some(255));
    }

    #[test]
    fn time_related_max_lengths() {
        let col = classify_column(&base_column("created", "datetime")).unwrap();
        assert_eq!(col.max_length, Some(50));
        let col = classify_column(&base_column("born", "year")).unwrap();
        assert_eq!(col.max_length, Some(4));
        let col = classify_column(&base_column("at", "time")).unwrap();
        assert_eq!(col.max_length, Some(11));
    }

    #[test]
    fn not_null_numeric_defaults_to_zero() {
        let col = classify_column(&base_column("count", "int")).unwrap();
        assert_eq!(col.default_value, json!(0));
    }

    #[test]
    fn not_null_string_defaults_to_empty() {
        let col = classify_column(&base_column("title", "varchar")).unwrap();
        assert_eq!(col.default_value, json!(""));
    }

    #[test]
    fn nullable_column_keeps_null_default() {
        let mut c = base_column("note", "varchar");
        c.insert("IS_NULLABLE".into(), json!("YES"));
        let col = classify_column(&c).unwrap();
        assert_eq!(col.default_value, Value::Null);
    }

    #[test]
    fn auto_increment_keeps_null_default() {
        let mut c = base_column("id", "int");
        c.insert("EXTRA".into(), json!("auto_increment"));
        let col = classify_column(&c).unwrap();
        assert!(col.auto_increment);
        assert_eq!(col.default_value, Value::Null);
    }

    #[test]
    fn boolean_tag_overrides_value_type() {
        let mut c = base_column("active", "tinyint");
        c.insert("COLUMN_COMMENT".into(), json!("BOOLEAN soft-delete flag"));
        let col = classify_column(&c).unwrap();
        assert_eq!(col.value_type, ValueType::Boolean);
        assert_eq!(
            col.comment_tags,
            vec!["BOOLEAN", "soft-delete", "flag"]
        );
    }

    #[test]
    fn current_timestamp_tag_overrides_default() {
        let mut c = base_column("updated", "datetime");
        c.insert("COLUMN_COMMENT".into(), json!("CURRENT_TIMESTAMP"));
        let col = classify_column(&c).unwrap();
        assert_eq!(col.default_value, json!("CURRENT_TIMESTAMP"));
    }

    #[test]
    fn explicit_default_is_kept() {
        let mut c = base_column("status", "varchar");
        c.insert("COLUMN_DEFAULT".into(), json!("new"));
        let col = classify_column(&c).unwrap();
        assert_eq!(col.default_value, json!("new"));
    }

    #[test]
    fn enum_values_are_parsed() {
        let mut c = base_column("state", "enum");
        c.insert("COLUMN_TYPE".into(), json!("enum('draft','live','dead')"));
        let col = classify_column(&c).unwrap();
        assert_eq!(col.enum_values, vec!["draft", "live", "dead"]);
    }

    #[test]
    fn value_types_by_sql_type() {
        assert_eq!(
            classify_column(&base_column("a", "bigint")).unwrap().value_type,
            ValueType::Int
        );
        assert_eq!(
            classify_column(&base_column("a", "double")).unwrap().value_type,
            ValueType::Float
        );
        assert_eq!(
            classify_column(&base_column("a", "text")).unwrap().value_type,
            ValueType::String
        );
    }

    #[test]
    fn label_replaces_underscores() {
        let col = classify_column(&base_column("first_name", "varchar")).unwrap();
        assert_eq!(col.label, "First name");
    }

    #[test]
    fn date_formats_per_type() {
        let col = classify_column(&base_column("d", "date")).unwrap();
        assert_eq!(col.date_format.as_deref(), Some("%Y-%m-%d"));
        let col = classify_column(&base_column("v", "varchar")).unwrap();
        assert_eq!(col.date_format, None);
    }

    #[test]
    fn missing_name_is_a_decode_error() {
        let c = raw(&[("DATA_TYPE", json!("int"))]);
        assert!(classify_column(&c).is_err());
    }
}
