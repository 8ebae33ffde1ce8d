//! Field value comparison semantics.
//!
//! Rowset filtering and grouping deliberately use loose, type-coercing
//! equality: `"5"` matches `5`, `1` matches `true`. Generated application
//! code routinely round-trips values through request parameters and loses
//! their native types on the way, and the legacy behavior this runtime
//! replaces compared the same way. Strict comparison is always available via
//! `Value`'s own `PartialEq`.

use serde_json::Value;

/// Loose, type-coercing equality between two field values.
///
/// - `Null` equals only `Null`
/// - numbers compare numerically (`5 == 5.0`)
/// - a numeric string equals the number it parses to (`"5" == 5`)
/// - booleans equal `0`/`1` and the strings `"true"`/`"false"`/`"1"`/`"0"`
/// - everything else falls back to strict equality
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(x), Value::Number(y)) => as_f64(x) == as_f64(y),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.trim().parse::<f64>().is_ok_and(|parsed| parsed == as_f64(n))
        }
        (Value::Bool(b), Value::Number(n)) | (Value::Number(n), Value::Bool(b)) => {
            as_f64(n) == if *b { 1.0 } else { 0.0 }
        }
        (Value::Bool(b), Value::String(s)) | (Value::String(s), Value::Bool(b)) => {
            matches!(
                (b, s.trim()),
                (true, "true") | (true, "1") | (false, "false") | (false, "0")
            )
        }
        _ => a == b,
    }
}

/// Canonical grouping key for a field value.
///
/// Values that are loosely equal map to the same key (`5`, `5.0` and `"5"`
/// all group under `"5"`). Null groups under the empty key.
pub fn group_key(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Number(n) => canonical_number(as_f64(n)),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => canonical_number(parsed),
            _ => s.clone(),
        },
        other => other.to_string(),
    }
}

fn as_f64(n: &serde_json::Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

fn canonical_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_string_matches_number() {
        assert!(loose_eq(&json!("5"), &json!(5)));
        assert!(loose_eq(&json!(5), &json!("5")));
        assert!(loose_eq(&json!("5.0"), &json!(5)));
        assert!(!loose_eq(&json!("5x"), &json!(5)));
    }

    #[test]
    fn int_and_float_compare_numerically() {
        assert!(loose_eq(&json!(5), &json!(5.0)));
        assert!(!loose_eq(&json!(5), &json!(5.5)));
    }

    #[test]
    fn bool_coercions() {
        assert!(loose_eq(&json!(true), &json!(1)));
        assert!(loose_eq(&json!(false), &json!(0)));
        assert!(loose_eq(&json!(true), &json!("1")));
        assert!(!loose_eq(&json!(true), &json!(2)));
    }

    #[test]
    fn null_only_equals_null() {
        assert!(loose_eq(&Value::Null, &Value::Null));
        assert!(!loose_eq(&Value::Null, &json!(0)));
        assert!(!loose_eq(&Value::Null, &json!("")));
    }

    #[test]
    fn strict_strings_still_compare() {
        assert!(loose_eq(&json!("abc"), &json!("abc")));
        assert!(!loose_eq(&json!("abc"), &json!("abd")));
    }

    #[test]
    fn group_keys_follow_loose_equality() {
        assert_eq!(group_key(&json!(5)), group_key(&json!("5")));
        assert_eq!(group_key(&json!(5)), group_key(&json!(5.0)));
        assert_eq!(group_key(&json!(true)), "1");
        assert_eq!(group_key(&Value::Null), "");
        assert_eq!(group_key(&json!("draft")), "draft");
    }
}
