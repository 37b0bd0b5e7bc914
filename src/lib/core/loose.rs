//! Helpers for the loosely typed values that arrive in request bodies and
//! query strings. Clients send years as `2010` or `"2010"`, ratings as `8.8`
//! or `"8.8"`, and an empty or zero value means "not provided".

use serde_json::Value;

/// Whether a request value counts as provided: `null`, `false`, `0`, NaN and
/// the empty string do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads an optional field, treating falsy values as absent.
pub fn provided(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| is_truthy(v))
}

/// Parses the leading integer of `input`, ignoring leading whitespace and any
/// trailing garbage (`"2008abc"` is 2008). Returns `None` when no digits lead.
pub fn parse_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parses the longest leading decimal literal of `input` (`"8.5/10"` is 8.5).
pub fn parse_float(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let candidate_len = trimmed
        .bytes()
        .take_while(|b| b.is_ascii_digit() || matches!(*b, b'+' | b'-' | b'.' | b'e' | b'E'))
        .count();
    (1..=candidate_len)
        .rev()
        .find_map(|len| trimmed[..len].parse::<f64>().ok())
        .filter(|f| f.is_finite())
}

/// Integer reading of a JSON value: numbers are truncated, strings parsed.
pub fn int_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int(s),
        _ => None,
    }
}

pub fn float_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float(s),
        _ => None,
    }
}

/// Text reading of a JSON value; strings are taken verbatim.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values_are_not_provided() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&v), "{v} should be falsy");
        }
        for v in [json!(1), json!("0"), json!([]), json!({}), json!(true)] {
            assert!(is_truthy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn parse_int_reads_leading_digits() {
        assert_eq!(parse_int("2008"), Some(2008));
        assert_eq!(parse_int("  2008abc"), Some(2008));
        assert_eq!(parse_int("-12"), Some(-12));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
    }

    #[test]
    fn parse_float_reads_leading_literal() {
        assert_eq!(parse_float("8.5"), Some(8.5));
        assert_eq!(parse_float("8.5/10"), Some(8.5));
        assert_eq!(parse_float("1e"), Some(1.0));
        assert_eq!(parse_float("n/a"), None);
    }

    #[test]
    fn int_of_accepts_numbers_and_strings() {
        assert_eq!(int_of(&json!(2010)), Some(2010));
        assert_eq!(int_of(&json!(2010.7)), Some(2010));
        assert_eq!(int_of(&json!("2010")), Some(2010));
        assert_eq!(int_of(&json!(true)), None);
    }
}
