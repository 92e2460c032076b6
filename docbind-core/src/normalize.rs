//! Parameter normalization for field mappings.
//!
//! Field mappings are normalized before they are stored or used as finder keys. Two
//! independent, total transformations are applied:
//!
//! - **Key sanitization**: every character of a key that is not an ASCII letter or digit is
//!   replaced with an underscore, so `"o*p#t>i_o@n)s"` becomes `"o_p_t_i_o_n_s"`.
//! - **Type coercion**: calendar dates (with or without time of day) become
//!   [`Value::Timestamp`] and decimals become [`Value::Float`]. Nested arrays and maps are
//!   coerced recursively; everything else passes through unchanged.
//!
//! Both transformations are idempotent, so normalizing an already normalized mapping is a
//! no-op.

use chrono::NaiveTime;
use rust_decimal::prelude::ToPrimitive;

use crate::value::{Fields, Value};

/// Normalizes a field mapping, preserving key order.
///
/// When two keys collapse onto the same sanitized key the later value wins and keeps the
/// position of the first occurrence.
pub fn normalize(fields: Fields) -> Fields {
    fields
        .into_iter()
        .map(|(key, value)| (sanitize_key(&key), coerce(value)))
        .collect()
}

/// Replaces every non-alphanumeric character of `key` with an underscore.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Coerces a single value into its storage representation.
pub fn coerce(value: Value) -> Value {
    match value {
        Value::Date(date) => Value::Timestamp(date.and_time(NaiveTime::MIN).and_utc()),
        Value::DateTime(datetime) => Value::Timestamp(datetime.and_utc()),
        Value::Decimal(decimal) => Value::Float(decimal.to_f64().unwrap_or(f64::NAN)),
        Value::Array(values) => Value::Array(values.into_iter().map(coerce).collect()),
        Value::Map(fields) => Value::Map(normalize(fields)),
        other => other,
    }
}
