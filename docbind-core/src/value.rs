//! Tagged field values and ordered field mappings.
//!
//! Resources hold their data as a [`Fields`] mapping of attribute name to [`Value`]. Values
//! cover everything callers may hand in (including calendar dates and arbitrary-precision
//! decimals), while the conversion into BSON only ever emits storage-safe kinds: calendar
//! values become timestamps and decimals become doubles, exactly as the
//! [`normalize`](crate::normalize) module describes.

use bson::{Bson, Document, oid::ObjectId};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::normalize::coerce;

/// Ordered mapping of field name to value. Insertion order is declaration order.
pub type Fields = IndexMap<String, Value>;

/// A single field value.
///
/// `Date`, `DateTime` and `Decimal` are accepted from callers but never stored as such;
/// normalization turns them into [`Value::Timestamp`] and [`Value::Float`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A calendar date without time of day.
    Date(NaiveDate),
    /// A calendar date with time of day but no zone, interpreted as UTC.
    DateTime(NaiveDateTime),
    /// The canonical point-in-time representation.
    Timestamp(DateTime<Utc>),
    /// An arbitrary-precision decimal.
    Decimal(Decimal),
    /// A backend document identifier.
    Id(ObjectId),
    Array(Vec<Value>),
    Map(Fields),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Timestamp(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<&ObjectId> {
        match self {
            Value::Id(value) => Some(value),
            _ => None,
        }
    }

    /// Converts an already coerced value into BSON.
    fn into_bson(self) -> Bson {
        match self {
            Value::Null => Bson::Null,
            Value::Bool(value) => Bson::Boolean(value),
            Value::Int(value) => Bson::Int64(value),
            Value::Float(value) => Bson::Double(value),
            Value::String(value) => Bson::String(value),
            Value::Timestamp(value) => Bson::DateTime(bson::DateTime::from_chrono(value)),
            Value::Id(value) => Bson::ObjectId(value),
            Value::Array(values) => Bson::Array(values.into_iter().map(Value::into_bson).collect()),
            Value::Map(fields) => Bson::Document(Document::from_iter(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, value.into_bson())),
            )),
            // coerce() never leaves calendar or decimal values behind
            Value::Date(_) | Value::DateTime(_) | Value::Decimal(_) => Bson::Null,
        }
    }
}

impl From<Value> for Bson {
    fn from(value: Value) -> Self {
        coerce(value).into_bson()
    }
}

impl From<Bson> for Value {
    fn from(bson: Bson) -> Self {
        match bson {
            Bson::Null => Value::Null,
            Bson::Boolean(value) => Value::Bool(value),
            Bson::Int32(value) => Value::Int(value as i64),
            Bson::Int64(value) => Value::Int(value),
            Bson::Double(value) => Value::Float(value),
            Bson::String(value) => Value::String(value),
            Bson::DateTime(value) => Value::Timestamp(value.to_chrono()),
            Bson::ObjectId(value) => Value::Id(value),
            Bson::Array(values) => Value::Array(values.into_iter().map(Value::from).collect()),
            Bson::Document(document) => Value::Map(document_to_fields(document)),
            _ => Value::Null, // Other BSON kinds have no field representation
        }
    }
}

/// Converts a field mapping into a BSON document, coercing every value.
pub fn fields_to_document(fields: Fields) -> Document {
    Document::from_iter(
        fields
            .into_iter()
            .map(|(key, value)| (key, Bson::from(value))),
    )
}

/// Converts a BSON document into a field mapping, keeping key order.
pub fn document_to_fields(document: Document) -> Fields {
    document
        .into_iter()
        .map(|(key, value)| (key, Value::from(value)))
        .collect()
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Date(value) => serializer.collect_str(value),
            Value::DateTime(value) => serializer.serialize_str(&value.and_utc().to_rfc3339()),
            Value::Timestamp(value) => serializer.serialize_str(&value.to_rfc3339()),
            Value::Decimal(value) => serializer.collect_str(value),
            Value::Id(value) => serializer.serialize_str(&value.to_hex()),
            Value::Array(values) => values.serialize(serializer),
            Value::Map(fields) => fields.serialize(serializer),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(value.with_timezone(&Utc))
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::Id(value)
    }
}

impl From<Fields> for Value {
    fn from(value: Fields) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Builds a [`Fields`] mapping from `key => value` pairs.
///
/// ```ignore
/// let fields = fields! { "first" => "first", "count" => 3 };
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::value::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::value::Fields::new();
        $(
            fields.insert(
                ::std::string::ToString::to_string(&$key),
                $crate::value::Value::from($value),
            );
        )+
        fields
    }};
}
