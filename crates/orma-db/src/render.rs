//! Display serialization: records to sequences of strings.
//!
//! [`to_strings`] maps each exposed field of a record, in declaration order,
//! through an optional caller-supplied converter; where the converter
//! declines (returns `None`) the built-in conversion applies.

use crate::field::FieldDef;
use crate::record::Record;
use crate::value::Value;

/// A caller-supplied conversion for one field value.
///
/// Returning `None` declines, in which case [`default_to_string`] applies.
pub type FieldConverter = fn(&FieldDef, &Value) -> Option<String>;

/// The built-in conversion: strings pass through, numbers render decimal,
/// dates as `MM/DD/YYYY`, times as `HH:MM:SS`, datetimes as both joined by
/// a space, absent values render empty, and anything else falls back to the
/// value's `Display` form.
pub fn default_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Date(d) => d.format("%m/%d/%Y").to_string(),
        Value::Time(t) => t.format("%H:%M:%S").to_string(),
        Value::DateTime(dt) => dt.format("%m/%d/%Y %H:%M:%S").to_string(),
        other => other.to_string(),
    }
}

/// Renders one record to a display-ready string per exposed field, in
/// field declaration order.
pub fn to_strings(record: &Record, converter: Option<FieldConverter>) -> Vec<String> {
    record
        .schema()
        .fields()
        .iter()
        .zip(record.values())
        .map(|(field, value)| {
            converter
                .and_then(|convert| convert(field, value))
                .unwrap_or_else(|| default_to_string(value))
        })
        .collect()
}

/// Renders a list of records; one string sequence per record.
pub fn records_to_strings(
    records: &[Record],
    converter: Option<FieldConverter>,
) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| to_strings(record, converter))
        .collect()
}
