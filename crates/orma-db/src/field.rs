//! Field descriptors: per-column metadata and string parsing.
//!
//! A [`FieldDef`] describes one database column exposed by an entity schema:
//! its name, declared kind, and nullability. Descriptors are immutable once
//! the schema is built. They also own the strict string-to-value parsing used
//! when records are populated from textual input (e.g. form submissions).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use orma_core::{OrmError, OrmResult};

use crate::value::Value;

/// The declared type of a field, determining how string input is parsed and
/// how values are rendered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FieldKind {
    /// Text data.
    Binary,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit floating-point number.
    Float,
    /// Date without time.
    Date,
    /// Time without date.
    Time,
    /// Date and time.
    DateTime,
}

impl FieldKind {
    /// Returns a short lowercase name for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
        }
    }
}

/// Metadata for one database column exposed by an entity schema.
///
/// # Examples
///
/// ```
/// use orma_db::field::{FieldDef, FieldKind};
///
/// let age = FieldDef::new("age", FieldKind::Integer);
/// let bio = FieldDef::new("bio", FieldKind::Binary).nullable();
/// assert!(!age.is_nullable());
/// assert!(bio.is_nullable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: &'static str,
    kind: FieldKind,
    nullable: bool,
}

impl FieldDef {
    /// Creates a non-nullable field descriptor.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    /// Allows NULL values for this field.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Returns the column name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared kind.
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns whether NULL is allowed.
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Parses a string into a typed [`Value`] according to the declared kind.
    ///
    /// An empty string is treated as absent: it parses to [`Value::Null`] for
    /// a nullable field and fails with [`OrmError::NullValueViolation`]
    /// otherwise. Numeric kinds use strict decimal parsing. Date and time
    /// kinds expect `MM/DD/YYYY`, `HH:MM:SS`, or the two joined by a single
    /// space; a component outside its valid range (or a non-existent calendar
    /// date) fails with [`OrmError::InvalidValue`], and anything that does not
    /// match the lexical shape fails with [`OrmError::ParseError`].
    pub fn value_from_str(&self, input: &str) -> OrmResult<Value> {
        if input.is_empty() {
            if self.nullable {
                return Ok(Value::Null);
            }
            return Err(OrmError::NullValueViolation(self.name.to_string()));
        }

        match self.kind {
            FieldKind::Binary => Ok(Value::String(input.to_string())),
            FieldKind::Integer => input
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.parse_error(input, "integer")),
            FieldKind::Float => input
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| self.parse_error(input, "float")),
            FieldKind::Date => self.parse_date(input).map(Value::Date),
            FieldKind::Time => self.parse_time(input).map(Value::Time),
            FieldKind::DateTime => self.parse_datetime(input).map(Value::DateTime),
        }
    }

    fn parse_error(&self, input: &str, expected: &'static str) -> OrmError {
        OrmError::ParseError {
            field: self.name.to_string(),
            input: input.to_string(),
            expected,
        }
    }

    fn invalid_value(&self, reason: String) -> OrmError {
        OrmError::InvalidValue {
            field: self.name.to_string(),
            reason,
        }
    }

    fn component(&self, raw: &str, input: &str, expected: &'static str) -> OrmResult<i64> {
        raw.parse::<i64>().map_err(|_| self.parse_error(input, expected))
    }

    fn check_range(&self, what: &str, value: i64, min: i64, max: i64) -> OrmResult<()> {
        if value < min || value > max {
            return Err(self.invalid_value(format!("{what} {value} out of range {min}..={max}")));
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn parse_date(&self, input: &str) -> OrmResult<NaiveDate> {
        let parts: Vec<&str> = input.split('/').collect();
        if parts.len() != 3 {
            return Err(self.parse_error(input, "MM/DD/YYYY"));
        }
        let month = self.component(parts[0], input, "MM/DD/YYYY")?;
        let day = self.component(parts[1], input, "MM/DD/YYYY")?;
        let year = self.component(parts[2], input, "MM/DD/YYYY")?;

        self.check_range("month", month, 1, 12)?;
        self.check_range("day", day, 1, 31)?;
        self.check_range("year", year, 1, 9999)?;

        NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
            .ok_or_else(|| self.invalid_value(format!("{month}/{day}/{year} is not a calendar date")))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn parse_time(&self, input: &str) -> OrmResult<NaiveTime> {
        let parts: Vec<&str> = input.split(':').collect();
        if parts.len() != 3 {
            return Err(self.parse_error(input, "HH:MM:SS"));
        }
        let hour = self.component(parts[0], input, "HH:MM:SS")?;
        let minute = self.component(parts[1], input, "HH:MM:SS")?;
        let second = self.component(parts[2], input, "HH:MM:SS")?;

        self.check_range("hour", hour, 0, 23)?;
        self.check_range("minute", minute, 0, 59)?;
        self.check_range("second", second, 0, 59)?;

        NaiveTime::from_hms_opt(hour as u32, minute as u32, second as u32)
            .ok_or_else(|| self.invalid_value(format!("{hour}:{minute}:{second} is not a valid time")))
    }

    fn parse_datetime(&self, input: &str) -> OrmResult<NaiveDateTime> {
        let (date_part, time_part) = input
            .split_once(' ')
            .ok_or_else(|| self.parse_error(input, "MM/DD/YYYY HH:MM:SS"))?;
        let date = self.parse_date(date_part)?;
        let time = self.parse_time(time_part)?;
        Ok(date.and_time(time))
    }
}
