//! The runtime's value representation.
//!
//! Every field of every record, every query parameter, and every result cell
//! is a [`Value`]. The variant set matches the declared field kinds plus
//! `Null` (doubling as "never assigned") and `List` (the right-hand side of
//! an `IN` predicate). Driver adapters translate between `Value` and their
//! backend's native types; nothing else in the runtime knows what a backend
//! stores.

use std::fmt;

/// One database value, independent of any backend.
///
/// # Examples
///
/// ```
/// use orma_db::value::Value;
///
/// let age = Value::from(30_i64);
/// assert_eq!(age.as_int(), Some(30));
/// assert!(Value::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// SQL NULL, also the state of a field that was never assigned.
    Null,
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string (the `binary` field kind).
    String(String),
    /// A calendar date.
    Date(chrono::NaiveDate),
    /// A wall-clock time.
    Time(chrono::NaiveTime),
    /// A date and time, no timezone.
    DateTime(chrono::NaiveDateTime),
    /// Several values at once, for `IN` predicates.
    List(Vec<Value>),
}

macro_rules! value_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(v: $source) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    i64 => Int,
    i32 => Int,
    f64 => Float,
    f32 => Float,
    String => String,
    &str => String,
    chrono::NaiveDate => Date,
    chrono::NaiveTime => Time,
    chrono::NaiveDateTime => DateTime,
    Vec<Value> => List,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl Value {
    /// Returns `true` for `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The integer inside `Int`, or `None` for every other variant.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The float inside `Float`, or `None` for every other variant.
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrows the string inside `String`, or `None` for every other
    /// variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{d}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}
