//! Core error types for the orma runtime.
//!
//! This module provides the [`OrmError`] enum covering every way an ORM
//! operation can fail: bad field assignments, string-parsing failures,
//! lifecycle violations, affected-row anomalies, and driver failures.
//!
//! Every variant is terminal for the current operation. The runtime performs
//! no silent recovery and no retries: a violated invariant aborts the call
//! and surfaces the typed error to the immediate caller.

use thiserror::Error;

/// The primary error type for the orma runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrmError {
    // ── Field assignment and parsing ─────────────────────────────────

    /// An assignment referenced a field that is not part of the schema.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A non-nullable field received an absent value during string parsing.
    #[error("field '{0}' is not nullable")]
    NullValueViolation(String),

    /// A parsed date/time component fell outside its valid numeric range.
    #[error("invalid value for field '{field}': {reason}")]
    InvalidValue {
        /// The field the value was destined for.
        field: String,
        /// What was out of range.
        reason: String,
    },

    /// A string value did not match the expected lexical format for its
    /// declared type.
    #[error("cannot parse '{input}' as {expected} for field '{field}'")]
    ParseError {
        /// The field the value was destined for.
        field: String,
        /// The raw input string.
        input: String,
        /// The expected lexical form (e.g. "integer", "MM/DD/YYYY").
        expected: &'static str,
    },

    // ── Record lifecycle ─────────────────────────────────────────────

    /// An operation that requires a persisted record was given a new or
    /// deleted one.
    #[error("record has not been saved")]
    NotSaved,

    /// A delete-by-id affected no rows: the underlying row is gone.
    #[error("delete affected no rows")]
    DeleteFailed,

    /// A delete-by-id affected more than one row. This indicates a broken
    /// identity assumption in the underlying table.
    #[error("delete affected {0} rows, expected exactly 1")]
    TooManyRowsDeleted(u64),

    /// An update or association mutation affected a row count other than the
    /// expected exact value.
    #[error("operation affected {actual} rows, expected {expected}")]
    UnexpectedNumUpdates {
        /// The number of rows the operation was required to affect.
        expected: u64,
        /// The number of rows it actually affected.
        actual: u64,
    },

    // ── Query results ────────────────────────────────────────────────

    /// A single-result query returned more than one row.
    #[error("query returned more than one result")]
    TooManyResults,

    // ── Registry ─────────────────────────────────────────────────────

    /// A relation or registry lookup named an entity type that was never
    /// registered.
    #[error("unknown entity type '{0}'")]
    UnknownEntity(String),

    // ── Driver ───────────────────────────────────────────────────────

    /// Opaque passthrough from the driver adapter (connection, statement,
    /// or constraint failure). The adapter rolls the transaction back
    /// before this surfaces.
    #[error("driver error: {0}")]
    DriverError(String),
}

/// A convenience type alias for `Result<T, OrmError>`.
pub type OrmResult<T> = Result<T, OrmError>;
