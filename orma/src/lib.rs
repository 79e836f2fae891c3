//! # orma
//!
//! A schema-driven ORM runtime for Rust.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. You can depend on `orma` to get the whole runtime, or depend on
//! the individual crates for finer-grained control.

/// Foundation types: the error taxonomy and logging integration.
pub use orma_core as core;

/// The ORM core: schemas, records, queries, relations, and the driver
/// adapter contract.
pub use orma_db as db;
