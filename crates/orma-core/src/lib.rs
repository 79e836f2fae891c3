//! # orma-core
//!
//! Foundation types for the orma ORM runtime. This crate has zero framework
//! dependencies and provides the pieces every other crate builds on.
//!
//! ## Modules
//!
//! - [`error`] - The [`OrmError`] taxonomy and the [`OrmResult`] alias
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;

// Re-export the most commonly used types at the crate root.
pub use error::{OrmError, OrmResult};
