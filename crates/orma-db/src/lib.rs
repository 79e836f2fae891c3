//! # orma-db
//!
//! The ORM core of orma. Entity types register an [`EntitySchema`] once; a
//! generic runtime then provides records, CRUD persistence, relationship
//! traversal, and display serialization over the open set of registered
//! types, with no per-entity persistence code.
//!
//! ## Architecture
//!
//! Every operation is one short round trip: the [`builder`](query::builder)
//! functions turn `(schema, where-expr, extras)` into a [`Query`](query::Query)
//! AST, a [`Driver`](driver::Driver) executes it, and the CRUD layer hydrates
//! rows back into [`Record`](record::Record)s, running the schema's lifecycle
//! hooks at fixed pipeline points. The core holds no mutable shared state
//! beyond the [`SchemaRegistry`](schema::SchemaRegistry), which is read-only
//! after initialization, so concurrent callers need no locking here.
//!
//! ## Module Overview
//!
//! - [`value`] - The backend-agnostic [`Value`](value::Value) enum
//! - [`field`] - Column descriptors and string parsing
//! - [`schema`] - Entity schema descriptors, relations, hooks, the registry
//! - [`query`] - The query AST, algebra, and schema-driven builders
//! - [`record`] - Record values and their persistence state machine
//! - [`crud`] - Generic find/save/delete and the transaction wrapper
//! - [`relations`] - One-to-many, many-to-one, and many-to-many traversal
//! - [`driver`] - The adapter contract concrete backends implement
//! - [`render`] - Records to display-ready strings

// These clippy lints are intentionally allowed for the ORM crate:
// - result_large_err: OrmError is the runtime error type and is used consistently
// - doc_markdown: backtick requirements for documentation items are too strict
// - missing_const_for_fn: small accessors are kept non-const to avoid API churn
#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]

pub mod crud;
pub mod driver;
pub mod field;
pub mod query;
pub mod record;
pub mod relations;
pub mod render;
pub mod schema;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use crud::{
    aggregate, count, delete, delete_all, delete_where, find, find_first, find_id, find_max,
    find_range, save, select_records, with_transaction,
};
pub use driver::{Driver, DriverConfig, Row};
pub use field::{FieldDef, FieldKind};
pub use query::{
    and_expr, append_extras, AggFunc, CmpOp, Extra, Extras, OrderBy, Query, SelectList, WhereExpr,
};
pub use record::{Record, RecordState};
pub use relations::{
    add_related_many_to_many, aggregate_related_many, find_related_many, find_related_many_first,
    find_related_many_max, find_related_many_range, find_related_many_to_many,
    find_related_many_to_one, find_related_one_to_many, remove_related_many_to_many,
    set_related_one_to_many,
};
pub use schema::{EntitySchema, Hook, Hooks, RelationDef, RelationKind, SchemaRegistry};
pub use value::Value;
