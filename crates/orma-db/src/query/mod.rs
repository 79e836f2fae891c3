//! Query building: the relational AST and the schema-driven builders.

pub mod ast;
pub mod builder;

pub use ast::{
    and_expr, append_extras, AggFunc, CmpOp, DeleteQuery, Extra, Extras, InsertQuery, OrderBy,
    Query, SelectList, SelectQuery, UpdateQuery, WhereExpr,
};
