//! The relational query AST.
//!
//! A [`Query`] is an algebraic value describing one of the four statement
//! kinds. Queries are built by the functions in
//! [`builder`](crate::query::builder) and handed to a
//! [`Driver`](crate::driver::Driver) for execution; the AST itself never
//! touches the network and carries no backend-specific syntax.
//!
//! This module also owns the two small pieces of query algebra the rest of
//! the runtime leans on: [`and_expr`] (conjunction with absence as identity)
//! and [`append_extras`] (ordered extras concatenation).

use crate::value::Value;

/// A comparison operator in a where-clause leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CmpOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `LIKE`
    Like,
    /// `IN` (the right-hand side is a [`Value::List`])
    In,
}

/// A boolean-expression tree over field comparisons.
///
/// Leaves compare a column against a value ([`WhereExpr::Cmp`]) or against
/// another column ([`WhereExpr::ColCmp`], used for join conditions). Interior
/// nodes combine subtrees with `AND`, `OR`, or `NOT`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum WhereExpr {
    /// A column/value comparison.
    Cmp {
        /// The column name (possibly table-qualified).
        field: String,
        /// The comparison operator.
        op: CmpOp,
        /// The right-hand value.
        value: Value,
    },
    /// A column/column comparison.
    ColCmp {
        /// The left column name.
        left: String,
        /// The comparison operator.
        op: CmpOp,
        /// The right column name.
        right: String,
    },
    /// Logical conjunction.
    And(Box<WhereExpr>, Box<WhereExpr>),
    /// Logical disjunction.
    Or(Box<WhereExpr>, Box<WhereExpr>),
    /// Logical negation.
    Not(Box<WhereExpr>),
}

impl WhereExpr {
    /// Builds a comparison leaf.
    pub fn cmp(field: impl Into<String>, op: CmpOp, value: impl Into<Value>) -> Self {
        Self::Cmp {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Builds an equality leaf.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Eq, value)
    }

    /// Builds a column-to-column equality leaf.
    pub fn col_eq(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::ColCmp {
            left: left.into(),
            op: CmpOp::Eq,
            right: right.into(),
        }
    }

    /// Conjoins two expressions.
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Disjoins two expressions.
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Negates an expression.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}

/// Conjoins two optional expressions, treating an absent side as identity.
///
/// Combining two absent sides yields absent.
///
/// # Examples
///
/// ```
/// use orma_db::query::{and_expr, WhereExpr};
///
/// let x = WhereExpr::eq("a", 1_i64);
/// assert_eq!(and_expr(None, Some(x.clone())), Some(x.clone()));
/// assert_eq!(and_expr(Some(x.clone()), None), Some(x));
/// assert_eq!(and_expr(None, None), None);
/// ```
pub fn and_expr(a: Option<WhereExpr>, b: Option<WhereExpr>) -> Option<WhereExpr> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (Some(x), Some(y)) => Some(x.and(y)),
    }
}

/// A column ordering direction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderBy {
    /// The column to order by.
    pub column: String,
    /// Whether to sort in descending order.
    pub descending: bool,
}

impl OrderBy {
    /// Creates an ascending order.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Creates a descending order.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// A single query modifier layered onto a where-clause.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Extra {
    /// `LIMIT n`
    Limit(u64),
    /// `OFFSET n`
    Offset(u64),
    /// One `ORDER BY` entry.
    OrderBy(OrderBy),
}

/// An ordered sequence of query modifiers.
///
/// Callers supply extras in the order they want them honored; the runtime
/// appends its own (e.g. an injected `LIMIT 1`) after the caller's.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Extras {
    items: Vec<Extra>,
}

impl Extras {
    /// Creates an empty sequence.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Creates a sequence containing a single `LIMIT`.
    pub fn limit(n: u64) -> Self {
        Extra::Limit(n).into()
    }

    /// Creates a sequence containing a single `OFFSET`.
    pub fn offset(n: u64) -> Self {
        Extra::Offset(n).into()
    }

    /// Creates a sequence containing a single `ORDER BY` entry.
    pub fn order_by(order: OrderBy) -> Self {
        Extra::OrderBy(order).into()
    }

    /// Appends one modifier, preserving order.
    #[must_use]
    pub fn with(mut self, extra: Extra) -> Self {
        self.items.push(extra);
        self
    }

    /// Returns the modifiers in order.
    pub fn items(&self) -> &[Extra] {
        &self.items
    }

    /// Returns `true` if no modifiers are present.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Extra> for Extras {
    /// Wraps a lone extra into a sequence.
    fn from(extra: Extra) -> Self {
        Self { items: vec![extra] }
    }
}

/// Appends `clause` to an optional extras sequence.
///
/// Absent extras become `clause`; otherwise the result is `extras` followed
/// by `clause`, order preserved.
///
/// # Examples
///
/// ```
/// use orma_db::query::{append_extras, Extras};
///
/// let clause = Extras::limit(1);
/// assert_eq!(append_extras(None, clause.clone()), clause);
/// ```
pub fn append_extras(extras: Option<Extras>, clause: Extras) -> Extras {
    match extras {
        None => clause,
        Some(mut existing) => {
            existing.items.extend(clause.items);
            existing
        }
    }
}

/// An aggregate function usable in a select field position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AggFunc {
    /// `COUNT`
    Count,
    /// `SUM`
    Sum,
    /// `MIN`
    Min,
    /// `MAX`
    Max,
    /// `AVG`
    Avg,
}

impl AggFunc {
    /// Returns the lowercase function name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Avg => "avg",
        }
    }
}

/// The field position of a select statement.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SelectList {
    /// Explicit column names, in output order.
    Columns(Vec<String>),
    /// An aggregate function over a column (`None` = `*`).
    Aggregate {
        /// The aggregate function.
        func: AggFunc,
        /// The column the aggregate ranges over, or `None` for `*`.
        column: Option<String>,
    },
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SelectQuery {
    /// The field position.
    pub columns: SelectList,
    /// The tables selected from: one, or two for a join-table select.
    pub from: Vec<String>,
    /// The where-clause.
    pub where_clause: Option<WhereExpr>,
    /// Query modifiers.
    pub extras: Option<Extras>,
}

/// An INSERT statement.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InsertQuery {
    /// The target table.
    pub table: String,
    /// Column names, matching `values` positionally.
    pub columns: Vec<String>,
    /// The values to insert.
    pub values: Vec<Value>,
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UpdateQuery {
    /// The target table.
    pub table: String,
    /// Column assignments.
    pub assignments: Vec<(String, Value)>,
    /// The where-clause.
    pub where_clause: Option<WhereExpr>,
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeleteQuery {
    /// The target table.
    pub table: String,
    /// The where-clause.
    pub where_clause: Option<WhereExpr>,
}

/// A complete query of one of the four statement kinds.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Query {
    /// A SELECT.
    Select(SelectQuery),
    /// An INSERT.
    Insert(InsertQuery),
    /// An UPDATE.
    Update(UpdateQuery),
    /// A DELETE.
    Delete(DeleteQuery),
}
