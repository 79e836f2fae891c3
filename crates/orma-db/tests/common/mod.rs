//! Shared test support: an in-memory driver that interprets the query AST.
//!
//! `MemoryDriver` keeps tables as vectors of column/value maps and evaluates
//! selects, where-trees, join selects, and extras directly against them.
//! Transactions snapshot the whole store on begin and restore it on
//! rollback, so the suite can observe commit-or-rollback atomicity.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Mutex;

use orma_core::{OrmError, OrmResult};
use orma_db::driver::{Driver, Row};
use orma_db::query::{
    AggFunc, CmpOp, Extra, Query, SelectList, SelectQuery, WhereExpr,
};
use orma_db::value::Value;

type TableRows = Vec<BTreeMap<String, Value>>;

#[derive(Default)]
struct DbState {
    tables: HashMap<String, TableRows>,
    next_id: i64,
    last_insert_id: i64,
    in_tx: bool,
    snapshot: Option<(HashMap<String, TableRows>, i64, i64)>,
    rollbacks: usize,
}

/// An in-memory database backend for exercising the full ORM pipeline.
pub struct MemoryDriver {
    state: Mutex<DbState>,
    fail_last_insert_id: AtomicBool,
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DbState::default()),
            fail_last_insert_id: AtomicBool::new(false),
        }
    }

    /// Number of rows currently stored in `table`.
    pub fn row_count(&self, table: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.tables.get(table).map_or(0, Vec::len)
    }

    /// Removes a row behind the ORM's back, simulating an external delete.
    pub fn remove_row(&self, table: &str, id: i64) {
        let mut state = self.state.lock().unwrap();
        if let Some(rows) = state.tables.get_mut(table) {
            rows.retain(|row| row.get("id") != Some(&Value::Int(id)));
        }
    }

    /// Inserts a raw row verbatim, bypassing id assignment. Used to set up
    /// pathological table states (duplicate ids).
    pub fn insert_raw(&self, table: &str, row: Vec<(&str, Value)>) {
        let mut state = self.state.lock().unwrap();
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row.into_iter().map(|(k, v)| (k.to_string(), v)).collect());
    }

    /// Makes the next `last_insert_id` call fail, simulating a driver
    /// failure between the insert and the id fetch.
    pub fn fail_next_last_insert_id(&self) {
        self.fail_last_insert_id.store(true, AtomicOrdering::SeqCst);
    }

    /// Number of transactions rolled back so far.
    pub fn rollbacks(&self) -> usize {
        self.state.lock().unwrap().rollbacks
    }
}

fn value_ord(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        #[allow(clippy::cast_precision_loss)]
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y),
        #[allow(clippy::cast_precision_loss)]
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        (Value::Time(x), Value::Time(y)) => Some(x.cmp(y)),
        (Value::DateTime(x), Value::DateTime(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn like_match(s: &str, pattern: &str) -> bool {
    let segments: Vec<&str> = pattern.split('%').collect();
    if segments.len() == 1 {
        return s == pattern;
    }
    let mut rest = s;
    if let Some(first) = segments.first() {
        if !first.is_empty() {
            if !rest.starts_with(first) {
                return false;
            }
            rest = &rest[first.len()..];
        }
    }
    if let Some(last) = segments.last() {
        if !last.is_empty() {
            if !rest.ends_with(last) {
                return false;
            }
            rest = &rest[..rest.len() - last.len()];
        }
    }
    for segment in &segments[1..segments.len() - 1] {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(pos) => rest = &rest[pos + segment.len()..],
            None => return false,
        }
    }
    true
}

fn compare(lhs: &Value, op: CmpOp, rhs: &Value) -> bool {
    match op {
        CmpOp::Eq => lhs == rhs,
        CmpOp::Ne => lhs != rhs,
        CmpOp::Lt => value_ord(lhs, rhs) == Some(Ordering::Less),
        CmpOp::Le => matches!(
            value_ord(lhs, rhs),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CmpOp::Gt => value_ord(lhs, rhs) == Some(Ordering::Greater),
        CmpOp::Ge => matches!(
            value_ord(lhs, rhs),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CmpOp::Like => match (lhs, rhs) {
            (Value::String(s), Value::String(p)) => like_match(s, p),
            _ => false,
        },
        CmpOp::In => match rhs {
            Value::List(items) => items.contains(lhs),
            _ => false,
        },
    }
}

fn eval_where(expr: &WhereExpr, row: &BTreeMap<String, Value>) -> bool {
    match expr {
        WhereExpr::Cmp { field, op, value } => row
            .get(field)
            .is_some_and(|lhs| compare(lhs, *op, value)),
        WhereExpr::ColCmp { left, op, right } => match (row.get(left), row.get(right)) {
            (Some(lhs), Some(rhs)) => compare(lhs, *op, rhs),
            _ => false,
        },
        WhereExpr::And(l, r) => eval_where(l, row) && eval_where(r, row),
        WhereExpr::Or(l, r) => eval_where(l, row) || eval_where(r, row),
        WhereExpr::Not(inner) => !eval_where(inner, row),
    }
}

fn apply_extras(rows: &mut Vec<BTreeMap<String, Value>>, select: &SelectQuery) {
    let Some(extras) = &select.extras else {
        return;
    };

    let orders: Vec<_> = extras
        .items()
        .iter()
        .filter_map(|extra| match extra {
            Extra::OrderBy(order) => Some(order.clone()),
            _ => None,
        })
        .collect();
    // Stable sorts applied in reverse give multi-key ordering.
    for order in orders.iter().rev() {
        rows.sort_by(|a, b| {
            let ord = match (a.get(&order.column), b.get(&order.column)) {
                (Some(x), Some(y)) => value_ord(x, y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            if order.descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }

    let mut offset = None;
    let mut limit = None;
    for extra in extras.items() {
        match extra {
            Extra::Offset(n) => offset = Some(*n as usize),
            Extra::Limit(n) => limit = Some(*n as usize),
            Extra::OrderBy(_) => {}
        }
    }
    if let Some(n) = offset {
        *rows = rows.split_off(n.min(rows.len()));
    }
    if let Some(n) = limit {
        rows.truncate(n);
    }
}

fn bare_name(column: &str) -> String {
    column.rsplit('.').next().unwrap_or(column).to_string()
}

fn aggregate_rows(
    rows: &[BTreeMap<String, Value>],
    func: AggFunc,
    column: Option<&String>,
) -> Value {
    let values: Vec<&Value> = column.map_or_else(Vec::new, |col| {
        rows.iter()
            .filter_map(|row| row.get(col))
            .filter(|v| !v.is_null())
            .collect()
    });

    match func {
        AggFunc::Count => match column {
            None => Value::Int(rows.len() as i64),
            Some(_) => Value::Int(values.len() as i64),
        },
        AggFunc::Min => values
            .iter()
            .copied()
            .min_by(|a, b| value_ord(a, b).unwrap_or(Ordering::Equal))
            .cloned()
            .unwrap_or(Value::Null),
        AggFunc::Max => values
            .iter()
            .copied()
            .max_by(|a, b| value_ord(a, b).unwrap_or(Ordering::Equal))
            .cloned()
            .unwrap_or(Value::Null),
        AggFunc::Sum | AggFunc::Avg => {
            if values.is_empty() {
                return Value::Null;
            }
            let all_ints = values.iter().all(|v| matches!(v, Value::Int(_)));
            #[allow(clippy::cast_precision_loss)]
            let total: f64 = values
                .iter()
                .map(|v| match v {
                    Value::Int(i) => *i as f64,
                    Value::Float(f) => *f,
                    _ => 0.0,
                })
                .sum();
            match func {
                AggFunc::Sum if all_ints => {
                    Value::Int(values.iter().map(|v| v.as_int().unwrap_or(0)).sum())
                }
                AggFunc::Sum => Value::Float(total),
                #[allow(clippy::cast_precision_loss)]
                _ => Value::Float(total / values.len() as f64),
            }
        }
    }
}

impl DbState {
    fn select_rows(&self, select: &SelectQuery) -> OrmResult<Vec<BTreeMap<String, Value>>> {
        let mut rows: Vec<BTreeMap<String, Value>> = match select.from.as_slice() {
            [table] => self.tables.get(table).cloned().unwrap_or_default(),
            [left, right] => {
                // Cartesian product with table-qualified keys; the where
                // clause carries the join condition.
                let left_rows = self.tables.get(left).cloned().unwrap_or_default();
                let right_rows = self.tables.get(right).cloned().unwrap_or_default();
                let mut product = Vec::new();
                for l in &left_rows {
                    for r in &right_rows {
                        let mut combined = BTreeMap::new();
                        for (k, v) in l {
                            combined.insert(format!("{left}.{k}"), v.clone());
                        }
                        for (k, v) in r {
                            combined.insert(format!("{right}.{k}"), v.clone());
                        }
                        product.push(combined);
                    }
                }
                product
            }
            other => {
                return Err(OrmError::DriverError(format!(
                    "unsupported FROM list: {other:?}"
                )))
            }
        };

        if let Some(where_clause) = &select.where_clause {
            rows.retain(|row| eval_where(where_clause, row));
        }
        apply_extras(&mut rows, select);
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl Driver for MemoryDriver {
    async fn select(&self, query: &Query) -> OrmResult<Vec<Row>> {
        let Query::Select(select) = query else {
            return Err(OrmError::DriverError("expected a select query".into()));
        };
        let state = self.state.lock().unwrap();
        let rows = state.select_rows(select)?;

        match &select.columns {
            SelectList::Columns(columns) => Ok(rows
                .iter()
                .map(|row| {
                    let names = columns.iter().map(|c| bare_name(c)).collect();
                    let values = columns
                        .iter()
                        .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                        .collect();
                    Row::new(names, values)
                })
                .collect()),
            SelectList::Aggregate { func, column } => {
                let value = aggregate_rows(&rows, *func, column.as_ref());
                Ok(vec![Row::new(
                    vec![func.as_str().to_string()],
                    vec![value],
                )])
            }
        }
    }

    async fn execute(&self, query: &Query) -> OrmResult<u64> {
        let mut state = self.state.lock().unwrap();
        match query {
            Query::Insert(insert) => {
                state.next_id += 1;
                let id = state.next_id;
                let mut row: BTreeMap<String, Value> = insert
                    .columns
                    .iter()
                    .cloned()
                    .zip(insert.values.iter().cloned())
                    .collect();
                row.entry("id".to_string()).or_insert(Value::Int(id));
                state
                    .tables
                    .entry(insert.table.clone())
                    .or_default()
                    .push(row);
                state.last_insert_id = id;
                Ok(1)
            }
            Query::Update(update) => {
                let rows = state.tables.entry(update.table.clone()).or_default();
                let mut affected = 0;
                for row in rows.iter_mut() {
                    let matches = update
                        .where_clause
                        .as_ref()
                        .map_or(true, |w| eval_where(w, row));
                    if matches {
                        for (column, value) in &update.assignments {
                            row.insert(column.clone(), value.clone());
                        }
                        affected += 1;
                    }
                }
                Ok(affected)
            }
            Query::Delete(delete) => {
                let rows = state.tables.entry(delete.table.clone()).or_default();
                let before = rows.len();
                rows.retain(|row| {
                    delete
                        .where_clause
                        .as_ref()
                        .is_some_and(|w| !eval_where(w, row))
                });
                Ok((before - rows.len()) as u64)
            }
            Query::Select(_) => Err(OrmError::DriverError(
                "select passed to execute".into(),
            )),
        }
    }

    async fn last_insert_id(&self) -> OrmResult<i64> {
        if self.fail_last_insert_id.swap(false, AtomicOrdering::SeqCst) {
            return Err(OrmError::DriverError("lost connection".into()));
        }
        Ok(self.state.lock().unwrap().last_insert_id)
    }

    async fn begin_transaction(&self) -> OrmResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.in_tx {
            return Err(OrmError::DriverError("transaction already open".into()));
        }
        state.in_tx = true;
        state.snapshot = Some((state.tables.clone(), state.next_id, state.last_insert_id));
        Ok(())
    }

    async fn commit(&self) -> OrmResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.in_tx {
            return Err(OrmError::DriverError("no open transaction".into()));
        }
        state.in_tx = false;
        state.snapshot = None;
        Ok(())
    }

    async fn rollback(&self) -> OrmResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.in_tx {
            return Err(OrmError::DriverError("no open transaction".into()));
        }
        let (tables, next_id, last_insert_id) = state
            .snapshot
            .take()
            .ok_or_else(|| OrmError::DriverError("missing snapshot".into()))?;
        state.tables = tables;
        state.next_id = next_id;
        state.last_insert_id = last_insert_id;
        state.in_tx = false;
        state.rollbacks += 1;
        Ok(())
    }
}
