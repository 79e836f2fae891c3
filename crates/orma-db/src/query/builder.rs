//! Query construction from entity schemas.
//!
//! Pure transformations `(schema, where-expr, extras) -> Query`; nothing in
//! this module touches a driver. Whenever a schema declares a discriminator
//! column, read/update/delete queries transparently conjoin
//! `discriminator = entity_name` into the where-clause and inserts write the
//! discriminator column, so several entity types can share one physical
//! table without callers ever mentioning it.

use crate::query::ast::{
    and_expr, AggFunc, DeleteQuery, Extras, InsertQuery, Query, SelectList, SelectQuery,
    UpdateQuery, WhereExpr,
};
use crate::schema::EntitySchema;
use crate::value::Value;

/// The `discriminator = entity_name` condition, if the schema declares one.
/// `qualifier` prefixes the column for use inside a join select.
fn discriminator_cond(schema: &EntitySchema, qualifier: Option<&str>) -> Option<WhereExpr> {
    schema.discriminator().map(|column| {
        let column = match qualifier {
            Some(table) => format!("{table}.{column}"),
            None => column.to_string(),
        };
        WhereExpr::eq(column, Value::String(schema.name().to_string()))
    })
}

/// Builds a select of `id` plus every exposed field.
pub fn select_query(
    schema: &EntitySchema,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> Query {
    let mut columns = Vec::with_capacity(schema.fields().len() + 1);
    columns.push("id".to_string());
    columns.extend(schema.fields().iter().map(|f| f.name().to_string()));

    Query::Select(SelectQuery {
        columns: SelectList::Columns(columns),
        from: vec![schema.table().to_string()],
        where_clause: and_expr(discriminator_cond(schema, None), where_clause),
        extras,
    })
}

/// Builds an aggregate select (`column = None` aggregates over `*`).
pub fn aggregate_query(
    schema: &EntitySchema,
    func: AggFunc,
    column: Option<&str>,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> Query {
    Query::Select(SelectQuery {
        columns: SelectList::Aggregate {
            func,
            column: column.map(ToString::to_string),
        },
        from: vec![schema.table().to_string()],
        where_clause: and_expr(discriminator_cond(schema, None), where_clause),
        extras,
    })
}

/// Builds an insert of the given field values, adding the discriminator
/// column when the schema declares one.
pub fn insert_query(schema: &EntitySchema, fields: &[(&str, Value)]) -> Query {
    let mut columns: Vec<String> = fields.iter().map(|(name, _)| (*name).to_string()).collect();
    let mut values: Vec<Value> = fields.iter().map(|(_, value)| value.clone()).collect();

    if let Some(discriminator) = schema.discriminator() {
        columns.push(discriminator.to_string());
        values.push(Value::String(schema.name().to_string()));
    }

    Query::Insert(InsertQuery {
        table: schema.table().to_string(),
        columns,
        values,
    })
}

/// Builds an update of the given field values for the row with the given id.
pub fn update_query(schema: &EntitySchema, id: i64, fields: &[(&str, Value)]) -> Query {
    Query::Update(UpdateQuery {
        table: schema.table().to_string(),
        assignments: fields
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect(),
        where_clause: and_expr(
            discriminator_cond(schema, None),
            Some(WhereExpr::eq("id", id)),
        ),
    })
}

/// Builds a delete of the row with the given id.
pub fn delete_by_id_query(schema: &EntitySchema, id: i64) -> Query {
    delete_query(schema, Some(WhereExpr::eq("id", id)))
}

/// Builds a bulk delete over an optional where-clause.
pub fn delete_query(schema: &EntitySchema, where_clause: Option<WhereExpr>) -> Query {
    Query::Delete(DeleteQuery {
        table: schema.table().to_string(),
        where_clause: and_expr(discriminator_cond(schema, None), where_clause),
    })
}

/// The join condition shared by the many-to-many select and aggregate:
/// `join.source_fk = source_id AND target.id = join.target_fk`.
fn join_cond(
    target: &EntitySchema,
    join_table: &str,
    source_fk_column: &str,
    source_id: i64,
) -> WhereExpr {
    WhereExpr::eq(format!("{join_table}.{source_fk_column}"), source_id).and(WhereExpr::col_eq(
        format!("{}.id", target.table()),
        format!("{}.{}", join_table, target.fk_column()),
    ))
}

/// Builds the two-table select resolving a many-to-many relation: target
/// rows joined through the join table on both foreign keys.
pub fn many_to_many_select(
    target: &EntitySchema,
    join_table: &str,
    source_fk_column: &str,
    source_id: i64,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> Query {
    let table = target.table();
    let mut columns = Vec::with_capacity(target.fields().len() + 1);
    columns.push(format!("{table}.id"));
    columns.extend(
        target
            .fields()
            .iter()
            .map(|f| format!("{table}.{}", f.name())),
    );

    let base = join_cond(target, join_table, source_fk_column, source_id);
    let base = and_expr(Some(base), discriminator_cond(target, Some(table)));

    Query::Select(SelectQuery {
        columns: SelectList::Columns(columns),
        from: vec![table.to_string(), join_table.to_string()],
        where_clause: and_expr(base, where_clause),
        extras,
    })
}

/// Builds the aggregate form of the many-to-many select.
pub fn many_to_many_aggregate(
    target: &EntitySchema,
    join_table: &str,
    source_fk_column: &str,
    source_id: i64,
    func: AggFunc,
    column: Option<&str>,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> Query {
    let table = target.table();
    let base = join_cond(target, join_table, source_fk_column, source_id);
    let base = and_expr(Some(base), discriminator_cond(target, Some(table)));

    Query::Select(SelectQuery {
        columns: SelectList::Aggregate {
            func,
            column: column.map(|c| format!("{table}.{c}")),
        },
        from: vec![table.to_string(), join_table.to_string()],
        where_clause: and_expr(base, where_clause),
        extras,
    })
}

/// Builds the insert associating two records in a join table.
pub fn join_insert(join_table: &str, a: (&str, i64), b: (&str, i64)) -> Query {
    Query::Insert(InsertQuery {
        table: join_table.to_string(),
        columns: vec![a.0.to_string(), b.0.to_string()],
        values: vec![Value::Int(a.1), Value::Int(b.1)],
    })
}

/// Builds the delete dissociating two records in a join table.
pub fn join_delete(join_table: &str, a: (&str, i64), b: (&str, i64)) -> Query {
    Query::Delete(DeleteQuery {
        table: join_table.to_string(),
        where_clause: Some(WhereExpr::eq(a.0, a.1).and(WhereExpr::eq(b.0, b.1))),
    })
}
