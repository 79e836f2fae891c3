//! Relationship traversal and mutation across the three cardinalities.
//!
//! All relation operations reduce to query building plus the generic CRUD
//! layer, composed over the two related schemas. Foreign-key columns follow
//! the `<entity>_id` naming convention; many-to-many relations go through
//! the join table named on the relation descriptor.
//!
//! The cardinality-agnostic `find_related_many*` wrappers resolve a relation
//! by name on the record's schema and dispatch on its kind; the dispatch
//! target is fixed by the descriptor built at schema construction, not
//! looked up by name at call time.

use orma_core::{OrmError, OrmResult};
use tracing::debug;

use crate::crud::{self, with_transaction};
use crate::driver::Driver;
use crate::query::ast::{and_expr, append_extras, AggFunc, Extra, Extras, WhereExpr};
use crate::query::builder;
use crate::record::Record;
use crate::schema::{EntitySchema, RelationKind, SchemaRegistry};
use crate::value::Value;

// ── One-to-many (the "many" side pointing at its "one") ────────────────

/// Looks up the single related record referenced by this record's
/// `<target>_id` foreign key. A `Null` foreign key resolves to `None`.
pub async fn find_related_one_to_many(
    registry: &SchemaRegistry,
    driver: &dyn Driver,
    target: &str,
    record: &Record,
) -> OrmResult<Option<Record>> {
    let target_schema = registry.get(target)?;
    let fk_column = target_schema.fk_column();
    match record.get(&fk_column)? {
        Value::Null => Ok(None),
        Value::Int(id) => crud::find_id(driver, target_schema, *id).await,
        other => Err(OrmError::InvalidValue {
            field: fk_column,
            reason: format!("foreign key holds a non-integer value: {other}"),
        }),
    }
}

/// Points this record at `other` by writing `other`'s id into the
/// `<other_entity>_id` foreign-key field. `other` must be saved.
pub fn set_related_one_to_many(record: &mut Record, other: &Record) -> OrmResult<()> {
    let id = other.saved_id()?;
    record.set(&other.schema().fk_column(), Value::Int(id))
}

// ── Many-to-one (the "one" side collecting its "many") ─────────────────

/// Finds the records of `target_schema` whose foreign key references this
/// record, conjoined with the caller's where-clause. The record must be
/// saved.
pub async fn find_related_many_to_one(
    driver: &dyn Driver,
    target_schema: &'static EntitySchema,
    record: &Record,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Vec<Record>> {
    let filter = reverse_fk_filter(record)?;
    crud::find(
        driver,
        target_schema,
        and_expr(Some(filter), where_clause),
        extras,
    )
    .await
}

/// Aggregate form of [`find_related_many_to_one`].
pub async fn aggregate_related_many_to_one(
    driver: &dyn Driver,
    target_schema: &'static EntitySchema,
    record: &Record,
    func: AggFunc,
    column: Option<&str>,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Value> {
    let filter = reverse_fk_filter(record)?;
    crud::aggregate(
        driver,
        target_schema,
        func,
        column,
        and_expr(Some(filter), where_clause),
        extras,
    )
    .await
}

/// The `<record_entity>_id = record.id` condition on the related table.
fn reverse_fk_filter(record: &Record) -> OrmResult<WhereExpr> {
    let id = record.saved_id()?;
    Ok(WhereExpr::eq(record.schema().fk_column(), id))
}

// ── Many-to-many (through a join table) ────────────────────────────────

/// Finds the records related to this one through a join table: a two-table
/// select joining the target and the join table on both foreign keys. The
/// record must be saved.
pub async fn find_related_many_to_many(
    registry: &SchemaRegistry,
    driver: &dyn Driver,
    record: &Record,
    target: &str,
    join_table: &str,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Vec<Record>> {
    let target_schema = registry.get(target)?;
    let id = record.saved_id()?;
    let query = builder::many_to_many_select(
        target_schema,
        join_table,
        &record.schema().fk_column(),
        id,
        where_clause,
        extras,
    );
    crud::select_records(driver, target_schema, &query).await
}

/// Aggregate form of [`find_related_many_to_many`].
pub async fn aggregate_related_many_to_many(
    registry: &SchemaRegistry,
    driver: &dyn Driver,
    record: &Record,
    target: &str,
    join_table: &str,
    func: AggFunc,
    column: Option<&str>,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Value> {
    let target_schema = registry.get(target)?;
    let id = record.saved_id()?;
    let query = builder::many_to_many_aggregate(
        target_schema,
        join_table,
        &record.schema().fk_column(),
        id,
        func,
        column,
        where_clause,
        extras,
    );
    crud::scalar(driver, &query).await
}

/// Associates two saved records in the join table. Exactly one row must be
/// inserted, else [`OrmError::UnexpectedNumUpdates`].
pub async fn add_related_many_to_many(
    driver: &dyn Driver,
    record: &Record,
    other: &Record,
    join_table: &str,
) -> OrmResult<()> {
    let query = builder::join_insert(
        join_table,
        (&record.schema().fk_column(), record.saved_id()?),
        (&other.schema().fk_column(), other.saved_id()?),
    );
    mutate_join(driver, &query, record, other, join_table).await
}

/// Dissociates two saved records in the join table. Exactly one row must be
/// removed, else [`OrmError::UnexpectedNumUpdates`].
pub async fn remove_related_many_to_many(
    driver: &dyn Driver,
    record: &Record,
    other: &Record,
    join_table: &str,
) -> OrmResult<()> {
    let query = builder::join_delete(
        join_table,
        (&record.schema().fk_column(), record.saved_id()?),
        (&other.schema().fk_column(), other.saved_id()?),
    );
    mutate_join(driver, &query, record, other, join_table).await
}

async fn mutate_join(
    driver: &dyn Driver,
    query: &crate::query::Query,
    record: &Record,
    other: &Record,
    join_table: &str,
) -> OrmResult<()> {
    with_transaction(driver, || async {
        let affected = driver.execute(query).await?;
        if affected != 1 {
            return Err(OrmError::UnexpectedNumUpdates {
                expected: 1,
                actual: affected,
            });
        }
        Ok(())
    })
    .await?;
    debug!(
        entity = record.entity(),
        other = other.entity(),
        join_table,
        "join table mutated"
    );
    Ok(())
}

// ── Cardinality-agnostic wrappers ──────────────────────────────────────

/// Finds all records of the named relation, dispatching on the relation's
/// declared cardinality.
pub async fn find_related_many(
    registry: &SchemaRegistry,
    driver: &dyn Driver,
    record: &Record,
    relation: &str,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Vec<Record>> {
    let rel = record.schema().relation(relation)?;
    match rel.kind() {
        RelationKind::OneToMany => {
            let target_schema = registry.get(rel.target())?;
            find_related_many_to_one(driver, target_schema, record, where_clause, extras).await
        }
        RelationKind::ManyToMany { join_table } => {
            find_related_many_to_many(
                registry,
                driver,
                record,
                rel.target(),
                join_table,
                where_clause,
                extras,
            )
            .await
        }
    }
}

/// Finds the first record of the named relation, or `None`.
pub async fn find_related_many_first(
    registry: &SchemaRegistry,
    driver: &dyn Driver,
    record: &Record,
    relation: &str,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Option<Record>> {
    let extras = append_extras(extras, Extras::limit(1));
    let mut records = find_related_many(
        registry,
        driver,
        record,
        relation,
        where_clause,
        Some(extras),
    )
    .await?;
    if records.len() > 1 {
        return Err(OrmError::TooManyResults);
    }
    Ok(records.pop())
}

/// Finds at most `max` records of the named relation.
pub async fn find_related_many_max(
    registry: &SchemaRegistry,
    driver: &dyn Driver,
    record: &Record,
    relation: &str,
    max: u64,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Vec<Record>> {
    let extras = append_extras(extras, Extras::limit(max));
    find_related_many(registry, driver, record, relation, where_clause, Some(extras)).await
}

/// Finds at most `max` records of the named relation starting at offset
/// `first`.
pub async fn find_related_many_range(
    registry: &SchemaRegistry,
    driver: &dyn Driver,
    record: &Record,
    relation: &str,
    first: u64,
    max: u64,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Vec<Record>> {
    let extras = append_extras(extras, Extras::offset(first).with(Extra::Limit(max)));
    find_related_many(registry, driver, record, relation, where_clause, Some(extras)).await
}

/// Computes an aggregate over the named relation, dispatching on its
/// declared cardinality.
pub async fn aggregate_related_many(
    registry: &SchemaRegistry,
    driver: &dyn Driver,
    record: &Record,
    relation: &str,
    func: AggFunc,
    column: Option<&str>,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Value> {
    let rel = record.schema().relation(relation)?;
    match rel.kind() {
        RelationKind::OneToMany => {
            let target_schema = registry.get(rel.target())?;
            aggregate_related_many_to_one(
                driver,
                target_schema,
                record,
                func,
                column,
                where_clause,
                extras,
            )
            .await
        }
        RelationKind::ManyToMany { join_table } => {
            aggregate_related_many_to_many(
                registry,
                driver,
                record,
                rel.target(),
                join_table,
                func,
                column,
                where_clause,
                extras,
            )
            .await
        }
    }
}
