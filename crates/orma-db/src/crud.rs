//! Generic CRUD operations over registered entity schemas.
//!
//! These free functions are the persistence surface of the runtime: they
//! build queries through [`builder`](crate::query::builder), execute them
//! through a [`Driver`], hydrate results into [`Record`]s, and run the
//! schema's lifecycle hooks at the fixed pipeline points (before-op, op,
//! after-op; after-fetch once per fetched record).
//!
//! Every write path runs inside a single driver transaction via
//! [`with_transaction`], so a statement and its dependent follow-up (e.g.
//! fetching the generated id after an insert) commit or roll back together.

use std::future::Future;

use orma_core::{OrmError, OrmResult};
use tracing::debug;

use crate::driver::Driver;
use crate::query::ast::{append_extras, AggFunc, Extra, Extras, Query, WhereExpr};
use crate::query::builder;
use crate::record::{Record, RecordState};
use crate::schema::EntitySchema;
use crate::value::Value;

/// Runs `body` inside a driver transaction: begins, commits on `Ok`, rolls
/// back on `Err`. The body's error is surfaced unchanged; a rollback failure
/// is ignored in favor of the original error.
pub async fn with_transaction<T, F, Fut>(driver: &dyn Driver, body: F) -> OrmResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = OrmResult<T>>,
{
    driver.begin_transaction().await?;
    match body().await {
        Ok(value) => {
            driver.commit().await?;
            Ok(value)
        }
        Err(err) => {
            let _ = driver.rollback().await;
            Err(err)
        }
    }
}

/// Executes a select and hydrates every row into a saved [`Record`],
/// running the schema's after-fetch hook once per record.
pub async fn select_records(
    driver: &dyn Driver,
    schema: &'static EntitySchema,
    query: &Query,
) -> OrmResult<Vec<Record>> {
    let rows = driver.select(query).await?;
    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut record = Record::from_row(schema, row)?;
        schema.hooks().run_after_fetch(&mut record)?;
        records.push(record);
    }
    Ok(records)
}

/// Finds all records matching the where-clause, honoring extras.
pub async fn find(
    driver: &dyn Driver,
    schema: &'static EntitySchema,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Vec<Record>> {
    let query = builder::select_query(schema, where_clause, extras);
    select_records(driver, schema, &query).await
}

/// Finds the first matching record, or `None`.
pub async fn find_first(
    driver: &dyn Driver,
    schema: &'static EntitySchema,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Option<Record>> {
    let extras = append_extras(extras, Extras::limit(1));
    let mut records = find(driver, schema, where_clause, Some(extras)).await?;
    if records.len() > 1 {
        return Err(OrmError::TooManyResults);
    }
    Ok(records.pop())
}

/// Finds at most `max` matching records.
pub async fn find_max(
    driver: &dyn Driver,
    schema: &'static EntitySchema,
    max: u64,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Vec<Record>> {
    let extras = append_extras(extras, Extras::limit(max));
    find(driver, schema, where_clause, Some(extras)).await
}

/// Finds at most `max` matching records starting at offset `first`.
pub async fn find_range(
    driver: &dyn Driver,
    schema: &'static EntitySchema,
    first: u64,
    max: u64,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Vec<Record>> {
    let extras = append_extras(
        extras,
        Extras::offset(first).with(Extra::Limit(max)),
    );
    find(driver, schema, where_clause, Some(extras)).await
}

/// Finds the record with the given id, or `None`.
pub async fn find_id(
    driver: &dyn Driver,
    schema: &'static EntitySchema,
    id: i64,
) -> OrmResult<Option<Record>> {
    let mut records = find(driver, schema, Some(WhereExpr::eq("id", id)), None).await?;
    if records.len() > 1 {
        return Err(OrmError::TooManyResults);
    }
    Ok(records.pop())
}

/// Computes an aggregate over the matching rows and returns the scalar.
pub async fn aggregate(
    driver: &dyn Driver,
    schema: &'static EntitySchema,
    func: AggFunc,
    column: Option<&str>,
    where_clause: Option<WhereExpr>,
    extras: Option<Extras>,
) -> OrmResult<Value> {
    let query = builder::aggregate_query(schema, func, column, where_clause, extras);
    scalar(driver, &query).await
}

/// Counts the matching rows.
pub async fn count(
    driver: &dyn Driver,
    schema: &'static EntitySchema,
    where_clause: Option<WhereExpr>,
) -> OrmResult<i64> {
    let value = aggregate(driver, schema, AggFunc::Count, None, where_clause, None).await?;
    value
        .as_int()
        .ok_or_else(|| OrmError::DriverError(format!("count returned a non-integer: {value}")))
}

/// Executes an aggregate-shaped select and extracts its single value.
pub(crate) async fn scalar(driver: &dyn Driver, query: &Query) -> OrmResult<Value> {
    let rows = driver.select(query).await?;
    if rows.len() > 1 {
        return Err(OrmError::TooManyResults);
    }
    let row = rows
        .first()
        .ok_or_else(|| OrmError::DriverError("aggregate query returned no rows".into()))?;
    row.value_at(0)
        .cloned()
        .ok_or_else(|| OrmError::DriverError("aggregate row is empty".into()))
}

/// Persists a record: insert when new, update when already saved.
///
/// Runs the before-save hook, then the statement inside one transaction
/// (the insert path also fetches the generated id atomically), then the
/// after-save hook. An update must affect 0 or 1 rows; any other count is
/// [`OrmError::UnexpectedNumUpdates`]. A deleted record is rejected with
/// [`OrmError::NotSaved`].
pub async fn save(driver: &dyn Driver, record: &mut Record) -> OrmResult<()> {
    let schema = record.schema();
    if record.state() == RecordState::Deleted {
        return Err(OrmError::NotSaved);
    }
    schema.hooks().run_before_save(record)?;

    if record.is_new() {
        let query = builder::insert_query(schema, &record.field_values());
        let id = with_transaction(driver, || async {
            let affected = driver.execute(&query).await?;
            if affected != 1 {
                return Err(OrmError::UnexpectedNumUpdates {
                    expected: 1,
                    actual: affected,
                });
            }
            driver.last_insert_id().await
        })
        .await?;
        record.mark_saved(id);
        debug!(entity = schema.name(), id, "inserted record");
    } else {
        let id = record.saved_id()?;
        let query = builder::update_query(schema, id, &record.field_values());
        let affected = with_transaction(driver, || async {
            let affected = driver.execute(&query).await?;
            if affected > 1 {
                return Err(OrmError::UnexpectedNumUpdates {
                    expected: 1,
                    actual: affected,
                });
            }
            Ok(affected)
        })
        .await?;
        debug!(entity = schema.name(), id, affected, "updated record");
    }

    schema.hooks().run_after_save(record)
}

/// Deletes a persisted record by id.
///
/// The record must be saved (else [`OrmError::NotSaved`]). Exactly one row
/// must be affected: zero means the backing row is already gone
/// ([`OrmError::DeleteFailed`]), more than one means the table's identity
/// assumption is broken ([`OrmError::TooManyRowsDeleted`]). On success the
/// record transitions to its terminal deleted state.
pub async fn delete(driver: &dyn Driver, record: &mut Record) -> OrmResult<()> {
    let schema = record.schema();
    let id = record.saved_id()?;
    schema.hooks().run_before_delete(record)?;

    let query = builder::delete_by_id_query(schema, id);
    with_transaction(driver, || async {
        let affected = driver.execute(&query).await?;
        match affected {
            1 => Ok(()),
            0 => Err(OrmError::DeleteFailed),
            n => Err(OrmError::TooManyRowsDeleted(n)),
        }
    })
    .await?;
    record.mark_deleted();
    debug!(entity = schema.name(), id, "deleted record");

    schema.hooks().run_after_delete(record)
}

/// Deletes all rows matching the where-clause. Returns the count removed.
pub async fn delete_where(
    driver: &dyn Driver,
    schema: &'static EntitySchema,
    where_clause: Option<WhereExpr>,
) -> OrmResult<u64> {
    let query = builder::delete_query(schema, where_clause);
    let affected = with_transaction(driver, || async { driver.execute(&query).await }).await?;
    debug!(entity = schema.name(), affected, "bulk delete");
    Ok(affected)
}

/// Deletes every row of the entity's table (respecting the discriminator).
pub async fn delete_all(driver: &dyn Driver, schema: &'static EntitySchema) -> OrmResult<u64> {
    delete_where(driver, schema, None).await
}
