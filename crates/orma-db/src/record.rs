//! Records: in-memory instances of entity types.
//!
//! A [`Record`] carries its schema reference, its persistence state, the
//! primary key (once assigned), and the field values in the schema's fixed
//! order. Records are plain owned values; exclusive ownership (`&mut`)
//! supplies the no-shared-mutation contract.
//!
//! Lifecycle: a record is created [`RecordState::New`] with every field
//! absent, becomes [`RecordState::Saved`] exactly once on successful insert,
//! may then be updated repeatedly, and is terminal once
//! [`RecordState::Deleted`] — further save or delete attempts fail with
//! [`OrmError::NotSaved`].

use orma_core::{OrmError, OrmResult};

use crate::driver::Row;
use crate::schema::EntitySchema;
use crate::value::Value;

/// The persistence state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// In memory only; no row exists yet.
    New,
    /// Backed by a row; `id` is assigned.
    Saved,
    /// The backing row has been deleted; the record is unusable for
    /// further persistence calls.
    Deleted,
}

/// An in-memory instance of an entity type.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
/// use orma_db::field::{FieldDef, FieldKind};
/// use orma_db::record::Record;
/// use orma_db::schema::EntitySchema;
/// use orma_db::value::Value;
///
/// static PERSON: LazyLock<EntitySchema> = LazyLock::new(|| {
///     EntitySchema::builder("person")
///         .field(FieldDef::new("name", FieldKind::Binary))
///         .field(FieldDef::new("age", FieldKind::Integer))
///         .build()
/// });
///
/// let rec = Record::from_strings(&PERSON, &[("name", "Joe"), ("age", "30")]).unwrap();
/// assert!(rec.is_new());
/// assert_eq!(rec.get("age").unwrap(), &Value::Int(30));
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    schema: &'static EntitySchema,
    state: RecordState,
    id: Option<i64>,
    values: Vec<Value>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name()
            && self.state == other.state
            && self.id == other.id
            && self.values == other.values
    }
}

impl Record {
    /// Creates a new record with every field absent.
    pub fn new(schema: &'static EntitySchema) -> Self {
        Self {
            schema,
            state: RecordState::New,
            id: None,
            values: vec![Value::Null; schema.fields().len()],
        }
    }

    /// Creates a new record and applies the given field assignments.
    pub fn with_fields(
        schema: &'static EntitySchema,
        fields: &[(&str, Value)],
    ) -> OrmResult<Self> {
        let mut record = Self::new(schema);
        record.set_fields(fields)?;
        Ok(record)
    }

    /// Creates a new record, parsing each value from its string form
    /// through the field's descriptor.
    pub fn from_strings(
        schema: &'static EntitySchema,
        fields: &[(&str, &str)],
    ) -> OrmResult<Self> {
        let mut record = Self::new(schema);
        record.set_fields_from_strings(fields)?;
        Ok(record)
    }

    /// Applies a list of field assignments.
    ///
    /// Fails with [`OrmError::UnknownField`] if a key does not match any
    /// exposed field; earlier assignments in the list are retained.
    pub fn set_fields(&mut self, fields: &[(&str, Value)]) -> OrmResult<()> {
        for (name, value) in fields {
            self.set(name, value.clone())?;
        }
        Ok(())
    }

    /// Applies a list of field assignments given in string form.
    pub fn set_fields_from_strings(&mut self, fields: &[(&str, &str)]) -> OrmResult<()> {
        for (name, input) in fields {
            let value = self.schema.field(name)?.value_from_str(input)?;
            self.set(name, value)?;
        }
        Ok(())
    }

    /// Returns the value of the named field.
    pub fn get(&self, name: &str) -> OrmResult<&Value> {
        self.schema
            .field_position(name)
            .map(|idx| &self.values[idx])
            .ok_or_else(|| OrmError::UnknownField(name.to_string()))
    }

    /// Sets the named field.
    pub fn set(&mut self, name: &str, value: Value) -> OrmResult<()> {
        let idx = self
            .schema
            .field_position(name)
            .ok_or_else(|| OrmError::UnknownField(name.to_string()))?;
        self.values[idx] = value;
        Ok(())
    }

    /// Returns the primary key, assigned once the record is saved.
    pub const fn id(&self) -> Option<i64> {
        self.id
    }

    /// Returns `true` if the record has never been persisted.
    pub const fn is_new(&self) -> bool {
        matches!(self.state, RecordState::New)
    }

    /// Returns the persistence state.
    pub const fn state(&self) -> RecordState {
        self.state
    }

    /// Returns the entity type name.
    pub const fn entity(&self) -> &'static str {
        self.schema.name()
    }

    /// Returns the schema this record belongs to.
    pub const fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Returns all field values in schema order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns all field name-value pairs in schema order.
    pub fn field_values(&self) -> Vec<(&'static str, Value)> {
        self.schema
            .fields()
            .iter()
            .zip(&self.values)
            .map(|(field, value)| (field.name(), value.clone()))
            .collect()
    }

    /// Returns the primary key of a saved record, or [`OrmError::NotSaved`].
    pub(crate) fn saved_id(&self) -> OrmResult<i64> {
        match self.state {
            RecordState::Saved => self.id.ok_or(OrmError::NotSaved),
            RecordState::New | RecordState::Deleted => Err(OrmError::NotSaved),
        }
    }

    /// Transitions the record to `Saved` with its generated key.
    pub(crate) fn mark_saved(&mut self, id: i64) {
        self.state = RecordState::Saved;
        self.id = Some(id);
    }

    /// Transitions the record to its terminal `Deleted` state.
    pub(crate) fn mark_deleted(&mut self) {
        self.state = RecordState::Deleted;
        self.id = None;
    }

    /// Hydrates a saved record from a driver row.
    ///
    /// The row must carry an integer `id` column plus one column per
    /// exposed field; a missing column or a non-integer id surfaces as
    /// [`OrmError::DriverError`].
    pub(crate) fn from_row(schema: &'static EntitySchema, row: &Row) -> OrmResult<Self> {
        let id = row
            .value("id")
            .and_then(Value::as_int)
            .ok_or_else(|| OrmError::DriverError("row is missing an integer 'id'".into()))?;

        let mut values = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let value = row.value(field.name()).ok_or_else(|| {
                OrmError::DriverError(format!("row is missing column '{}'", field.name()))
            })?;
            values.push(value.clone());
        }

        Ok(Self {
            schema,
            state: RecordState::Saved,
            id: Some(id),
            values,
        })
    }
}
