//! Entity schema descriptors and the schema registry.
//!
//! An [`EntitySchema`] is the explicit, construct-once description of one
//! entity type: its table, exposed fields (in fixed order), optional
//! discriminator column, declared relations, and lifecycle hooks. Entity
//! modules typically define their schema as a `LazyLock` static and register
//! it in a [`SchemaRegistry`] at startup; both are read-only afterwards, so
//! the runtime needs no locking of its own.
//!
//! # Examples
//!
//! ```
//! use std::sync::LazyLock;
//! use orma_db::field::{FieldDef, FieldKind};
//! use orma_db::schema::EntitySchema;
//!
//! static PERSON: LazyLock<EntitySchema> = LazyLock::new(|| {
//!     EntitySchema::builder("person")
//!         .field(FieldDef::new("name", FieldKind::Binary))
//!         .field(FieldDef::new("age", FieldKind::Integer))
//!         .one_to_many("project")
//!         .build()
//! });
//!
//! assert_eq!(PERSON.table(), "person");
//! assert_eq!(PERSON.fields().len(), 2);
//! ```

use std::collections::HashMap;

use orma_core::{OrmError, OrmResult};

use crate::field::FieldDef;
use crate::record::Record;

/// A lifecycle hook: may transform the record in place or abort the
/// enclosing operation by returning an error.
pub type Hook = fn(&mut Record) -> OrmResult<()>;

/// The optional lifecycle callbacks of one entity type.
///
/// Every slot defaults to a no-op. The lifecycle manager invokes them at
/// fixed pipeline points: before-op, op, after-op for save and delete, and
/// after-fetch once per record returned from any select.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hooks {
    before_save: Option<Hook>,
    after_save: Option<Hook>,
    before_delete: Option<Hook>,
    after_delete: Option<Hook>,
    after_fetch: Option<Hook>,
}

impl Hooks {
    /// Runs the before-save hook, if any.
    pub fn run_before_save(&self, record: &mut Record) -> OrmResult<()> {
        self.before_save.map_or(Ok(()), |hook| hook(record))
    }

    /// Runs the after-save hook, if any.
    pub fn run_after_save(&self, record: &mut Record) -> OrmResult<()> {
        self.after_save.map_or(Ok(()), |hook| hook(record))
    }

    /// Runs the before-delete hook, if any.
    pub fn run_before_delete(&self, record: &mut Record) -> OrmResult<()> {
        self.before_delete.map_or(Ok(()), |hook| hook(record))
    }

    /// Runs the after-delete hook, if any.
    pub fn run_after_delete(&self, record: &mut Record) -> OrmResult<()> {
        self.after_delete.map_or(Ok(()), |hook| hook(record))
    }

    /// Runs the after-fetch hook, if any.
    pub fn run_after_fetch(&self, record: &mut Record) -> OrmResult<()> {
        self.after_fetch.map_or(Ok(()), |hook| hook(record))
    }
}

/// The cardinality of a declared relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// The declaring entity is the "one" side; each target row carries a
    /// `<declaring_entity>_id` foreign key.
    OneToMany,
    /// Both sides relate through a join table carrying both foreign keys.
    ManyToMany {
        /// The join table name.
        join_table: &'static str,
    },
}

/// One declared relation of an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDef {
    name: &'static str,
    target: &'static str,
    kind: RelationKind,
}

impl RelationDef {
    /// Returns the relation name (defaults to the target entity name).
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the target entity type name.
    pub const fn target(&self) -> &'static str {
        self.target
    }

    /// Returns the relation cardinality.
    pub const fn kind(&self) -> RelationKind {
        self.kind
    }
}

/// The construct-once descriptor of one entity type.
///
/// Field order is fixed at construction and shared by every record of the
/// type; the implicit `id` primary key is never listed among the fields.
#[derive(Debug)]
pub struct EntitySchema {
    name: &'static str,
    table: &'static str,
    fields: Vec<FieldDef>,
    field_index: HashMap<&'static str, usize>,
    discriminator: Option<&'static str>,
    relations: Vec<RelationDef>,
    hooks: Hooks,
}

impl EntitySchema {
    /// Starts building a schema for the named entity type.
    pub fn builder(name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            name,
            table: None,
            fields: Vec::new(),
            discriminator: None,
            relations: Vec::new(),
            hooks: Hooks::default(),
        }
    }

    /// Returns the entity type name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the table name.
    pub const fn table(&self) -> &'static str {
        self.table
    }

    /// Returns the exposed fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Returns the discriminator column name, if declared.
    pub const fn discriminator(&self) -> Option<&'static str> {
        self.discriminator
    }

    /// Returns the declared relations.
    pub fn relations(&self) -> &[RelationDef] {
        &self.relations
    }

    /// Returns the lifecycle hooks.
    pub const fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Returns the foreign-key column name other tables use to reference
    /// this entity (`<entity>_id`).
    pub fn fk_column(&self) -> String {
        format!("{}_id", self.name)
    }

    /// Resolves a field name to its position in the fixed field order.
    pub fn field_position(&self, name: &str) -> Option<usize> {
        self.field_index.get(name).copied()
    }

    /// Resolves a field name to its descriptor.
    pub fn field(&self, name: &str) -> OrmResult<&FieldDef> {
        self.field_position(name)
            .map(|idx| &self.fields[idx])
            .ok_or_else(|| OrmError::UnknownField(name.to_string()))
    }

    /// Resolves a relation by name.
    pub fn relation(&self, name: &str) -> OrmResult<&RelationDef> {
        self.relations
            .iter()
            .find(|rel| rel.name == name)
            .ok_or_else(|| OrmError::UnknownEntity(name.to_string()))
    }
}

/// Builder for [`EntitySchema`]; defaulting is resolved in [`build`].
///
/// [`build`]: SchemaBuilder::build
pub struct SchemaBuilder {
    name: &'static str,
    table: Option<&'static str>,
    fields: Vec<FieldDef>,
    discriminator: Option<&'static str>,
    relations: Vec<RelationDef>,
    hooks: Hooks,
}

impl SchemaBuilder {
    /// Overrides the table name (defaults to the entity name).
    #[must_use]
    pub const fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    /// Adds one exposed field.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares a discriminator column used to multiplex several entity
    /// types over one physical table.
    #[must_use]
    pub const fn discriminator(mut self, column: &'static str) -> Self {
        self.discriminator = Some(column);
        self
    }

    /// Declares a one-to-many relation to `target` under the default name
    /// (the target entity name).
    #[must_use]
    pub fn one_to_many(mut self, target: &'static str) -> Self {
        self.relations.push(RelationDef {
            name: target,
            target,
            kind: RelationKind::OneToMany,
        });
        self
    }

    /// Declares a many-to-many relation to `target` through `join_table`.
    #[must_use]
    pub fn many_to_many(mut self, target: &'static str, join_table: &'static str) -> Self {
        self.relations.push(RelationDef {
            name: target,
            target,
            kind: RelationKind::ManyToMany { join_table },
        });
        self
    }

    /// Sets the before-save hook.
    #[must_use]
    pub const fn before_save(mut self, hook: Hook) -> Self {
        self.hooks.before_save = Some(hook);
        self
    }

    /// Sets the after-save hook.
    #[must_use]
    pub const fn after_save(mut self, hook: Hook) -> Self {
        self.hooks.after_save = Some(hook);
        self
    }

    /// Sets the before-delete hook.
    #[must_use]
    pub const fn before_delete(mut self, hook: Hook) -> Self {
        self.hooks.before_delete = Some(hook);
        self
    }

    /// Sets the after-delete hook.
    #[must_use]
    pub const fn after_delete(mut self, hook: Hook) -> Self {
        self.hooks.after_delete = Some(hook);
        self
    }

    /// Sets the after-fetch hook.
    #[must_use]
    pub const fn after_fetch(mut self, hook: Hook) -> Self {
        self.hooks.after_fetch = Some(hook);
        self
    }

    /// Finalizes the schema, resolving defaults and building the
    /// field-name lookup table.
    ///
    /// # Panics
    ///
    /// Panics if two fields share a name, or if a field is named `id`
    /// (the primary key is implicit).
    pub fn build(self) -> EntitySchema {
        let mut field_index = HashMap::with_capacity(self.fields.len());
        for (idx, field) in self.fields.iter().enumerate() {
            assert_ne!(field.name(), "id", "the 'id' primary key is implicit");
            let previous = field_index.insert(field.name(), idx);
            assert!(
                previous.is_none(),
                "duplicate field '{}' in schema '{}'",
                field.name(),
                self.name
            );
        }
        EntitySchema {
            name: self.name,
            table: self.table.unwrap_or(self.name),
            fields: self.fields,
            field_index,
            discriminator: self.discriminator,
            relations: self.relations,
            hooks: self.hooks,
        }
    }
}

/// The name-to-schema map the relationship resolver traverses.
///
/// Populated during initialization and read-only afterwards.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: HashMap<&'static str, &'static EntitySchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity schema under its own name.
    pub fn register(&mut self, schema: &'static EntitySchema) {
        self.entries.insert(schema.name(), schema);
    }

    /// Looks up a schema by entity type name.
    pub fn get(&self, name: &str) -> OrmResult<&'static EntitySchema> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| OrmError::UnknownEntity(name.to_string()))
    }

    /// Returns `true` if the entity type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of registered entity types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entity types are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
