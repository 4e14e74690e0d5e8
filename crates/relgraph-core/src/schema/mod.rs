//! Entity registry with lazy, memoized resolution.
//!
//! Entities are defined as thunks so that mutually-referential models only
//! exchange `EntityRef` handles while they are being built. A `Schema` is
//! immutable once constructed; `bootstrap` resolves and checks every entity
//! once before the schema is used.

mod cell;
mod validate;


use crate::{
    error::SchemaError,
    model::{EntityModel, RelationModel},
    obs::{ValidationEvent, sink::record},
};
use cell::LazyCell;
use serde::{Serialize, Serializer};
use std::{collections::BTreeMap, fmt, sync::OnceLock};

///
/// EntityRef
///
/// Handle to an entity slot in a `Schema`. Handles are available before the
/// target model has been built.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntityRef {
    index: usize,
    name: &'static str,
}

impl EntityRef {
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for EntityRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

///
/// SchemaBuilder
///

#[derive(Default)]
pub struct SchemaBuilder {
    entries: Vec<Entry>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity thunk. The thunk runs at most once, on first
    /// resolution, and must return a model with the same name.
    #[must_use]
    pub fn define(
        mut self,
        name: &'static str,
        thunk: impl Fn(&Schema) -> Result<EntityModel, SchemaError> + Send + Sync + 'static,
    ) -> Self {
        let cell = LazyCell::new(move |schema: &Schema| {
            let model = thunk(schema)?;
            if model.name != name {
                return Err(SchemaError::NameMismatch {
                    expected: name.to_string(),
                    found: model.name.to_string(),
                });
            }

            Ok(model)
        });

        self.entries.push(Entry { name, cell });
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut index = BTreeMap::new();

        for (i, entry) in self.entries.iter().enumerate() {
            if index.insert(entry.name, i).is_some() {
                return Err(SchemaError::DuplicateEntity {
                    name: entry.name.to_string(),
                });
            }
        }

        Ok(Schema {
            entries: self.entries,
            index,
            bootstrapped: OnceLock::new(),
        })
    }
}

struct Entry {
    name: &'static str,
    cell: LazyCell<Schema, EntityModel>,
}

///
/// Schema
///

pub struct Schema {
    entries: Vec<Entry>,
    index: BTreeMap<&'static str, usize>,
    bootstrapped: OnceLock<()>,
}

impl Schema {
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Return a handle for `name` without resolving anything.
    pub fn lookup(&self, name: &str) -> Result<EntityRef, SchemaError> {
        self.index
            .get_key_value(name)
            .map(|(&name, &index)| EntityRef { index, name })
            .ok_or_else(|| SchemaError::UnknownEntity {
                name: name.to_string(),
            })
    }

    /// Resolve a handle to its model, running its thunk on first use.
    pub fn resolve(&self, entity: EntityRef) -> Result<&EntityModel, SchemaError> {
        let entry = self.entry(entity)?;
        if let Some(model) = entry.cell.get() {
            return Ok(model);
        }

        tracing::trace!(entity = entry.name, "resolving entity");

        match entry.cell.get_or_try_init(self, entry.name) {
            Ok(model) => {
                record(ValidationEvent::Resolved { entity: entry.name });
                Ok(model)
            }
            Err(err) => {
                if matches!(&err, SchemaError::Cycle { entity } if entity == entry.name) {
                    tracing::debug!(entity = entry.name, "self-referential resolution");
                    record(ValidationEvent::CycleDetected { entity: entry.name });
                }

                Err(err)
            }
        }
    }

    /// Resolve the target of a relation.
    pub fn resolve_relation(&self, relation: &RelationModel) -> Result<&EntityModel, SchemaError> {
        self.resolve(relation.target)
    }

    /// Resolve by name.
    pub fn model(&self, name: &str) -> Result<&EntityModel, SchemaError> {
        self.resolve(self.lookup(name)?)
    }

    #[must_use]
    pub fn is_resolved(&self, entity: EntityRef) -> bool {
        self.entry(entity).is_ok_and(|entry| entry.cell.get().is_some())
    }

    /// Handles for every defined entity, in definition order.
    pub fn entities(&self) -> impl Iterator<Item = EntityRef> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| EntityRef {
                index,
                name: entry.name,
            })
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every entity and check the whole graph.
    ///
    /// Idempotent: once it has succeeded, later calls return immediately.
    pub fn bootstrap(&self) -> Result<(), SchemaError> {
        if self.is_bootstrapped() {
            return Ok(());
        }

        let models = self.describe()?;
        for model in &models {
            model.check()?;
        }
        validate::check_relations(self, &models)?;

        if self.bootstrapped.set(()).is_ok() {
            tracing::debug!(entities = models.len(), "schema bootstrapped");
            record(ValidationEvent::Bootstrapped {
                entities: models.len(),
            });
        }

        Ok(())
    }

    #[must_use]
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped.get().is_some()
    }

    /// Resolve and return every model, in definition order.
    pub fn describe(&self) -> Result<Vec<&EntityModel>, SchemaError> {
        self.entities().map(|entity| self.resolve(entity)).collect()
    }

    fn entry(&self, entity: EntityRef) -> Result<&Entry, SchemaError> {
        self.entries
            .get(entity.index)
            .filter(|entry| entry.name == entity.name)
            .ok_or_else(|| SchemaError::UnknownEntity {
                name: entity.name.to_string(),
            })
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field(
                "entities",
                &self.entries.iter().map(|e| e.name).collect::<Vec<_>>(),
            )
            .field("bootstrapped", &self.is_bootstrapped())
            .finish()
    }
}
