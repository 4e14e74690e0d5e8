use crate::{
    error::SchemaError,
    model::{FieldDefault, FieldModel, RelationModel, UniqueModel},
    value::coerce_literal,
};
use serde::Serialize;
use std::collections::BTreeSet;

///
/// Member
/// A field or relation looked up by name.
///

#[derive(Clone, Copy, Debug)]
pub enum Member<'a> {
    Field(&'a FieldModel),
    Relation(&'a RelationModel),
}

///
/// EntityModel
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EntityModel {
    pub name: &'static str,
    pub fields: Vec<FieldModel>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<RelationModel>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uniques: Vec<UniqueModel>,
}

impl EntityModel {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            relations: Vec::new(),
            uniques: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldModel) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_relation(mut self, relation: RelationModel) -> Self {
        self.relations.push(relation);
        self
    }

    #[must_use]
    pub fn with_unique(mut self, unique: UniqueModel) -> Self {
        self.uniques.push(unique);
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationModel> {
        self.relations.iter().find(|r| r.name == name)
    }

    #[must_use]
    pub fn member(&self, name: &str) -> Option<Member<'_>> {
        self.field(name)
            .map(Member::Field)
            .or_else(|| self.relation(name).map(Member::Relation))
    }

    #[must_use]
    pub fn compound(&self, label: &str) -> Option<&UniqueModel> {
        self.uniques.iter().find(|u| u.label == label)
    }

    /// Fields that are unique on their own.
    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldModel> {
        self.fields.iter().filter(|f| f.unique)
    }

    /// Owning relation whose foreign key includes `field`.
    #[must_use]
    pub fn owner_of_fk(&self, field: &str) -> Option<&RelationModel> {
        self.relations
            .iter()
            .find(|r| r.fk_fields().contains(&field))
    }

    #[must_use]
    pub fn is_fk_field(&self, field: &str) -> bool {
        self.owner_of_fk(field).is_some()
    }

    /// Check the model on its own, without looking at other entities.
    pub fn check(&self) -> Result<(), SchemaError> {
        self.check_members()?;

        for field in &self.fields {
            self.check_field(field)?;
        }
        for relation in &self.relations {
            self.check_relation_fields(relation)?;
        }
        for unique in &self.uniques {
            self.check_unique(unique)?;
        }

        if self.unique_fields().next().is_none() && self.uniques.is_empty() {
            return Err(SchemaError::NoUniqueSelector {
                entity: self.name.to_string(),
            });
        }

        Ok(())
    }

    fn check_members(&self) -> Result<(), SchemaError> {
        let mut seen = BTreeSet::new();
        let names = self
            .fields
            .iter()
            .map(|f| f.name)
            .chain(self.relations.iter().map(|r| r.name));

        for name in names {
            if !seen.insert(name) {
                return Err(SchemaError::DuplicateMember {
                    entity: self.name.to_string(),
                    member: name.to_string(),
                });
            }
        }

        Ok(())
    }

    fn check_field(&self, field: &FieldModel) -> Result<(), SchemaError> {
        if field.unique && !field.scalar().is_keyable() {
            return Err(SchemaError::field(
                self.name,
                field.name,
                format!("{} fields cannot be unique", field.scalar()),
            ));
        }
        if field.id && field.nullable {
            return Err(SchemaError::field(
                self.name,
                field.name,
                "identifier cannot be nullable",
            ));
        }

        if let Some(FieldDefault::Literal(raw)) = &field.default
            && !(raw.is_null() && field.nullable)
        {
            coerce_literal(field.kind, raw).map_err(|err| {
                SchemaError::field(self.name, field.name, format!("invalid default: {err}"))
            })?;
        }

        Ok(())
    }

    fn check_relation_fields(&self, relation: &RelationModel) -> Result<(), SchemaError> {
        let fk = relation.fk_fields();

        if fk.is_empty() {
            if relation.owns_foreign_key() {
                return Err(SchemaError::relation(
                    self.name,
                    relation.name,
                    "owning side declares no foreign key fields",
                ));
            }

            return Ok(());
        }

        if relation.is_many() {
            return Err(SchemaError::relation(
                self.name,
                relation.name,
                "a to-many relation cannot own a foreign key",
            ));
        }

        for name in fk {
            let Some(field) = self.field(name) else {
                return Err(SchemaError::relation(
                    self.name,
                    relation.name,
                    format!("foreign key field '{name}' does not exist"),
                ));
            };

            if field.nullable != relation.is_nullable() {
                return Err(SchemaError::relation(
                    self.name,
                    relation.name,
                    format!(
                        "foreign key field '{name}' must be {} to match cardinality {}",
                        if relation.is_nullable() {
                            "nullable"
                        } else {
                            "required"
                        },
                        relation.cardinality,
                    ),
                ));
            }
        }

        Ok(())
    }

    fn check_unique(&self, unique: &UniqueModel) -> Result<(), SchemaError> {
        if unique.fields.len() < 2 {
            return Err(SchemaError::unique(
                self.name,
                &unique.label,
                "compound keys need at least two fields",
            ));
        }
        if self.member(&unique.label).is_some() {
            return Err(SchemaError::unique(
                self.name,
                &unique.label,
                "label collides with a field or relation",
            ));
        }
        if self.uniques.iter().filter(|u| u.label == unique.label).count() > 1 {
            return Err(SchemaError::unique(
                self.name,
                &unique.label,
                "label is used by more than one key",
            ));
        }

        for name in &unique.fields {
            match self.field(name) {
                Some(field) if field.scalar().is_keyable() => {}
                Some(field) => {
                    return Err(SchemaError::unique(
                        self.name,
                        &unique.label,
                        format!("member '{name}' has non-keyable type {}", field.scalar()),
                    ));
                }
                None => {
                    return Err(SchemaError::unique(
                        self.name,
                        &unique.label,
                        format!("member '{name}' is not a field"),
                    ));
                }
            }
        }

        Ok(())
    }
}
