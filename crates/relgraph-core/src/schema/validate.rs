use crate::{
    error::SchemaError,
    model::{EntityModel, RelationModel, RelationSide},
    schema::Schema,
};

/// Check every relation against its target and its back-reference.
pub(super) fn check_relations(schema: &Schema, models: &[&EntityModel]) -> Result<(), SchemaError> {
    for model in models {
        for relation in &model.relations {
            let target = schema.resolve_relation(relation)?;
            let back = back_reference(model, relation, target)?;

            check_sides(model, relation, back)?;

            if let RelationSide::OwnsForeignKey { fields, references } = relation.side {
                check_references(model, relation, target, fields, references)?;
            }
        }
    }

    Ok(())
}

fn back_reference<'a>(
    model: &EntityModel,
    relation: &RelationModel,
    target: &'a EntityModel,
) -> Result<&'a RelationModel, SchemaError> {
    let back = target.relation(relation.back_reference).ok_or_else(|| {
        SchemaError::relation(
            model.name,
            relation.name,
            format!(
                "back-reference '{}' is not a relation of '{}'",
                relation.back_reference, target.name
            ),
        )
    })?;

    if back.target.name() != model.name || back.back_reference != relation.name {
        return Err(SchemaError::relation(
            model.name,
            relation.name,
            format!(
                "back-reference '{}.{}' does not point back to this relation",
                target.name, back.name
            ),
        ));
    }

    Ok(back)
}

fn check_sides(
    model: &EntityModel,
    relation: &RelationModel,
    back: &RelationModel,
) -> Result<(), SchemaError> {
    if relation.is_required() && !relation.owns_foreign_key() {
        return Err(SchemaError::relation(
            model.name,
            relation.name,
            "a required to-one relation must own its foreign key",
        ));
    }

    let owners = usize::from(relation.owns_foreign_key()) + usize::from(back.owns_foreign_key());

    let message = match (relation.is_many(), back.is_many(), owners) {
        (true, true, 0) | (_, _, 1) => return Ok(()),
        (true, true, _) => "many-to-many relations cannot own a foreign key",
        (_, _, 0) => "neither side of the relation owns a foreign key",
        _ => "both sides of the relation own a foreign key",
    };

    Err(SchemaError::relation(model.name, relation.name, message))
}

fn check_references(
    model: &EntityModel,
    relation: &RelationModel,
    target: &EntityModel,
    fields: &[&str],
    references: &[&str],
) -> Result<(), SchemaError> {
    if fields.len() != references.len() {
        return Err(SchemaError::relation(
            model.name,
            relation.name,
            "foreign key and references differ in length",
        ));
    }

    for (local, remote) in fields.iter().zip(references) {
        let Some(referenced) = target.field(remote) else {
            return Err(SchemaError::relation(
                model.name,
                relation.name,
                format!("referenced field '{}.{remote}' does not exist", target.name),
            ));
        };

        // local existence is checked by EntityModel::check
        if let Some(local_field) = model.field(local)
            && local_field.kind != referenced.kind
        {
            return Err(SchemaError::relation(
                model.name,
                relation.name,
                format!(
                    "foreign key '{local}' has type {} but '{}.{remote}' has type {}",
                    local_field.scalar(),
                    target.name,
                    referenced.scalar(),
                ),
            ));
        }
    }

    let is_unique = match references {
        [single] => target.field(single).is_some_and(|f| f.unique),
        _ => target
            .uniques
            .iter()
            .any(|u| u.fields.len() == references.len() && references.iter().all(|r| u.contains(r))),
    };

    if !is_unique {
        return Err(SchemaError::relation(
            model.name,
            relation.name,
            format!(
                "references [{}] are not a unique key of '{}'",
                references.join(", "),
                target.name
            ),
        ));
    }

    Ok(())
}
