use super::{table_key, SqlGenerator, Template};
use crate::{ident::TableIdent, Query, QueryKind};

use strata_core::{
    entity::Entity,
    schema::{ManyToManyProperty, ManyToOneProperty, MapProperty, Property},
    stmt::Parameter,
};

/// Clears the link rows/columns of one relationship property ahead of the
/// matching save pass, so stale references never survive a rewrite.
pub(super) fn generate(generator: &SqlGenerator, entity: &dyn Entity, property: &str) -> Vec<Query> {
    match generator.property(property) {
        Some(Property::ManyToMany(property)) => many_to_many(generator, entity, &property),
        Some(Property::Map(property)) => map(generator, entity, &property),
        Some(Property::ManyToOne(property)) => many_to_one(generator, entity, &property),
        _ => vec![],
    }
}

/// Removes every join row belonging to the owner.
fn many_to_many(
    generator: &SqlGenerator,
    entity: &dyn Entity,
    property: &ManyToManyProperty,
) -> Vec<Query> {
    if property.table_name.is_empty() {
        return vec![];
    }

    let templates = generator.cached(QueryKind::JoinsDelete, &property.name, || {
        let table = TableIdent {
            schema: &property.parent_schema,
            table: &property.table_name,
        }
        .to_string();

        let conditions: Vec<String> = property
            .owner_columns
            .iter()
            .map(|link| format!("{table}.[{}] = @{}", link.column_name, link.column_name))
            .collect();

        vec![Template {
            associated_type: generator.ty(),
            text: format!("DELETE FROM {table} WHERE {};", conditions.join(" AND ")),
        }]
    });

    let parameters: Vec<Parameter> = property
        .owner_columns
        .iter()
        .map(|link| Parameter::new(link.column_name.clone(), entity.get(&link.property)))
        .collect();

    templates
        .into_iter()
        .map(|template| {
            Query::new(template.associated_type, template.text, QueryKind::JoinsDelete)
                .with_parameters(parameters.clone())
        })
        .collect()
}

/// Nulls the foreign-key columns on the owning table.
fn map(generator: &SqlGenerator, entity: &dyn Entity, property: &MapProperty) -> Vec<Query> {
    if property.columns.is_empty() {
        return vec![];
    }
    let Ok(owner) = generator.source().mapping(property.parent) else {
        return vec![];
    };

    let templates = generator.cached(QueryKind::JoinsDelete, &property.name, || {
        let table = TableIdent {
            schema: &property.parent_schema,
            table: &property.parent_table,
        }
        .to_string();

        let sets: Vec<String> = property
            .columns
            .iter()
            .map(|link| format!("{table}.[{}] = NULL", link.column_name))
            .collect();
        let conditions: Vec<String> = table_key(owner)
            .iter()
            .map(|key| format!("{table}.[{}] = @{}", key.column, key.parameter))
            .collect();

        vec![Template {
            associated_type: generator.ty(),
            text: format!(
                "UPDATE {table} SET {} WHERE {};",
                sets.join(","),
                conditions.join(" AND ")
            ),
        }]
    });

    let parameters: Vec<Parameter> = table_key(owner)
        .iter()
        .map(|key| Parameter::new(key.parameter.clone(), entity.get(&key.property)))
        .collect();

    templates
        .into_iter()
        .map(|template| {
            Query::new(template.associated_type, template.text, QueryKind::JoinsDelete)
                .with_parameters(parameters.clone())
        })
        .collect()
}

/// Detaches every child currently pointing back at the owner.
fn many_to_one(
    generator: &SqlGenerator,
    entity: &dyn Entity,
    property: &ManyToOneProperty,
) -> Vec<Query> {
    if property.back_columns.is_empty() {
        return vec![];
    }
    let Ok(foreign) = generator.source().mapping(property.foreign) else {
        return vec![];
    };

    let templates = generator.cached(QueryKind::JoinsDelete, &property.name, || {
        let table = TableIdent {
            schema: &foreign.schema_name,
            table: &foreign.table_name,
        }
        .to_string();

        let sets: Vec<String> = property
            .back_columns
            .iter()
            .map(|link| format!("{table}.[{}] = NULL", link.column_name))
            .collect();
        let conditions: Vec<String> = property
            .back_columns
            .iter()
            .map(|link| format!("{table}.[{}] = @{}", link.column_name, link.column_name))
            .collect();

        vec![Template {
            associated_type: foreign.ty,
            text: format!(
                "UPDATE {table} SET {} WHERE {};",
                sets.join(","),
                conditions.join(" AND ")
            ),
        }]
    });

    let parameters = property.get_as_parameter(entity);

    templates
        .into_iter()
        .map(|template| {
            Query::new(template.associated_type, template.text, QueryKind::JoinsDelete)
                .with_parameters(parameters.clone())
        })
        .collect()
}
