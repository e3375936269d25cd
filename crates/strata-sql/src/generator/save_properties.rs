use super::{table_key, SqlGenerator, Template};
use crate::{ident::TableIdent, Query, QueryKind};

use strata_core::{
    entity::Entity,
    schema::{ManyToManyProperty, ManyToOneProperty, MapProperty, Property},
    stmt::Parameter,
};

/// Second-phase relationship writes, issued once every participant's own
/// insert has run and generated IDs are reflected back into the instances.
pub(super) fn generate(generator: &SqlGenerator, entity: &dyn Entity, property: &str) -> Vec<Query> {
    match generator.property(property) {
        Some(Property::ManyToMany(property)) => many_to_many(generator, entity, &property),
        Some(Property::Map(property)) => map(generator, entity, &property),
        Some(Property::ManyToOne(property)) => many_to_one(generator, entity, &property),
        _ => vec![],
    }
}

/// One existence-guarded insert per referenced item, so rewriting the same
/// link twice never duplicates a join row.
fn many_to_many(
    generator: &SqlGenerator,
    entity: &dyn Entity,
    property: &ManyToManyProperty,
) -> Vec<Query> {
    if property.table_name.is_empty() {
        return vec![];
    }

    let templates = generator.cached(QueryKind::JoinsSave, &property.name, || {
        let table = TableIdent {
            schema: &property.parent_schema,
            table: &property.table_name,
        }
        .to_string();

        let mut columns: Vec<String> = vec![];
        let mut values: Vec<String> = vec![];
        let mut conditions: Vec<String> = vec![];
        for link in property.foreign_columns.iter().chain(&property.owner_columns) {
            let qualified = format!("{table}.[{}]", link.column_name);
            values.push(format!("@{}", link.column_name));
            conditions.push(format!("{qualified} = @{}", link.column_name));
            columns.push(qualified);
        }

        let text = format!(
            "IF NOT EXISTS (SELECT * FROM {table} WHERE {}) BEGIN INSERT INTO {table}({}) VALUES ({}) END;",
            conditions.join(" AND "),
            columns.join(","),
            values.join(",")
        );

        generator
            .source()
            .manager()
            .child_mappings(property.foreign)
            .into_iter()
            .map(|mapping| Template {
                associated_type: mapping.ty,
                text: text.clone(),
            })
            .collect()
    });

    let mut queries = vec![];
    for template in &templates {
        for item in entity.related(&property.name) {
            queries.push(
                Query::new(template.associated_type, template.text.clone(), QueryKind::JoinsSave)
                    .with_parameters(property.get_as_parameter(entity, &*item.borrow())),
            );
        }
    }
    queries
}

/// Rewrites the foreign-key columns on the owning table.
fn map(generator: &SqlGenerator, entity: &dyn Entity, property: &MapProperty) -> Vec<Query> {
    if property.columns.is_empty() {
        return vec![];
    }
    let Ok(owner) = generator.source().mapping(property.parent) else {
        return vec![];
    };

    let templates = generator.cached(QueryKind::JoinsSave, &property.name, || {
        let table = TableIdent {
            schema: &property.parent_schema,
            table: &property.parent_table,
        }
        .to_string();

        let sets: Vec<String> = property
            .columns
            .iter()
            .map(|link| format!("{table}.[{}] = @{}", link.column_name, link.column_name))
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

    let mut parameters = property.get_as_parameter(entity);
    for key in table_key(owner) {
        parameters.push(Parameter::new(key.parameter, entity.get(&key.property)));
    }

    templates
        .into_iter()
        .map(|template| {
            Query::new(template.associated_type, template.text, QueryKind::JoinsSave)
                .with_parameters(parameters.clone())
        })
        .collect()
}

/// One back-reference UPDATE per referenced item, pointing it at the owner.
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

    let templates = generator.cached(QueryKind::JoinsSave, &property.name, || {
        let table = TableIdent {
            schema: &foreign.schema_name,
            table: &foreign.table_name,
        }
        .to_string();

        let sets: Vec<String> = property
            .back_columns
            .iter()
            .map(|link| format!("{table}.[{}] = @{}", link.column_name, link.column_name))
            .collect();
        let conditions: Vec<String> = table_key(foreign)
            .iter()
            .map(|key| format!("{table}.[{}] = @{}", key.column, key.parameter))
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

    let owner_parameters = property.get_as_parameter(entity);
    let limit = if property.collection { usize::MAX } else { 1 };

    let mut queries = vec![];
    for template in &templates {
        for item in entity.related(&property.name).into_iter().take(limit) {
            let mut parameters = owner_parameters.clone();
            for key in table_key(foreign) {
                parameters.push(Parameter::new(
                    key.parameter,
                    item.borrow().get(&key.property),
                ));
            }
            queries.push(
                Query::new(template.associated_type, template.text.clone(), QueryKind::JoinsSave)
                    .with_parameters(parameters),
            );
        }
    }
    queries
}
