use super::{table_key, SqlGenerator, Template};
use crate::{
    ident::{ColumnIdent, TableIdent},
    Query, QueryKind,
};

use strata_core::{entity::Entity, schema::Property, stmt::Parameter};

use std::fmt::Write;

pub(super) fn generate(generator: &SqlGenerator, entity: &dyn Entity) -> Vec<Query> {
    let templates = generator.cached(QueryKind::Delete, "", || build(generator));
    let parameters = parameters(generator, entity);

    templates
        .into_iter()
        .map(|template| {
            Query::new(template.associated_type, template.text, QueryKind::Delete)
                .with_parameters(parameters.clone())
        })
        .collect()
}

/// Deletes most-derived table first so foreign keys to ancestor rows are
/// gone before the ancestor rows themselves.
fn build(generator: &SqlGenerator) -> Vec<Template> {
    let chain = generator.chain();
    if chain.is_empty() {
        return vec![];
    }

    let mut text = String::new();

    for mapping in &chain {
        let table = TableIdent {
            schema: &mapping.schema_name,
            table: &mapping.table_name,
        };
        let conditions: Vec<String> = table_key(mapping)
            .iter()
            .map(|key| {
                let column = ColumnIdent {
                    schema: &mapping.schema_name,
                    table: &mapping.table_name,
                    column: &key.column,
                };
                format!("{column} = @{}", key.parameter)
            })
            .collect();

        if conditions.is_empty() {
            continue;
        }

        if !text.is_empty() {
            text.push(' ');
        }
        let _ = write!(
            text,
            "DELETE FROM {table} WHERE {};",
            conditions.join(" AND ")
        );
    }

    if text.is_empty() {
        return vec![];
    }

    vec![Template {
        associated_type: generator.ty(),
        text,
    }]
}

fn parameters(generator: &SqlGenerator, entity: &dyn Entity) -> Vec<Parameter> {
    generator
        .source()
        .id_properties(generator.ty())
        .into_iter()
        .filter_map(|property| match property {
            Property::Id(id) => Some(id.get_as_parameter(entity)),
            _ => None,
        })
        .collect()
}
