use super::{table_key, SqlGenerator, Template};
use crate::{
    ident::{ColumnIdent, TableIdent},
    Query, QueryKind,
};

use strata_core::{entity::Entity, schema::Property, stmt::Parameter};

use std::fmt::Write;

pub(super) fn generate(generator: &SqlGenerator, entity: &dyn Entity) -> Vec<Query> {
    let templates = generator.cached(QueryKind::Update, "", || build(generator));
    let parameters = parameters(generator, entity);

    templates
        .into_iter()
        .map(|template| {
            Query::new(template.associated_type, template.text, QueryKind::Update)
                .with_parameters(parameters.clone())
        })
        .collect()
}

/// One UPDATE per chain table that carries writable columns, each keyed by
/// the ID predicate visible on that table.
fn build(generator: &SqlGenerator) -> Vec<Template> {
    let mut text = String::new();

    for mapping in generator.chain() {
        let mut sets: Vec<String> = vec![];

        for reference in &mapping.reference_properties {
            if reference.parent == mapping.ty
                && !reference.read_only
                && reference.computed_spec.is_empty()
            {
                let column = ColumnIdent {
                    schema: &mapping.schema_name,
                    table: &mapping.table_name,
                    column: &reference.column_name,
                };
                sets.push(format!("{column} = @{}", reference.column_name));
            }
        }
        for map in &mapping.map_properties {
            if map.parent == mapping.ty {
                for link in &map.columns {
                    let column = ColumnIdent {
                        schema: &mapping.schema_name,
                        table: &mapping.table_name,
                        column: &link.column_name,
                    };
                    sets.push(format!("{column} = @{}", link.column_name));
                }
            }
        }

        if sets.is_empty() {
            continue;
        }

        let table = TableIdent {
            schema: &mapping.schema_name,
            table: &mapping.table_name,
        };
        let conditions: Vec<String> = table_key(&mapping)
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

        if !text.is_empty() {
            text.push(' ');
        }
        let _ = write!(
            text,
            "UPDATE {table} SET {} WHERE {};",
            sets.join(","),
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
    let mut parameters = vec![];

    for mapping in generator.chain() {
        for reference in &mapping.reference_properties {
            if reference.parent == mapping.ty
                && !reference.read_only
                && reference.computed_spec.is_empty()
            {
                parameters.push(reference.get_as_parameter(entity));
            }
        }
        for map in &mapping.map_properties {
            if map.parent == mapping.ty {
                parameters.extend(map.get_as_parameter(entity));
            }
        }
    }

    for property in generator.source().id_properties(generator.ty()) {
        if let Property::Id(id) = property {
            parameters.push(id.get_as_parameter(entity));
        }
    }

    parameters
}
