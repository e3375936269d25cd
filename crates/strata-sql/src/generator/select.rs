use super::{table_key, SqlGenerator, Template};
use crate::{
    ident::{ColumnIdent, Ident, TableIdent},
    Query, QueryKind,
};

use strata_core::{entity::Entity, schema::Property, stmt::Parameter};

pub(super) fn generate(generator: &SqlGenerator, entity: &dyn Entity) -> Vec<Query> {
    let templates = generator.cached(QueryKind::Select, "", || build(generator));
    let parameters = parameters(generator, entity);

    templates
        .into_iter()
        .map(|template| {
            Query::new(template.associated_type, template.text, QueryKind::Select)
                .with_parameters(parameters.clone())
        })
        .collect()
}

/// Selects one instance by ID, joining the inheritance chain so inherited
/// columns come back alongside the concrete table's own.
fn build(generator: &SqlGenerator) -> Vec<Template> {
    let chain = generator.chain();
    let Some((root, ancestors)) = chain.split_first() else {
        return vec![];
    };

    let mut columns: Vec<String> = vec![];
    for mapping in &chain {
        for id in &mapping.id_properties {
            if id.parent == mapping.ty {
                let column = ColumnIdent {
                    schema: &mapping.schema_name,
                    table: &mapping.table_name,
                    column: &id.column_name,
                };
                columns.push(format!("{column} AS {}", Ident(&id.name)));
            }
        }
        for reference in &mapping.reference_properties {
            if reference.parent == mapping.ty {
                let column = ColumnIdent {
                    schema: &mapping.schema_name,
                    table: &mapping.table_name,
                    column: &reference.column_name,
                };
                columns.push(format!("{column} AS {}", Ident(&reference.name)));
            }
        }
    }

    let root_table = TableIdent {
        schema: &root.schema_name,
        table: &root.table_name,
    };
    let mut text = format!("SELECT {} FROM {root_table}", columns.join(","));

    for ancestor in ancestors {
        let ancestor_table = TableIdent {
            schema: &ancestor.schema_name,
            table: &ancestor.table_name,
        };
        let mut conditions: Vec<String> = vec![];
        for id in &ancestor.id_properties {
            let ancestor_column = if id.parent == ancestor.ty {
                id.column_name.clone()
            } else {
                format!("{}{}", id.parent_table, id.column_name)
            };
            let root_column = if id.parent == root.ty {
                id.column_name.clone()
            } else {
                format!("{}{}", id.parent_table, id.column_name)
            };
            conditions.push(format!(
                "{} = {}",
                ColumnIdent {
                    schema: &ancestor.schema_name,
                    table: &ancestor.table_name,
                    column: &ancestor_column,
                },
                ColumnIdent {
                    schema: &root.schema_name,
                    table: &root.table_name,
                    column: &root_column,
                },
            ));
        }
        if conditions.is_empty() {
            continue;
        }
        text.push_str(&format!(
            " INNER JOIN {ancestor_table} ON {}",
            conditions.join(" AND ")
        ));
    }

    let conditions: Vec<String> = table_key(root)
        .iter()
        .map(|key| {
            format!(
                "{} = @{}",
                ColumnIdent {
                    schema: &root.schema_name,
                    table: &root.table_name,
                    column: &key.column,
                },
                key.parameter
            )
        })
        .collect();
    text.push_str(&format!(" WHERE {};", conditions.join(" AND ")));

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
