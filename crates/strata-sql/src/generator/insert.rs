use super::{sql_type, SqlGenerator, Template};
use crate::{
    ident::{Ident, TableIdent},
    Query, QueryKind,
};

use strata_core::{entity::Entity, stmt::Parameter};

use std::fmt::Write;

/// One temp variable per auto-increment ID in the inheritance chain, so the
/// generated value can be threaded into descendant tables and selected back.
pub(super) fn declarations(generator: &SqlGenerator) -> Vec<Query> {
    let mut queries = vec![];

    for mapping in generator.chain() {
        for id in &mapping.id_properties {
            if id.parent == mapping.ty && id.auto_increment {
                queries.push(Query::new(
                    generator.ty(),
                    format!(
                        "DECLARE @{}_Temp AS {};",
                        id.parameter_name(),
                        sql_type(id.ty)
                    ),
                    QueryKind::Declarations,
                ));
            }
        }
    }

    queries
}

pub(super) fn generate(generator: &SqlGenerator, entity: &dyn Entity) -> Vec<Query> {
    let templates = generator.cached(QueryKind::Insert, "", || build(generator));
    let parameters = parameters(generator, entity);

    templates
        .into_iter()
        .map(|template| {
            Query::new(template.associated_type, template.text, QueryKind::Insert)
                .with_parameters(parameters.clone())
        })
        .collect()
}

/// Inserts bottom-up through the inheritance chain: each ancestor table
/// first, capturing generated IDs into temp variables that descendant tables
/// consume as foreign-key values.
fn build(generator: &SqlGenerator) -> Vec<Template> {
    let chain = generator.chain();
    if chain.is_empty() {
        return vec![];
    }

    let mut text = String::new();

    for mapping in chain.iter().rev() {
        let mut columns: Vec<String> = vec![];
        let mut values: Vec<String> = vec![];

        for id in &mapping.id_properties {
            if id.parent == mapping.ty {
                if !id.auto_increment {
                    columns.push(Ident(&id.column_name).to_string());
                    values.push(format!("@{}", id.parameter_name()));
                }
            } else {
                // Inherited ID, landed as a foreign-key column.
                columns.push(format!("[{}{}]", id.parent_table, id.column_name));
                if id.auto_increment {
                    values.push(format!("@{}_Temp", id.parameter_name()));
                } else {
                    values.push(format!("@{}", id.parameter_name()));
                }
            }
        }
        for reference in &mapping.reference_properties {
            if reference.parent == mapping.ty
                && !reference.read_only
                && reference.computed_spec.is_empty()
            {
                columns.push(Ident(&reference.column_name).to_string());
                values.push(format!("@{}", reference.column_name));
            }
        }
        for map in &mapping.map_properties {
            if map.parent == mapping.ty {
                for link in &map.columns {
                    columns.push(Ident(&link.column_name).to_string());
                    values.push(format!("@{}", link.column_name));
                }
            }
        }

        let table = TableIdent {
            schema: &mapping.schema_name,
            table: &mapping.table_name,
        };
        if !text.is_empty() {
            text.push(' ');
        }
        if columns.is_empty() {
            let _ = write!(text, "INSERT INTO {table} DEFAULT VALUES;");
        } else {
            let _ = write!(
                text,
                "INSERT INTO {table}({}) VALUES ({});",
                columns.join(","),
                values.join(",")
            );
        }

        for id in &mapping.id_properties {
            if id.parent == mapping.ty && id.auto_increment {
                let _ = write!(text, " SET @{}_Temp=SCOPE_IDENTITY();", id.parameter_name());
            }
        }
    }

    // Hand the generated IDs back to the caller.
    for mapping in &chain {
        for id in &mapping.id_properties {
            if id.parent == mapping.ty && id.auto_increment {
                let _ = write!(
                    text,
                    " SELECT @{}_Temp AS {};",
                    id.parameter_name(),
                    Ident(&id.column_name)
                );
            }
        }
    }

    vec![Template {
        associated_type: generator.ty(),
        text,
    }]
}

fn parameters(generator: &SqlGenerator, entity: &dyn Entity) -> Vec<Parameter> {
    let mut parameters = vec![];

    for mapping in generator.chain() {
        for id in &mapping.id_properties {
            if id.parent == mapping.ty && !id.auto_increment {
                parameters.push(id.get_as_parameter(entity));
            }
        }
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

    parameters
}
