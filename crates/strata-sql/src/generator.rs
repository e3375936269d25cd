mod delete;
mod delete_properties;
mod insert;
mod save_properties;
mod select;
mod update;

use crate::{Query, QueryKind};

use strata_core::{
    entity::Entity,
    schema::{Mapping, Property},
    stmt::Type,
    MappingSource, TypeKey,
};

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

/// Generates parameterized SQL Server statements for one mapped type.
///
/// Statement text is entity independent, so it is built lazily on first use
/// and cached per property and query kind; building it needs the frozen
/// mapping snapshot (foreign ID columns resolve only after reduction), while
/// the instance being persisted only contributes bound parameter values.
pub struct SqlGenerator {
    ty: TypeKey,
    source: Arc<MappingSource>,
    templates: Mutex<HashMap<(QueryKind, String), Vec<Template>>>,
}

/// Cached statement text plus the mapping it operates on.
#[derive(Debug, Clone)]
struct Template {
    associated_type: TypeKey,
    text: String,
}

impl SqlGenerator {
    pub fn new(ty: TypeKey, source: Arc<MappingSource>) -> SqlGenerator {
        SqlGenerator {
            ty,
            source,
            templates: Mutex::new(HashMap::new()),
        }
    }

    pub fn ty(&self) -> TypeKey {
        self.ty
    }

    pub fn source(&self) -> &Arc<MappingSource> {
        &self.source
    }

    /// Provider preamble statements required before the main statements of
    /// a batch run. Stateless per generator.
    pub fn generate_declarations(&self, kind: QueryKind) -> Vec<Query> {
        match kind {
            QueryKind::Insert => insert::declarations(self),
            _ => vec![Query::new(self.ty, "", kind)],
        }
    }

    /// Generates the statements of one kind for one instance. Relationship
    /// kinds require the property name; an unknown property yields an empty
    /// result since callers probe speculatively.
    pub fn generate_queries(
        &self,
        kind: QueryKind,
        entity: &dyn Entity,
        property: Option<&str>,
    ) -> Vec<Query> {
        match kind {
            QueryKind::Insert => insert::generate(self, entity),
            QueryKind::Update => update::generate(self, entity),
            QueryKind::Delete => delete::generate(self, entity),
            QueryKind::Select => select::generate(self, entity),
            QueryKind::JoinsSave => property
                .map(|property| save_properties::generate(self, entity, property))
                .unwrap_or_default(),
            QueryKind::JoinsDelete => property
                .map(|property| delete_properties::generate(self, entity, property))
                .unwrap_or_default(),
            QueryKind::Declarations => self.generate_declarations(kind),
        }
    }

    /// The type's mapping followed by its mapped ancestors.
    fn chain(&self) -> Vec<Arc<Mapping>> {
        self.source
            .manager()
            .parent_mappings(self.ty)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Looks a property up across the inheritance chain.
    fn property(&self, name: &str) -> Option<Property> {
        self.chain()
            .iter()
            .find_map(|mapping| mapping.property(name))
    }

    fn cached(
        &self,
        kind: QueryKind,
        property: &str,
        build: impl FnOnce() -> Vec<Template>,
    ) -> Vec<Template> {
        let key = (kind, property.to_string());
        if let Some(templates) = self.templates.lock().unwrap().get(&key) {
            return templates.clone();
        }

        // Concurrent first use recomputes the same pure value; the last
        // write wins without corrupting anything.
        let built = build();
        self.templates.lock().unwrap().insert(key, built.clone());
        built
    }
}

/// One component of the predicate identifying a single row of a table:
/// either the table's own ID column or the foreign-key column an inherited
/// ID landed as.
pub(crate) struct KeyColumn {
    /// Column name on the table being keyed.
    pub column: String,

    /// Bound parameter name (declaring table + column name).
    pub parameter: String,

    /// Instance property supplying the value.
    pub property: String,
}

pub(crate) fn table_key(mapping: &Mapping) -> Vec<KeyColumn> {
    mapping
        .id_properties
        .iter()
        .map(|id| {
            let column = if id.parent == mapping.ty {
                id.column_name.clone()
            } else {
                format!("{}{}", id.parent_table, id.column_name)
            };
            KeyColumn {
                column,
                parameter: id.parameter_name(),
                property: id.name.clone(),
            }
        })
        .collect()
}

pub(crate) fn sql_type(ty: Type) -> &'static str {
    match ty {
        Type::Bool => "BIT",
        Type::I32 => "INT",
        Type::I64 => "BIGINT",
        Type::F64 => "FLOAT",
        Type::Text => "NVARCHAR(100)",
    }
}
