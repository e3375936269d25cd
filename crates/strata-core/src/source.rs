use crate::{
    manager::MappingManager,
    schema::{db::Table, Mapping, Property},
    Error, Result, TypeKey,
};

use std::sync::Arc;

/// Identity of one physical data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    /// Logical name, also used when logging generator construction.
    pub name: String,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Database {
        Database { name: name.into() }
    }
}

/// One consistent schema universe: the frozen mapping snapshot plus the
/// database it maps to. Everything downstream of mapping resolution (query
/// generation, save/delete orchestration) reads through a `MappingSource`
/// and never touches mutable mapping state.
#[derive(Debug)]
pub struct MappingSource {
    manager: Arc<MappingManager>,
    database: Database,
}

impl MappingSource {
    pub fn new(manager: MappingManager, database: Database) -> MappingSource {
        MappingSource {
            manager: Arc::new(manager),
            database,
        }
    }

    pub fn manager(&self) -> &Arc<MappingManager> {
        &self.manager
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn mapping(&self, ty: TypeKey) -> Result<&Arc<Mapping>> {
        self.manager
            .mapping(ty)
            .ok_or_else(|| Error::missing_mapping(ty))
    }

    /// Effective ID properties of a type, the whole inheritance chain
    /// included. Merged mappings alias ancestor properties, so the union is
    /// deduplicated by declaration identity.
    pub fn id_properties(&self, ty: TypeKey) -> Vec<Property> {
        let mut ids: Vec<Arc<crate::schema::IdProperty>> = vec![];

        for mapping in self.manager.parent_mappings(ty) {
            for id in &mapping.id_properties {
                if !ids.iter().any(|existing| Arc::ptr_eq(existing, id)) {
                    ids.push(id.clone());
                }
            }
        }

        ids.into_iter().map(Property::Id).collect()
    }

    /// Builds the physical table set: one entity table per mapping plus the
    /// join tables declared by many-to-many properties.
    ///
    /// Each column is emitted by the mapping that declared it; derived
    /// tables carry foreign-key ID columns referencing their direct mapped
    /// parents. Join tables shared by a merged property are emitted once.
    pub fn build_tables(&self) -> Vec<Table> {
        let mut tables: Vec<Table> = vec![];

        for mapping in self.manager.mappings() {
            let mut table = Table::new(&mapping.schema_name, &mapping.table_name);

            for id in &mapping.id_properties {
                if id.parent == mapping.ty {
                    id.add_to_table(&mut table);
                }
            }
            for &parent in &mapping.parents {
                if let Some(parent_mapping) = self.manager.mapping(parent) {
                    // The parent's effective IDs may themselves be inherited;
                    // each one references its declaring table directly.
                    for id in &parent_mapping.id_properties {
                        let name = format!("{}{}", id.parent_table, id.column_name);
                        if table.column(&name).is_none() {
                            id.add_to_child_table(&mut table);
                        }
                    }
                }
            }
            for reference in &mapping.reference_properties {
                if reference.parent == mapping.ty {
                    reference.add_to_table(&mut table);
                }
            }
            for map in &mapping.map_properties {
                if map.parent == mapping.ty {
                    map.add_to_table(&mut table);
                }
            }

            tables.push(table);
        }

        for mapping in self.manager.mappings() {
            for many_to_many in &mapping.many_to_many_properties {
                if many_to_many.parent != mapping.ty {
                    continue;
                }
                let join = many_to_many.build_join_table();
                if !tables.iter().any(|t| t.name == join.name) {
                    tables.push(join);
                }
            }
        }

        tables
    }
}
