use crate::{
    graph::{discover_concrete_types, TypeGraph},
    merge::MergeMappings,
    reduce::ReduceMappings,
    schema::{
        property::{IdColumn, TypeNames},
        Mapping,
    },
    Error, Result, TypeKey,
};

use indexmap::IndexMap;
use std::{collections::HashMap, sync::Arc};

/// Frozen snapshot of the full mapping set for one data source.
///
/// Construction runs the whole resolution pipeline in a fixed order; later
/// steps depend on invariants established earlier:
///
/// 1. index mappings by type (duplicates are a configuration error)
/// 2. build type graphs
/// 3. discover concrete types, populate the parent→children index
/// 4. merge mappings over every graph
/// 5. populate the child→parents index from the concrete types' graphs
/// 6. reduce mappings over every graph
///
/// Relationship property columns are resolved between steps 3 and 4, while
/// each declaration is still uniquely owned. After construction the manager
/// is immutable and safe for concurrent readers; mappings cannot be added
/// later.
#[derive(Debug)]
pub struct MappingManager {
    mappings: IndexMap<TypeKey, Arc<Mapping>>,
    type_graphs: IndexMap<TypeKey, TypeGraph>,
    child_types: IndexMap<TypeKey, Vec<TypeKey>>,
    parent_types: IndexMap<TypeKey, Vec<TypeKey>>,
    concrete_types: Vec<TypeKey>,
}

impl MappingManager {
    pub fn new(mut declared: Vec<Mapping>) -> Result<MappingManager> {
        declared.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.ty.cmp(&b.ty)));

        let mut mappings = IndexMap::new();
        for mapping in declared {
            if mappings.contains_key(&mapping.ty) {
                return Err(Error::duplicate_mapping(mapping.ty));
            }
            mappings.insert(mapping.ty, mapping);
        }

        let mut type_graphs = IndexMap::new();
        for &ty in mappings.keys() {
            type_graphs.insert(ty, TypeGraph::build(ty, &mappings));
        }

        let concrete_types = discover_concrete_types(&type_graphs);
        let mut child_types: IndexMap<TypeKey, Vec<TypeKey>> = IndexMap::new();
        for &concrete in &concrete_types {
            for ty in type_graphs[&concrete].to_vec() {
                child_types.entry(ty).or_default().push(concrete);
            }
        }

        Self::setup_relationships(&mut mappings, &type_graphs);

        let mut merger = MergeMappings::new(&mut mappings);
        for graph in type_graphs.values() {
            merger.merge(graph);
        }

        let mut parent_types: IndexMap<TypeKey, Vec<TypeKey>> = IndexMap::new();
        for &concrete in &concrete_types {
            parent_types.insert(concrete, type_graphs[&concrete].to_vec());
        }

        let mut reducer = ReduceMappings::new(&mut mappings);
        for graph in type_graphs.values() {
            reducer.reduce(graph);
        }

        let mappings = mappings
            .into_iter()
            .map(|(ty, mapping)| (ty, Arc::new(mapping)))
            .collect();

        Ok(MappingManager {
            mappings,
            type_graphs,
            child_types,
            parent_types,
            concrete_types,
        })
    }

    /// Resolves relationship column names. Runs before merging, while every
    /// property `Arc` is still uniquely owned.
    fn setup_relationships(
        mappings: &mut IndexMap<TypeKey, Mapping>,
        graphs: &IndexMap<TypeKey, TypeGraph>,
    ) {
        let names = Self::collect_type_names(mappings, graphs);

        for mapping in mappings.values_mut() {
            let ty = mapping.ty;

            for property in &mut mapping.map_properties {
                if let Some(property) = Arc::get_mut(property) {
                    property.setup(names.get(&property.foreign));
                }
            }
            for property in &mut mapping.many_to_one_properties {
                if let Some(property) = Arc::get_mut(property) {
                    if let Some(own) = names.get(&ty) {
                        property.setup(own);
                    }
                }
            }
            for property in &mut mapping.many_to_many_properties {
                if let Some(property) = Arc::get_mut(property) {
                    if let Some(own) = names.get(&ty) {
                        property.setup(own, names.get(&property.foreign));
                    }
                }
            }
        }
    }

    /// Effective naming view per type: table, schema, and the ID columns
    /// visible through the inheritance chain, most-derived declaration
    /// winning on name clashes.
    fn collect_type_names(
        mappings: &IndexMap<TypeKey, Mapping>,
        graphs: &IndexMap<TypeKey, TypeGraph>,
    ) -> HashMap<TypeKey, TypeNames> {
        let mut names = HashMap::new();

        for (&ty, graph) in graphs {
            let mapping = &mappings[&ty];
            let mut ids: Vec<IdColumn> = vec![];

            for ancestor in graph.to_vec() {
                let Some(declared) = mappings.get(&ancestor) else {
                    continue;
                };
                for id in &declared.id_properties {
                    if ids.iter().any(|existing| existing.property == id.name) {
                        continue;
                    }
                    ids.push(IdColumn {
                        property: id.name.clone(),
                        column_name: id.column_name.clone(),
                        table: id.parent_table.clone(),
                        ty: id.ty,
                    });
                }
            }

            names.insert(
                ty,
                TypeNames {
                    table: mapping.table_name.clone(),
                    ids,
                },
            );
        }

        names
    }

    pub fn mapping(&self, ty: TypeKey) -> Option<&Arc<Mapping>> {
        self.mappings.get(&ty)
    }

    pub fn mappings(&self) -> impl Iterator<Item = &Arc<Mapping>> {
        self.mappings.values()
    }

    pub fn type_graph(&self, ty: TypeKey) -> Option<&TypeGraph> {
        self.type_graphs.get(&ty)
    }

    pub fn concrete_types(&self) -> &[TypeKey] {
        &self.concrete_types
    }

    /// Concrete descendants of a type (including the type itself when
    /// concrete).
    pub fn child_types(&self, ty: TypeKey) -> &[TypeKey] {
        self.child_types.get(&ty).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The type itself plus its mapped ancestors, for concrete types.
    pub fn parent_types(&self, ty: TypeKey) -> &[TypeKey] {
        self.parent_types.get(&ty).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mappings of the type itself and its mapped ancestors, graph order.
    pub fn parent_mappings(&self, ty: TypeKey) -> Vec<&Arc<Mapping>> {
        match self.type_graphs.get(&ty) {
            Some(graph) => graph
                .to_vec()
                .into_iter()
                .filter_map(|ty| self.mappings.get(&ty))
                .collect(),
            None => vec![],
        }
    }

    /// Mappings of the concrete descendants of a type.
    pub fn child_mappings(&self, ty: TypeKey) -> Vec<&Arc<Mapping>> {
        self.child_types(ty)
            .iter()
            .filter_map(|ty| self.mappings.get(ty))
            .collect()
    }
}
