use crate::{graph::TypeGraph, schema::Mapping, TypeKey};

use indexmap::IndexMap;

/// Unifies a type's mapping with the mappings of its ancestors.
///
/// Any property declared only on an ancestor becomes visible on the
/// descendant's effective property set. The shared `Arc` is pushed rather
/// than a copy, so the merged view aliases the ancestor's storage. Merging
/// is idempotent and tolerates diamonds: a property already visible under
/// the same name is never added twice.
pub struct MergeMappings<'a> {
    mappings: &'a mut IndexMap<TypeKey, Mapping>,
}

impl<'a> MergeMappings<'a> {
    pub fn new(mappings: &'a mut IndexMap<TypeKey, Mapping>) -> MergeMappings<'a> {
        MergeMappings { mappings }
    }

    pub fn merge(&mut self, graph: &TypeGraph) {
        let root = graph.root.ty;

        for ancestor in graph.ancestors() {
            let Some(source) = self.mappings.get(&ancestor).cloned() else {
                continue;
            };
            let Some(target) = self.mappings.get_mut(&root) else {
                continue;
            };

            for property in &source.id_properties {
                if !target.id_properties.iter().any(|p| p.name == property.name) {
                    target.id_properties.push(property.clone());
                }
            }
            for property in &source.reference_properties {
                if !target
                    .reference_properties
                    .iter()
                    .any(|p| p.name == property.name)
                {
                    target.reference_properties.push(property.clone());
                }
            }
            for property in &source.map_properties {
                if !target.map_properties.iter().any(|p| p.name == property.name) {
                    target.map_properties.push(property.clone());
                }
            }
            for property in &source.many_to_one_properties {
                if !target
                    .many_to_one_properties
                    .iter()
                    .any(|p| p.name == property.name)
                {
                    target.many_to_one_properties.push(property.clone());
                }
            }
            for property in &source.many_to_many_properties {
                if !target
                    .many_to_many_properties
                    .iter()
                    .any(|p| p.name == property.name)
                {
                    target.many_to_many_properties.push(property.clone());
                }
            }
        }
    }
}
