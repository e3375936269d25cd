use crate::{graph::TypeGraph, schema::Mapping, TypeKey};

use indexmap::IndexMap;

/// Normalizes property sets after merging.
///
/// A property visible under the same name from several declaration sites
/// (its own mapping and an ancestor's, or two ancestors) is resolved to one
/// authoritative declaration, preferring the most-derived origin, so schema
/// and query generation never emit duplicate columns.
pub struct ReduceMappings<'a> {
    mappings: &'a mut IndexMap<TypeKey, Mapping>,
}

impl<'a> ReduceMappings<'a> {
    pub fn new(mappings: &'a mut IndexMap<TypeKey, Mapping>) -> ReduceMappings<'a> {
        ReduceMappings { mappings }
    }

    pub fn reduce(&mut self, graph: &TypeGraph) {
        // Root first; lower rank = more derived.
        let order = graph.to_vec();
        let rank = |ty: TypeKey| order.iter().position(|&t| t == ty).unwrap_or(usize::MAX);

        let Some(mapping) = self.mappings.get_mut(&graph.root.ty) else {
            return;
        };

        Self::reduce_list(&mut mapping.id_properties, |p| (p.name.clone(), rank(p.parent)));
        Self::reduce_list(&mut mapping.reference_properties, |p| {
            (p.name.clone(), rank(p.parent))
        });
        Self::reduce_list(&mut mapping.map_properties, |p| (p.name.clone(), rank(p.parent)));
        Self::reduce_list(&mut mapping.many_to_one_properties, |p| {
            (p.name.clone(), rank(p.parent))
        });
        Self::reduce_list(&mut mapping.many_to_many_properties, |p| {
            (p.name.clone(), rank(p.parent))
        });
    }

    fn reduce_list<T>(list: &mut Vec<T>, key: impl Fn(&T) -> (String, usize)) {
        let mut keep: Vec<bool> = vec![true; list.len()];

        for i in 0..list.len() {
            let (name_i, rank_i) = key(&list[i]);
            for j in 0..list.len() {
                if i == j {
                    continue;
                }
                let (name_j, rank_j) = key(&list[j]);
                if name_i != name_j {
                    continue;
                }
                // Drop the less-derived duplicate; ties resolve to the
                // earliest list position.
                if rank_j < rank_i || (rank_j == rank_i && j < i) {
                    keep[i] = false;
                    break;
                }
            }
        }

        let mut index = 0;
        list.retain(|_| {
            let kept = keep[index];
            index += 1;
            kept
        });
    }
}
