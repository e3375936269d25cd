use crate::{schema::Mapping, TypeKey};

use indexmap::IndexMap;

/// Inheritance graph of one mapped type.
///
/// The root is the type itself; child nodes are its direct and transitive
/// mapped ancestors, in declaration order. Built once per mapped type and
/// immutable afterwards. Types with no mapped ancestors get a root-only
/// tree.
#[derive(Debug, Clone)]
pub struct TypeGraph {
    pub root: Node,
}

/// A node in a type graph. Children are the node's declared mapped
/// ancestors.
#[derive(Debug, Clone)]
pub struct Node {
    pub ty: TypeKey,
    pub children: Vec<Node>,
}

impl TypeGraph {
    /// Builds the graph for `ty` from the declared mapping set. Ancestors
    /// without a mapping of their own are skipped; diamonds are preserved in
    /// the tree and collapsed by [`TypeGraph::to_vec`].
    pub fn build(ty: TypeKey, mappings: &IndexMap<TypeKey, Mapping>) -> TypeGraph {
        TypeGraph {
            root: Self::build_node(ty, mappings, &mut vec![ty]),
        }
    }

    fn build_node(ty: TypeKey, mappings: &IndexMap<TypeKey, Mapping>, path: &mut Vec<TypeKey>) -> Node {
        let mut children = vec![];

        if let Some(mapping) = mappings.get(&ty) {
            for &parent in &mapping.parents {
                if !mappings.contains_key(&parent) {
                    continue;
                }
                // A cyclic parent declaration would otherwise recurse forever.
                if path.contains(&parent) {
                    continue;
                }

                path.push(parent);
                children.push(Self::build_node(parent, mappings, path));
                path.pop();
            }
        }

        Node { ty, children }
    }

    /// The type itself followed by its mapped ancestors, preorder,
    /// duplicates (diamond inheritance) collapsed to the first occurrence.
    pub fn to_vec(&self) -> Vec<TypeKey> {
        let mut types = vec![];
        self.root.collect(&mut types);
        types
    }

    /// The mapped ancestors, excluding the root type.
    pub fn ancestors(&self) -> Vec<TypeKey> {
        let mut types = self.to_vec();
        types.remove(0);
        types
    }

    pub fn contains(&self, ty: TypeKey) -> bool {
        self.to_vec().contains(&ty)
    }
}

impl Node {
    fn collect(&self, types: &mut Vec<TypeKey>) {
        if !types.contains(&self.ty) {
            types.push(self.ty);
        }
        for child in &self.children {
            child.collect(types);
        }
    }
}

/// Returns the instantiable leaf types: those never referenced as an
/// ancestor in any other type's graph.
pub fn discover_concrete_types(graphs: &IndexMap<TypeKey, TypeGraph>) -> Vec<TypeKey> {
    let mut ancestors = vec![];
    for graph in graphs.values() {
        for ty in graph.ancestors() {
            if !ancestors.contains(&ty) {
                ancestors.push(ty);
            }
        }
    }

    graphs
        .keys()
        .copied()
        .filter(|ty| !ancestors.contains(ty))
        .collect()
}
