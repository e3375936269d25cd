use crate::SqlGenerator;

use strata_core::{MappingSource, TypeKey};

use indexmap::IndexMap;
use std::sync::{Arc, RwLock};

/// Registry of query generators, one per (mapped type, mapping source)
/// pair. Concurrent callers asking for the same pair share one instance.
#[derive(Default)]
pub struct QueryProviderManager {
    generators: RwLock<IndexMap<(TypeKey, usize), Arc<SqlGenerator>>>,
}

impl QueryProviderManager {
    pub fn new() -> QueryProviderManager {
        QueryProviderManager::default()
    }

    /// Returns the generator for a type, creating it on first request.
    /// Types with no concrete mapping on the source get `None`.
    pub fn generator(
        &self,
        ty: TypeKey,
        source: &Arc<MappingSource>,
    ) -> Option<Arc<SqlGenerator>> {
        if source.manager().child_mappings(ty).is_empty() {
            return None;
        }

        let key = (ty, Arc::as_ptr(source) as usize);
        if let Some(generator) = self.generators.read().unwrap().get(&key) {
            return Some(generator.clone());
        }

        tracing::debug!(
            ty = %ty,
            source = %source.database().name,
            "creating query generator"
        );

        let generator = Arc::new(SqlGenerator::new(ty, source.clone()));
        Some(
            self.generators
                .write()
                .unwrap()
                .entry(key)
                .or_insert(generator)
                .clone(),
        )
    }
}
