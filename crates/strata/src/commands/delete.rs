use crate::batch::QueryBatch;

use strata_core::{entity::EntityRef, MappingSource, Result};
use strata_sql::{Query, QueryKind, QueryProviderManager};

use by_address::ByAddress;
use std::{collections::HashSet, sync::Arc};

/// Deletes an object graph: cascading children first, then each object's
/// relationship link rows, then the object's own rows across its
/// inheritance chain.
pub struct DeleteCommand<'a> {
    source: &'a Arc<MappingSource>,
    provider: &'a QueryProviderManager,
    roots: Vec<EntityRef>,
}

impl<'a> DeleteCommand<'a> {
    pub fn new(
        source: &'a Arc<MappingSource>,
        provider: &'a QueryProviderManager,
    ) -> DeleteCommand<'a> {
        DeleteCommand {
            source,
            provider,
            roots: vec![],
        }
    }

    pub fn add(&mut self, entity: EntityRef) -> &mut Self {
        self.roots.push(entity);
        self
    }

    pub fn execute(&self, batch: &mut dyn QueryBatch) -> Result<i64> {
        let queries = self.plan()?;
        for query in &queries {
            batch.add_query(query);
        }
        Ok(batch.execute()?.rows_affected)
    }

    /// Asynchronous variant of [`DeleteCommand::execute`].
    pub async fn execute_async(&self, batch: &mut dyn QueryBatch) -> Result<i64> {
        let queries = self.plan()?;
        for query in &queries {
            batch.add_query(query);
        }
        Ok(batch.execute_async().await?.rows_affected)
    }

    fn plan(&self) -> Result<Vec<Query>> {
        tracing::debug!(roots = self.roots.len(), "deleting object graph");

        let mut queries = vec![];
        let mut seen = HashSet::new();
        for root in &self.roots {
            self.visit(root, &mut seen, &mut queries)?;
        }
        Ok(queries)
    }

    fn visit(
        &self,
        entity: &EntityRef,
        seen: &mut HashSet<ByAddress<EntityRef>>,
        queries: &mut Vec<Query>,
    ) -> Result<()> {
        if !seen.insert(ByAddress(entity.clone())) {
            return Ok(());
        }

        let ty = entity.borrow().type_key();
        let mapping = self.source.mapping(ty)?.clone();
        let Some(generator) = self.provider.generator(ty, self.source) else {
            return Ok(());
        };

        for property in mapping.relationship_properties() {
            if property.cascade() {
                let related = entity.borrow().related(property.name());
                for item in related {
                    self.visit(&item, seen, queries)?;
                }
            }
        }

        let entity = entity.borrow();
        for property in mapping.relationship_properties() {
            queries.extend(generator.generate_queries(
                QueryKind::JoinsDelete,
                &*entity,
                Some(property.name()),
            ));
        }
        queries.extend(generator.generate_queries(QueryKind::Delete, &*entity, None));

        Ok(())
    }
}
