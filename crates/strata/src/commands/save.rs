use crate::batch::QueryBatch;

use strata_core::{
    entity::{ChangeSet, EntityRef},
    schema::Property,
    stmt::Value,
    MappingSource, Result, TypeKey,
};
use strata_sql::{Query, QueryKind, QueryProviderManager};

use by_address::ByAddress;
use std::{collections::HashSet, sync::Arc};

/// Persists an object graph in two batches.
///
/// The first batch carries declarations plus one insert-or-update per
/// distinct object, cascading depth-first through relationship properties.
/// Generated IDs are reflected back into the instances, and only then does a
/// second batch rewrite relationship link rows, since join rows reference
/// IDs that do not exist until the first batch has run.
pub struct SaveCommand<'a> {
    source: &'a Arc<MappingSource>,
    provider: &'a QueryProviderManager,
    changes: &'a ChangeSet,
    roots: Vec<EntityRef>,
    invalidate: Option<&'a dyn Fn(&EntityRef)>,
}

#[derive(Default)]
struct Plan {
    declarations: Vec<Query>,
    statements: Vec<Query>,
    inserted: Vec<EntityRef>,
    touched: Vec<EntityRef>,
}

impl<'a> SaveCommand<'a> {
    pub fn new(
        source: &'a Arc<MappingSource>,
        provider: &'a QueryProviderManager,
        changes: &'a ChangeSet,
    ) -> SaveCommand<'a> {
        SaveCommand {
            source,
            provider,
            changes,
            roots: vec![],
            invalidate: None,
        }
    }

    pub fn add(&mut self, entity: EntityRef) -> &mut Self {
        self.roots.push(entity);
        self
    }

    /// Registers a hook called once per persisted object after its
    /// statements have executed, so external caches can drop stale entries.
    pub fn on_persisted(&mut self, hook: &'a dyn Fn(&EntityRef)) -> &mut Self {
        self.invalidate = Some(hook);
        self
    }

    /// Runs both batches, returning the total rows affected.
    pub fn execute(&self, batch: &mut dyn QueryBatch) -> Result<i64> {
        let plan = self.plan()?;
        self.queue_first_batch(batch, &plan);
        let first = batch.execute()?;

        self.write_back(&plan, first.generated);
        self.invalidate(&plan);

        let joins = self.join_queries(&plan.touched)?;
        if joins.is_empty() {
            return Ok(first.rows_affected);
        }
        for query in &joins {
            batch.add_query(query);
        }
        // One upsert per concrete foreign mapping collapses to one row
        // write.
        batch.remove_duplicate_commands();
        let second = batch.execute()?;
        Ok(first.rows_affected + second.rows_affected)
    }

    /// Asynchronous variant of [`SaveCommand::execute`]. Suspends only at
    /// the batch-execution boundary.
    pub async fn execute_async(&self, batch: &mut dyn QueryBatch) -> Result<i64> {
        let plan = self.plan()?;
        self.queue_first_batch(batch, &plan);
        let first = batch.execute_async().await?;

        self.write_back(&plan, first.generated);
        self.invalidate(&plan);

        let joins = self.join_queries(&plan.touched)?;
        if joins.is_empty() {
            return Ok(first.rows_affected);
        }
        for query in &joins {
            batch.add_query(query);
        }
        batch.remove_duplicate_commands();
        let second = batch.execute_async().await?;
        Ok(first.rows_affected + second.rows_affected)
    }

    fn invalidate(&self, plan: &Plan) {
        if let Some(invalidate) = self.invalidate {
            for entity in &plan.touched {
                invalidate(entity);
            }
        }
    }

    fn queue_first_batch(&self, batch: &mut dyn QueryBatch, plan: &Plan) {
        tracing::debug!(
            roots = self.roots.len(),
            statements = plan.statements.len(),
            "saving object graph"
        );

        for query in &plan.declarations {
            batch.add_query(query);
        }
        // One declaration set per object of a type; keep each preamble once.
        batch.remove_duplicate_commands();
        for query in &plan.statements {
            batch.add_query(query);
        }
    }

    fn plan(&self) -> Result<Plan> {
        let mut plan = Plan::default();
        let mut seen = HashSet::new();
        for root in &self.roots {
            self.visit(root, &mut seen, &mut plan)?;
        }
        Ok(plan)
    }

    fn visit(
        &self,
        entity: &EntityRef,
        seen: &mut HashSet<ByAddress<EntityRef>>,
        plan: &mut Plan,
    ) -> Result<()> {
        // Marking before recursing is what breaks cycles in
        // self-referential graphs.
        if !seen.insert(ByAddress(entity.clone())) {
            return Ok(());
        }
        if self.changes.is_clean(entity) {
            return Ok(());
        }

        let ty = entity.borrow().type_key();
        let mapping = self.source.mapping(ty)?.clone();

        for property in mapping.relationship_properties() {
            if property.cascade() && self.changes.should_cascade(entity, property.name()) {
                let related = entity.borrow().related(property.name());
                for item in related {
                    self.visit(&item, seen, plan)?;
                }
            }
        }

        plan.touched.push(entity.clone());

        let Some(generator) = self.provider.generator(ty, self.source) else {
            return Ok(());
        };

        let update = self.is_update(entity, ty);
        let kind = if update {
            QueryKind::Update
        } else {
            QueryKind::Insert
        };

        plan.declarations.extend(generator.generate_declarations(kind));
        {
            let entity = entity.borrow();
            plan.statements
                .extend(generator.generate_queries(kind, &*entity, None));
        }
        if !update {
            plan.inserted.push(entity.clone());
        }

        Ok(())
    }

    /// Tracked instances carry persistent identity and always route to
    /// update. Plain instances update only when every ID is auto-increment
    /// and already populated; otherwise they insert.
    fn is_update(&self, entity: &EntityRef, ty: TypeKey) -> bool {
        if self.changes.is_tracked(entity) {
            return true;
        }

        let ids = self.source.id_properties(ty);
        if ids.is_empty() {
            return false;
        }
        ids.iter().all(|property| match property {
            Property::Id(id) => id.auto_increment && !id.is_default(&*entity.borrow()),
            _ => false,
        })
    }

    /// Assigns generated IDs back to the inserted instances, in statement
    /// order. Only inserts with an auto-increment ID hand a value back;
    /// natural-key inserts must not consume one.
    fn write_back(&self, plan: &Plan, generated: Vec<Value>) {
        let mut generated = generated.into_iter();

        for entity in &plan.inserted {
            let ty = entity.borrow().type_key();
            let auto_id = self
                .source
                .id_properties(ty)
                .into_iter()
                .find_map(|property| match property {
                    Property::Id(id) if id.auto_increment => Some(id),
                    _ => None,
                });
            let Some(id) = auto_id else {
                continue;
            };
            let Some(value) = generated.next() else {
                break;
            };
            entity.borrow_mut().set(&id.name, value);
        }
    }

    /// Second-phase link rewrites: per touched object and relationship
    /// property, clear existing link rows then write the current ones. Not
    /// gated by the change set; link rows are rewritten for every persisted
    /// object.
    fn join_queries(&self, touched: &[EntityRef]) -> Result<Vec<Query>> {
        let mut queries = vec![];

        for entity in touched {
            let ty = entity.borrow().type_key();
            let mapping = self.source.mapping(ty)?.clone();
            let Some(generator) = self.provider.generator(ty, self.source) else {
                continue;
            };

            for property in mapping.relationship_properties() {
                let entity = entity.borrow();
                queries.extend(generator.generate_queries(
                    QueryKind::JoinsDelete,
                    &*entity,
                    Some(property.name()),
                ));
                queries.extend(generator.generate_queries(
                    QueryKind::JoinsSave,
                    &*entity,
                    Some(property.name()),
                ));
            }
        }

        Ok(queries)
    }
}
