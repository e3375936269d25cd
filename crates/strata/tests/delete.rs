use strata::{
    schema::{IdProperty, ManyToManyProperty},
    stmt::Type,
    Database, DeleteCommand, DynamicEntity, EntityRef, Mapping, MappingManager,
    MappingSource, QueryKind, QueryProviderManager, RecordingBatch,
};

use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::sync::Arc;

fn node_source(cascade: bool) -> Arc<MappingSource> {
    let mut node = Mapping::new("Node", "Nodes");
    let id = IdProperty::new("ID", Type::I64, &node)
        .unwrap()
        .auto_increment();
    node.add_id(id);

    let mut children = ManyToManyProperty::new("Children", "Node", &node).unwrap();
    if cascade {
        children = children.cascade();
    }
    node.add_many_to_many(children);

    let manager = MappingManager::new(vec![node]).unwrap();
    Arc::new(MappingSource::new(manager, Database::new("default")))
}

fn node(id: i64) -> EntityRef {
    DynamicEntity::new("Node").with("ID", id).into_ref()
}

/// Replays the executed statements against an in-memory table model.
fn apply(
    batch: &RecordingBatch,
    rows: &mut BTreeSet<i64>,
    joins: &mut Vec<(i64, i64)>,
) {
    for query in &batch.executed {
        match query.kind {
            QueryKind::JoinsDelete => {
                let parent = bound(query, "Parent_NodesID");
                joins.retain(|(p, _)| *p != parent);
            }
            QueryKind::Delete => {
                let id = bound(query, "NodesID");
                rows.remove(&id);
            }
            _ => {}
        }
    }
}

fn bound(query: &strata::Query, name: &str) -> i64 {
    query
        .parameters
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.value.clone().to_i64().unwrap())
        .unwrap()
}

#[test]
fn deleting_two_of_six_rows_cascades_their_join_rows_only() {
    let source = node_source(false);
    let provider = QueryProviderManager::new();

    // Six rows; 1 and 2 hold join rows to their children.
    let mut rows: BTreeSet<i64> = (1..=6).collect();
    let mut joins = vec![(1, 3), (1, 4), (2, 5)];

    let one = node(1);
    one.borrow_mut().add_related("Children", node(3));
    one.borrow_mut().add_related("Children", node(4));
    let two = node(2);
    two.borrow_mut().add_related("Children", node(5));

    let mut command = DeleteCommand::new(&source, &provider);
    command.add(one).add(two);

    let mut batch = RecordingBatch::new();
    command.execute(&mut batch).unwrap();

    apply(&batch, &mut rows, &mut joins);

    assert_eq!(rows, BTreeSet::from([3, 4, 5, 6]));
    assert!(joins.is_empty());
}

#[test]
fn cascade_deletes_referenced_children_too() {
    let source = node_source(true);
    let provider = QueryProviderManager::new();

    let mut rows: BTreeSet<i64> = (1..=6).collect();
    let mut joins = vec![(1, 3), (1, 4)];

    let one = node(1);
    one.borrow_mut().add_related("Children", node(3));
    one.borrow_mut().add_related("Children", node(4));

    let mut command = DeleteCommand::new(&source, &provider);
    command.add(one);

    let mut batch = RecordingBatch::new();
    command.execute(&mut batch).unwrap();

    apply(&batch, &mut rows, &mut joins);

    assert_eq!(rows, BTreeSet::from([2, 5, 6]));
    assert!(joins.is_empty());
}

#[tokio::test]
async fn async_delete_matches_sync_behavior() {
    let source = node_source(false);
    let provider = QueryProviderManager::new();

    let mut command = DeleteCommand::new(&source, &provider);
    command.add(node(1));

    let mut batch = RecordingBatch::new();
    let rows = command.execute_async(&mut batch).await.unwrap();

    // One join clear plus one row delete.
    assert_eq!(rows, 2);
}
