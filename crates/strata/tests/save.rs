use strata::{
    schema::{IdProperty, ManyToManyProperty, ReferenceProperty},
    stmt::{Type, Value},
    ChangeSet, Database, DynamicEntity, EntityRef, Mapping, MappingManager, MappingSource,
    QueryBatch, QueryKind, QueryProviderManager, RecordingBatch, SaveCommand, TypeKey,
};

use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::sync::Arc;

fn playlist_source() -> Arc<MappingSource> {
    let mut track = Mapping::new("Track", "Tracks");
    let id = IdProperty::new("ID", Type::I64, &track)
        .unwrap()
        .auto_increment();
    track.add_id(id);
    track.add_reference(ReferenceProperty::new("Title", Type::Text, &track).unwrap());

    let mut playlist = Mapping::new("Playlist", "Playlists");
    let id = IdProperty::new("ID", Type::I64, &playlist)
        .unwrap()
        .auto_increment();
    playlist.add_id(id);
    playlist.add_many_to_many(
        ManyToManyProperty::new("Tracks", "Track", &playlist)
            .unwrap()
            .cascade(),
    );

    let manager = MappingManager::new(vec![track, playlist]).unwrap();
    Arc::new(MappingSource::new(manager, Database::new("default")))
}

fn node_source() -> Arc<MappingSource> {
    let mut node = Mapping::new("Node", "Nodes");
    let id = IdProperty::new("ID", Type::I64, &node)
        .unwrap()
        .auto_increment();
    node.add_id(id);
    node.add_many_to_many(
        ManyToManyProperty::new("Children", "Node", &node)
            .unwrap()
            .cascade(),
    );

    let manager = MappingManager::new(vec![node]).unwrap();
    Arc::new(MappingSource::new(manager, Database::new("default")))
}

#[test]
fn inserts_cascade_and_write_generated_ids_back() {
    let source = playlist_source();
    let provider = QueryProviderManager::new();
    let changes = ChangeSet::new();

    let track_a = DynamicEntity::new("Track").with("Title", "one").into_ref();
    let track_b = DynamicEntity::new("Track").with("Title", "two").into_ref();
    let mut playlist = DynamicEntity::new("Playlist");
    playlist.add_related("Tracks", track_a.clone());
    playlist.add_related("Tracks", track_b.clone());
    let playlist = playlist.into_ref();

    let mut command = SaveCommand::new(&source, &provider, &changes);
    command.add(playlist.clone());

    let mut batch = RecordingBatch::new();
    let rows = command.execute(&mut batch).unwrap();

    // 2 declarations (per-type, deduplicated) + 3 inserts + 1 join clear +
    // 2 join upserts.
    assert_eq!(rows, 8);

    let inserts: Vec<_> = batch
        .executed
        .iter()
        .filter(|q| q.kind == QueryKind::Insert)
        .collect();
    assert_eq!(inserts.len(), 3);

    // Cascaded children insert before the owner.
    assert_eq!(inserts[0].associated_type, TypeKey("Track"));
    assert_eq!(inserts[1].associated_type, TypeKey("Track"));
    assert_eq!(inserts[2].associated_type, TypeKey("Playlist"));

    // Generated IDs were reflected back before the join batch.
    assert_eq!(track_a.borrow().get("ID"), Value::I64(1));
    assert_eq!(track_b.borrow().get("ID"), Value::I64(2));
    assert_eq!(playlist.borrow().get("ID"), Value::I64(3));

    let joins_save: Vec<_> = batch
        .executed
        .iter()
        .filter(|q| q.kind == QueryKind::JoinsSave)
        .collect();
    assert_eq!(joins_save.len(), 2);
    for (join, track_id) in joins_save.iter().zip([1i64, 2]) {
        let bound: Vec<_> = join.parameters.iter().map(|p| p.value.clone()).collect();
        assert_eq!(bound, [Value::I64(track_id), Value::I64(3)]);
    }
}

#[test]
fn declarations_are_deduplicated() {
    let source = playlist_source();
    let provider = QueryProviderManager::new();
    let changes = ChangeSet::new();

    let mut playlist = DynamicEntity::new("Playlist");
    playlist.add_related("Tracks", DynamicEntity::new("Track").into_ref());
    playlist.add_related("Tracks", DynamicEntity::new("Track").into_ref());

    let mut command = SaveCommand::new(&source, &provider, &changes);
    command.add(playlist.into_ref());

    let mut batch = RecordingBatch::new();
    command.execute(&mut batch).unwrap();

    let declarations: Vec<_> = batch
        .executed
        .iter()
        .filter(|q| q.kind == QueryKind::Declarations)
        .collect();
    assert_eq!(declarations.len(), 2);
    assert_eq!(declarations[0].text, "DECLARE @TracksID_Temp AS BIGINT;");
    assert_eq!(declarations[1].text, "DECLARE @PlaylistsID_Temp AS BIGINT;");
}

#[test]
fn populated_auto_increment_ids_route_to_update() {
    let source = playlist_source();
    let provider = QueryProviderManager::new();
    let changes = ChangeSet::new();

    let track = DynamicEntity::new("Track")
        .with("ID", 7i64)
        .with("Title", "renamed")
        .into_ref();

    let mut command = SaveCommand::new(&source, &provider, &changes);
    command.add(track);

    let mut batch = RecordingBatch::new();
    command.execute(&mut batch).unwrap();

    assert!(batch.executed.iter().all(|q| q.kind == QueryKind::Update));
    assert_eq!(batch.executed.len(), 1);
}

#[test]
fn tracked_instances_always_update() {
    let source = playlist_source();
    let provider = QueryProviderManager::new();
    let mut changes = ChangeSet::new();

    // Default (unset) ID, but tracked with a recorded change.
    let track = DynamicEntity::new("Track").with("Title", "draft").into_ref();
    changes.mark(&track, "Title");

    let mut command = SaveCommand::new(&source, &provider, &changes);
    command.add(track);

    let mut batch = RecordingBatch::new();
    command.execute(&mut batch).unwrap();

    assert!(batch
        .executed
        .iter()
        .any(|q| q.kind == QueryKind::Update));
    assert!(batch.executed.iter().all(|q| q.kind != QueryKind::Insert));
}

#[test]
fn clean_tracked_instances_are_skipped() {
    let source = playlist_source();
    let provider = QueryProviderManager::new();
    let mut changes = ChangeSet::new();

    let track = DynamicEntity::new("Track").with("ID", 7i64).into_ref();
    changes.track(&track);

    let mut command = SaveCommand::new(&source, &provider, &changes);
    command.add(track);

    let mut batch = RecordingBatch::new();
    let rows = command.execute(&mut batch).unwrap();

    assert_eq!(rows, 0);
    assert!(batch.executed.is_empty());
}

#[test]
fn self_referencing_cycle_visits_each_object_once() {
    let source = node_source();
    let provider = QueryProviderManager::new();
    let changes = ChangeSet::new();

    // a -> b -> a
    let a = DynamicEntity::new("Node").into_ref();
    let b = DynamicEntity::new("Node").into_ref();
    a.borrow_mut().add_related("Children", b.clone());
    b.borrow_mut().add_related("Children", a.clone());

    let mut command = SaveCommand::new(&source, &provider, &changes);
    command.add(a.clone());

    let mut batch = RecordingBatch::new();
    command.execute(&mut batch).unwrap();

    let inserts = batch
        .executed
        .iter()
        .filter(|q| q.kind == QueryKind::Insert)
        .count();
    assert_eq!(inserts, 2);
}

#[tokio::test]
async fn async_save_matches_sync_behavior() {
    let source = playlist_source();
    let provider = QueryProviderManager::new();
    let changes = ChangeSet::new();

    let mut playlist = DynamicEntity::new("Playlist");
    playlist.add_related("Tracks", DynamicEntity::new("Track").into_ref());
    let playlist = playlist.into_ref();

    let mut command = SaveCommand::new(&source, &provider, &changes);
    command.add(playlist.clone());

    let mut batch = RecordingBatch::new();
    let rows = command.execute_async(&mut batch).await.unwrap();

    assert!(rows > 0);
    assert_eq!(playlist.borrow().get("ID"), Value::I64(2));
}

fn coupon_source() -> Arc<MappingSource> {
    let mut coupon = Mapping::new("Coupon", "Coupons");
    coupon.add_id(IdProperty::new("Code", Type::Text, &coupon).unwrap());

    let mut track = Mapping::new("Track", "Tracks");
    let id = IdProperty::new("ID", Type::I64, &track)
        .unwrap()
        .auto_increment();
    track.add_id(id);

    let manager = MappingManager::new(vec![coupon, track]).unwrap();
    Arc::new(MappingSource::new(manager, Database::new("default")))
}

#[test]
fn natural_key_inserts_do_not_consume_generated_ids() {
    let source = coupon_source();
    let provider = QueryProviderManager::new();
    let changes = ChangeSet::new();

    // The coupon inserts first but its statement returns no generated
    // value; the track must still receive the first one.
    let coupon = DynamicEntity::new("Coupon")
        .with("Code", "SAVE10")
        .into_ref();
    let track = DynamicEntity::new("Track").into_ref();

    let mut command = SaveCommand::new(&source, &provider, &changes);
    command.add(coupon.clone()).add(track.clone());

    let mut batch = RecordingBatch::new();
    command.execute(&mut batch).unwrap();

    assert_eq!(track.borrow().get("ID"), Value::I64(1));
    assert_eq!(coupon.borrow().get("Code"), Value::String("SAVE10".into()));
}

#[test]
fn tracked_scalar_change_still_rewrites_join_rows() {
    let source = playlist_source();
    let provider = QueryProviderManager::new();
    let mut changes = ChangeSet::new();

    let mut playlist = DynamicEntity::new("Playlist").with("ID", 3i64);
    playlist.add_related(
        "Tracks",
        DynamicEntity::new("Track").with("ID", 7i64).into_ref(),
    );
    let playlist = playlist.into_ref();
    changes.mark(&playlist, "Name");

    let mut command = SaveCommand::new(&source, &provider, &changes);
    command.add(playlist);

    let mut batch = RecordingBatch::new();
    command.execute(&mut batch).unwrap();

    // Only a scalar property changed, but the link rows are still
    // rewritten.
    let kinds: Vec<_> = batch.executed.iter().map(|q| q.kind).collect();
    assert!(kinds.contains(&QueryKind::JoinsDelete));
    assert!(kinds.contains(&QueryKind::JoinsSave));
}

fn gallery_source() -> Arc<MappingSource> {
    let mut media = Mapping::new("Media", "Medias");
    let id = IdProperty::new("ID", Type::I64, &media)
        .unwrap()
        .auto_increment();
    media.add_id(id);

    let song = Mapping::new("Song", "Songs").extends("Media");
    let video = Mapping::new("Video", "Videos").extends("Media");

    let mut gallery = Mapping::new("Gallery", "Galleries");
    let id = IdProperty::new("ID", Type::I64, &gallery)
        .unwrap()
        .auto_increment();
    gallery.add_id(id);
    gallery.add_many_to_many(
        ManyToManyProperty::new("Items", "Media", &gallery)
            .unwrap()
            .cascade(),
    );

    let manager = MappingManager::new(vec![media, song, video, gallery]).unwrap();
    Arc::new(MappingSource::new(manager, Database::new("default")))
}

#[test]
fn identical_join_upserts_collapse_before_execution() {
    let source = gallery_source();
    let provider = QueryProviderManager::new();
    let changes = ChangeSet::new();

    let mut gallery = DynamicEntity::new("Gallery");
    gallery.add_related("Items", DynamicEntity::new("Song").into_ref());
    let gallery = gallery.into_ref();

    let mut command = SaveCommand::new(&source, &provider, &changes);
    command.add(gallery);

    let mut batch = RecordingBatch::new();
    command.execute(&mut batch).unwrap();

    // One upsert template per concrete item mapping generates identical
    // statements; a single one reaches the database.
    let joins_save = batch
        .executed
        .iter()
        .filter(|q| q.kind == QueryKind::JoinsSave)
        .count();
    assert_eq!(joins_save, 1);
}

#[test]
fn persisted_objects_reach_the_invalidation_hook() {
    let source = playlist_source();
    let provider = QueryProviderManager::new();
    let changes = ChangeSet::new();

    let invalidated = RefCell::new(vec![]);
    let hook = |entity: &EntityRef| invalidated.borrow_mut().push(entity.borrow().type_key());

    let mut playlist = DynamicEntity::new("Playlist");
    playlist.add_related("Tracks", DynamicEntity::new("Track").into_ref());

    let mut command = SaveCommand::new(&source, &provider, &changes);
    command.add(playlist.into_ref()).on_persisted(&hook);

    let mut batch = RecordingBatch::new();
    command.execute(&mut batch).unwrap();

    assert_eq!(*invalidated.borrow(), [TypeKey("Track"), TypeKey("Playlist")]);
}

struct FailingBatch;

#[async_trait::async_trait(?Send)]
impl QueryBatch for FailingBatch {
    fn add_query(&mut self, _query: &strata::Query) {}

    fn remove_duplicate_commands(&mut self) {}

    fn len(&self) -> usize {
        0
    }

    fn execute(&mut self) -> strata::Result<strata::BatchResult> {
        Err(anyhow::anyhow!("connection reset").into())
    }

    async fn execute_async(&mut self) -> strata::Result<strata::BatchResult> {
        self.execute()
    }
}

#[test]
fn executor_errors_propagate_unchanged() {
    let source = playlist_source();
    let provider = QueryProviderManager::new();
    let changes = ChangeSet::new();

    let mut command = SaveCommand::new(&source, &provider, &changes);
    command.add(DynamicEntity::new("Track").into_ref());

    let err = command.execute(&mut FailingBatch).unwrap_err();
    assert!(err.to_string().contains("connection reset"));
}
