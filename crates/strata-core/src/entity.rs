use crate::{stmt::Value, TypeKey};

use by_address::ByAddress;
use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

/// Capability persisted instances expose to the mapping layer.
///
/// Scalar property access covers ID and reference properties; relationship
/// properties surface the referenced instances through [`Entity::related`].
pub trait Entity {
    /// The mapped type this instance belongs to.
    fn type_key(&self) -> TypeKey;

    /// Returns the value of a scalar property, `Value::Null` when unset.
    fn get(&self, property: &str) -> Value;

    /// Writes a scalar property. Used to reflect generated IDs back into
    /// instances after the insert batch executes.
    fn set(&mut self, property: &str, value: Value);

    /// Returns the instances referenced by a relationship property. Map and
    /// scalar many-to-one properties yield zero or one entry.
    fn related(&self, property: &str) -> Vec<EntityRef> {
        let _ = property;
        Vec::new()
    }

    /// Adds an instance to a relationship property. Cyclic graphs can only
    /// be linked up after both instances are wrapped in shared handles.
    fn add_related(&mut self, property: &str, entity: EntityRef) {
        let _ = (property, entity);
    }
}

/// Shared handle to a persisted instance.
pub type EntityRef = Rc<RefCell<dyn Entity>>;

/// Property-bag implementation of [`Entity`].
///
/// Stands in for domain objects in tests and for callers that do not want
/// to hand-implement the trait.
pub struct DynamicEntity {
    ty: TypeKey,
    values: HashMap<String, Value>,
    related: HashMap<String, Vec<EntityRef>>,
}

impl DynamicEntity {
    pub fn new(ty: impl Into<TypeKey>) -> DynamicEntity {
        DynamicEntity {
            ty: ty.into(),
            values: HashMap::new(),
            related: HashMap::new(),
        }
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(property.into(), value.into());
        self
    }

    pub fn add_related(&mut self, property: impl Into<String>, entity: EntityRef) {
        self.related.entry(property.into()).or_default().push(entity);
    }

    pub fn into_ref(self) -> EntityRef {
        Rc::new(RefCell::new(self))
    }
}

impl Entity for DynamicEntity {
    fn type_key(&self) -> TypeKey {
        self.ty
    }

    fn get(&self, property: &str) -> Value {
        self.values.get(property).cloned().unwrap_or(Value::Null)
    }

    fn set(&mut self, property: &str, value: Value) {
        self.values.insert(property.to_string(), value);
    }

    fn related(&self, property: &str) -> Vec<EntityRef> {
        self.related.get(property).cloned().unwrap_or_default()
    }

    fn add_related(&mut self, property: &str, entity: EntityRef) {
        DynamicEntity::add_related(self, property, entity);
    }
}

/// Externally injected dirty set.
///
/// Replaces an interception/change-tracking aspect on the instances
/// themselves: the caller records which properties changed per instance and
/// hands the set to the save orchestrator alongside the objects.
///
/// Instances are keyed by pointer identity, so two structurally equal
/// objects are still tracked independently.
#[derive(Default)]
pub struct ChangeSet {
    tracked: HashMap<ByAddress<EntityRef>, HashSet<String>>,
}

impl ChangeSet {
    pub fn new() -> ChangeSet {
        ChangeSet::default()
    }

    /// Marks an instance as tracked without recording any change. Tracked
    /// instances carry persistent identity and always route to update.
    pub fn track(&mut self, entity: &EntityRef) {
        self.tracked.entry(ByAddress(entity.clone())).or_default();
    }

    /// Records a changed property on an instance, tracking it if needed.
    pub fn mark(&mut self, entity: &EntityRef, property: &str) {
        self.tracked
            .entry(ByAddress(entity.clone()))
            .or_default()
            .insert(property.to_string());
    }

    pub fn is_tracked(&self, entity: &EntityRef) -> bool {
        self.tracked.contains_key(&ByAddress(entity.clone()))
    }

    /// True when the instance is tracked but no property was recorded as
    /// changed. Such instances can skip persistence entirely.
    pub fn is_clean(&self, entity: &EntityRef) -> bool {
        self.tracked
            .get(&ByAddress(entity.clone()))
            .is_some_and(|changed| changed.is_empty())
    }

    pub fn is_changed(&self, entity: &EntityRef, property: &str) -> bool {
        self.tracked
            .get(&ByAddress(entity.clone()))
            .is_some_and(|changed| changed.contains(property))
    }

    /// Cascade gate: untracked instances cascade unconditionally, tracked
    /// instances cascade only through properties recorded as changed.
    pub fn should_cascade(&self, entity: &EntityRef, property: &str) -> bool {
        match self.tracked.get(&ByAddress(entity.clone())) {
            Some(changed) => changed.contains(property),
            None => true,
        }
    }
}
