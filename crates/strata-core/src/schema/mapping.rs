use crate::{
    schema::property::{
        IdProperty, ManyToManyProperty, ManyToOneProperty, MapProperty, Property, ReferenceProperty,
    },
    TypeKey,
};

use std::sync::Arc;

/// One declared class-to-table binding.
///
/// A mapping is a plain mutable value during declaration; the mapping
/// manager consumes the declared set, resolves relationship columns, and
/// freezes everything into `Arc`s. Exactly one mapping may exist per type
/// per data source.
#[derive(Debug, Clone)]
pub struct Mapping {
    /// The mapped type.
    pub ty: TypeKey,

    /// Name of the backing table.
    pub table_name: String,

    /// Schema the table lives in.
    pub schema_name: String,

    /// Prefix applied to derived column names.
    pub prefix: String,

    /// Suffix applied to derived column names.
    pub suffix: String,

    /// Declaration order, used for deterministic schema-build ordering.
    pub order: i32,

    /// Declared direct ancestors (base types/interfaces), in declaration
    /// order. Only ancestors with their own mapping take part in the type
    /// graph.
    pub parents: Vec<TypeKey>,

    pub id_properties: Vec<Arc<IdProperty>>,
    pub reference_properties: Vec<Arc<ReferenceProperty>>,
    pub map_properties: Vec<Arc<MapProperty>>,
    pub many_to_one_properties: Vec<Arc<ManyToOneProperty>>,
    pub many_to_many_properties: Vec<Arc<ManyToManyProperty>>,
}

impl Mapping {
    pub fn new(ty: impl Into<TypeKey>, table_name: impl Into<String>) -> Mapping {
        Mapping {
            ty: ty.into(),
            table_name: table_name.into(),
            schema_name: "dbo".to_string(),
            prefix: String::new(),
            suffix: String::new(),
            order: 10,
            parents: vec![],
            id_properties: vec![],
            reference_properties: vec![],
            map_properties: vec![],
            many_to_one_properties: vec![],
            many_to_many_properties: vec![],
        }
    }

    pub fn with_schema_name(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = schema_name.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Declares a direct ancestor.
    pub fn extends(mut self, parent: impl Into<TypeKey>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Derived column name for a property declared on this mapping.
    pub fn column_name(&self, property_name: &str) -> String {
        format!("{}{}{}", self.prefix, property_name, self.suffix)
    }

    pub fn add_id(&mut self, property: IdProperty) {
        self.id_properties.push(Arc::new(property));
    }

    pub fn add_reference(&mut self, property: ReferenceProperty) {
        self.reference_properties.push(Arc::new(property));
    }

    pub fn add_map(&mut self, property: MapProperty) {
        self.map_properties.push(Arc::new(property));
    }

    pub fn add_many_to_one(&mut self, property: ManyToOneProperty) {
        self.many_to_one_properties.push(Arc::new(property));
    }

    pub fn add_many_to_many(&mut self, property: ManyToManyProperty) {
        self.many_to_many_properties.push(Arc::new(property));
    }

    /// Looks a property up by name across every variant collection.
    pub fn property(&self, name: &str) -> Option<Property> {
        if let Some(p) = self.id_properties.iter().find(|p| p.name == name) {
            return Some(Property::Id(p.clone()));
        }
        if let Some(p) = self.reference_properties.iter().find(|p| p.name == name) {
            return Some(Property::Reference(p.clone()));
        }
        if let Some(p) = self.map_properties.iter().find(|p| p.name == name) {
            return Some(Property::Map(p.clone()));
        }
        if let Some(p) = self.many_to_one_properties.iter().find(|p| p.name == name) {
            return Some(Property::ManyToOne(p.clone()));
        }
        if let Some(p) = self.many_to_many_properties.iter().find(|p| p.name == name) {
            return Some(Property::ManyToMany(p.clone()));
        }
        None
    }

    /// Relationship properties in cascade order: map, many-to-many,
    /// many-to-one.
    pub fn relationship_properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.map_properties
            .iter()
            .map(|p| Property::Map(p.clone()))
            .chain(
                self.many_to_many_properties
                    .iter()
                    .map(|p| Property::ManyToMany(p.clone())),
            )
            .chain(
                self.many_to_one_properties
                    .iter()
                    .map(|p| Property::ManyToOne(p.clone())),
            )
    }
}
