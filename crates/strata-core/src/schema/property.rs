mod id;
pub use id::IdProperty;

mod reference;
pub use reference::ReferenceProperty;

mod map;
pub use map::MapProperty;

mod many_to_one;
pub use many_to_one::ManyToOneProperty;

mod many_to_many;
pub use many_to_many::ManyToManyProperty;

use crate::{stmt::Type, TypeKey};
use std::sync::Arc;

/// A persisted property, dispatched by variant.
///
/// Relationship generation pattern-matches on this union instead of going
/// through virtual dispatch; each variant is a plain data struct configured
/// through consuming fluent builders at declaration time and frozen into an
/// `Arc` once the mapping snapshot is built.
#[derive(Debug, Clone)]
pub enum Property {
    Id(Arc<IdProperty>),
    Reference(Arc<ReferenceProperty>),
    Map(Arc<MapProperty>),
    ManyToOne(Arc<ManyToOneProperty>),
    ManyToMany(Arc<ManyToManyProperty>),
}

impl Property {
    pub fn name(&self) -> &str {
        match self {
            Property::Id(p) => &p.name,
            Property::Reference(p) => &p.name,
            Property::Map(p) => &p.name,
            Property::ManyToOne(p) => &p.name,
            Property::ManyToMany(p) => &p.name,
        }
    }

    /// The mapping that declared the property.
    pub fn parent(&self) -> TypeKey {
        match self {
            Property::Id(p) => p.parent,
            Property::Reference(p) => p.parent,
            Property::Map(p) => p.parent,
            Property::ManyToOne(p) => p.parent,
            Property::ManyToMany(p) => p.parent,
        }
    }

    /// True when dependent objects are saved/deleted transitively through
    /// this property. Scalar properties never cascade.
    pub fn cascade(&self) -> bool {
        match self {
            Property::Id(_) | Property::Reference(_) => false,
            Property::Map(p) => p.cascade,
            Property::ManyToOne(p) => p.cascade,
            Property::ManyToMany(p) => p.cascade,
        }
    }
}

/// A resolved relationship column: where a foreign/back-reference value
/// lands, which property of the source instance supplies it, and which
/// entity table column it refers back to.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkColumn {
    /// Column (and parameter) name.
    pub column_name: String,

    /// Name of the instance property the value is read from.
    pub property: String,

    /// Table holding the referenced ID column.
    pub target_table: String,

    /// The referenced ID column.
    pub target_column: String,

    /// Value type of the column.
    pub ty: Type,
}

/// Naming information about one mapped type, handed to relationship
/// properties during setup. Relationship column names depend on the
/// resolved foreign mapping, which is only known once the whole mapping
/// set has been indexed.
#[derive(Debug, Clone)]
pub(crate) struct TypeNames {
    pub table: String,
    pub ids: Vec<IdColumn>,
}

/// One effective ID column of a mapped type.
///
/// `table` is the table of the mapping that declared the ID, which may be
/// an ancestor of the type being described. Relationship columns are
/// prefixed with the declaring table's name.
#[derive(Debug, Clone)]
pub(crate) struct IdColumn {
    pub property: String,
    pub column_name: String,
    pub table: String,
    pub ty: Type,
}
