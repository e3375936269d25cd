mod error;
pub use error::{Error, ErrorKind};

mod type_key;
pub use type_key::TypeKey;

pub mod entity;
pub use entity::{ChangeSet, DynamicEntity, Entity, EntityRef};

pub mod graph;
pub use graph::TypeGraph;

mod manager;
pub use manager::MappingManager;

mod merge;
pub use merge::MergeMappings;

mod reduce;
pub use reduce::ReduceMappings;

pub mod schema;
pub use schema::Mapping;

mod source;
pub use source::{Database, MappingSource};

pub mod stmt;

/// A Result type alias that uses Strata's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
