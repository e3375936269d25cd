pub mod db;

mod mapping;
pub use mapping::Mapping;

pub mod property;
pub use property::{
    IdProperty, ManyToManyProperty, ManyToOneProperty, MapProperty, Property, ReferenceProperty,
};
