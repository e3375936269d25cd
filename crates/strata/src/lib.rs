mod batch;
pub use batch::{BatchResult, QueryBatch, RecordingBatch};

pub mod commands;
pub use commands::{DeleteCommand, SaveCommand};

pub use strata_core::{
    schema, stmt, ChangeSet, Database, DynamicEntity, Entity, EntityRef, Error, Mapping,
    MappingManager, MappingSource, Result, TypeKey,
};
pub use strata_sql::{Query, QueryKind, QueryProviderManager, SqlGenerator};
