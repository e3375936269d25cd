mod generator;
pub use generator::SqlGenerator;

mod ident;

mod provider;
pub use provider::QueryProviderManager;

mod query;
pub use query::{CommandKind, Query, QueryKind};
