use strata_core::{stmt::Parameter, TypeKey};

/// The kind of statement a generator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Insert,
    Update,
    Delete,
    Select,
    /// Provider preamble (temp variable declarations) emitted before the
    /// main statements of a batch.
    Declarations,
    /// Second-phase statements rewriting relationship link rows.
    JoinsSave,
    /// Second-phase statements clearing relationship link rows.
    JoinsDelete,
}

/// How the statement text is interpreted by the batch executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Text,
}

/// One generated statement together with its bound parameters.
///
/// Values are always bound, never formatted into the statement text.
#[derive(Debug, Clone)]
pub struct Query {
    /// The mapped type the statement operates on.
    pub associated_type: TypeKey,

    pub command: CommandKind,

    pub text: String,

    pub kind: QueryKind,

    pub parameters: Vec<Parameter>,
}

impl Query {
    pub fn new(associated_type: TypeKey, text: impl Into<String>, kind: QueryKind) -> Query {
        Query {
            associated_type,
            command: CommandKind::Text,
            text: text.into(),
            kind,
            parameters: vec![],
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Query {
        self.parameters = parameters;
        self
    }
}
