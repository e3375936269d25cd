use crate::TypeKey;
use std::fmt;

/// Returns early with a message-kind [`Error`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Creates a message-kind [`Error`] from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur while building or using a mapping snapshot.
///
/// Configuration problems (duplicate registrations, invalid property
/// declarations) surface at construction time with a structured kind.
/// Resolution gaps never produce an error; they degrade to empty results at
/// the call site.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

#[derive(Debug)]
pub enum ErrorKind {
    /// Two mappings were registered for the same type on one source.
    DuplicateMapping { ty: TypeKey },

    /// A lookup required a mapping that was never registered.
    MissingMapping { ty: TypeKey },

    /// A property declaration failed argument validation.
    InvalidProperty { message: String },

    /// Ad-hoc message, produced by the `bail!`/`err!` macros.
    Message(String),

    /// Error raised by an external collaborator (e.g. the batch executor).
    Anyhow(anyhow::Error),
}

impl Error {
    pub fn duplicate_mapping(ty: TypeKey) -> Error {
        ErrorKind::DuplicateMapping { ty }.into()
    }

    pub fn missing_mapping(ty: TypeKey) -> Error {
        ErrorKind::MissingMapping { ty }.into()
    }

    pub fn invalid_property(message: impl Into<String>) -> Error {
        ErrorKind::InvalidProperty {
            message: message.into(),
        }
        .into()
    }

    #[doc(hidden)]
    pub fn from_args(args: fmt::Arguments<'_>) -> Error {
        ErrorKind::Message(args.to_string()).into()
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn is_duplicate_mapping(&self) -> bool {
        matches!(self.kind, ErrorKind::DuplicateMapping { .. })
    }

    pub fn is_invalid_property(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidProperty { .. })
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error { kind }
    }
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        ErrorKind::Anyhow(value).into()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::DuplicateMapping { ty } => {
                write!(f, "mapping for type `{ty}` registered more than once")
            }
            ErrorKind::MissingMapping { ty } => {
                write!(f, "no mapping registered for type `{ty}`")
            }
            ErrorKind::InvalidProperty { message } => {
                write!(f, "invalid property declaration: {message}")
            }
            ErrorKind::Message(message) => f.write_str(message),
            ErrorKind::Anyhow(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
