use std::fmt;

/// Stable identifier for a mapped type.
///
/// Mappings, type graphs, and generator registries are all keyed by
/// `TypeKey`. Using an interned string rather than runtime type information
/// keeps every dispatch table a plain map lookup.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TypeKey(pub &'static str);

impl TypeKey {
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl From<&'static str> for TypeKey {
    fn from(value: &'static str) -> Self {
        TypeKey(value)
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "TypeKey({})", self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.0)
    }
}
