use crate::Result;

/// A column/property value, as bound to a statement parameter.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// 64-bit float
    F64(f64),

    /// String value
    String(String),

    /// Null value
    #[default]
    Null,
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True when the value is the unset default for its type.
    ///
    /// Auto-increment ID properties holding their default value mark an
    /// object that has never been inserted.
    pub fn is_default(&self) -> bool {
        match self {
            Self::Bool(v) => !v,
            Self::I32(v) => *v == 0,
            Self::I64(v) => *v == 0,
            Self::F64(v) => *v == 0.0,
            Self::String(v) => v.is_empty(),
            Self::Null => true,
        }
    }

    pub fn to_i64(self) -> Result<i64> {
        match self {
            Self::I32(v) => Ok(v as i64),
            Self::I64(v) => Ok(v),
            _ => Err(crate::err!("cannot convert value to i64: {self:?}")),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// The property value type, from the mapping layer's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Bool,
    I32,
    I64,
    F64,
    Text,
}

impl Type {
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}

/// A named parameter bound to a generated statement.
///
/// Parameters are the only path by which instance values reach statement
/// text; values are never formatted into the SQL itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name, without the flavor's placeholder sigil.
    pub name: String,

    /// The bound value.
    pub value: Value,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: Value) -> Parameter {
        Parameter {
            name: name.into(),
            value,
        }
    }
}
