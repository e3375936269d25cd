use crate::stmt::{Type, Value};

/// A database table definition, as contributed by property declarations.
///
/// Consumed by the external schema-diffing/DDL engine; this layer only
/// assembles the definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Schema the table lives in.
    pub schema: String,

    /// Name of the table.
    pub name: String,

    /// The table's columns.
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Table {
        Table {
            schema: schema.into(),
            name: name.into(),
            columns: vec![],
        }
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Name of the column in the database.
    pub name: String,

    /// The column's value type.
    pub ty: Type,

    /// Maximum length for textual columns, `None` when unbounded/unset.
    pub max_length: Option<u32>,

    /// Whether or not the column is nullable.
    pub nullable: bool,

    /// True if the column is auto-incremented on insert.
    pub auto_increment: bool,

    /// True if the column is part of the table's primary key.
    pub primary_key: bool,

    /// True if the column carries an index.
    pub index: bool,

    /// True if the column carries a unique constraint.
    pub unique: bool,

    /// Foreign key target, when the column references another table.
    pub foreign_key: Option<ForeignKey>,

    /// Default value expression.
    pub default_value: Value,

    /// Computed column specification, empty when the column is stored.
    pub computed_spec: String,
}

/// Foreign key target of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}
