use crate::{
    entity::Entity,
    schema::{
        db::{Column, ForeignKey, Table},
        Mapping,
    },
    stmt::{Parameter, Type, Value},
    Error, Result, TypeKey,
};

use std::hash::{Hash, Hasher};

/// A primary-key-bearing property.
///
/// Derived defaults: the column name is the mapping prefix + property name +
/// mapping suffix, textual values get a max length of 100, and the column is
/// indexed and unique.
#[derive(Debug, Clone)]
pub struct IdProperty {
    /// Property name on the mapped type.
    pub name: String,

    /// Column name in the owning mapping's table.
    pub column_name: String,

    /// Value type of the property.
    pub ty: Type,

    /// The mapping that declared the property.
    pub parent: TypeKey,

    /// Table name of the declaring mapping.
    pub parent_table: String,

    /// Schema name of the declaring mapping.
    pub parent_schema: String,

    pub nullable: bool,
    pub max_length: Option<u32>,
    pub default_value: Value,
    pub constraints: Vec<String>,
    pub computed_spec: String,
    pub auto_increment: bool,
    pub index: bool,
    pub read_only: bool,
    pub unique: bool,
}

impl IdProperty {
    /// Declares an ID property on a mapping. Fails with an argument error
    /// when the property name is empty.
    pub fn new(name: &str, ty: Type, mapping: &Mapping) -> Result<IdProperty> {
        if name.is_empty() {
            return Err(Error::invalid_property("ID property name must not be empty"));
        }

        Ok(IdProperty {
            name: name.to_string(),
            column_name: mapping.column_name(name),
            ty,
            parent: mapping.ty,
            parent_table: mapping.table_name.clone(),
            parent_schema: mapping.schema_name.clone(),
            nullable: false,
            max_length: ty.is_text().then_some(100),
            default_value: Value::Null,
            constraints: vec![],
            computed_spec: String::new(),
            auto_increment: false,
            index: true,
            read_only: false,
            unique: true,
        })
    }

    pub fn with_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = column_name.into();
        self
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_default_value(mut self, value: Value) -> Self {
        self.default_value = value;
        self
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn with_computed_column(mut self, spec: impl Into<String>) -> Self {
        self.computed_spec = spec.into();
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.index = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Name under which values of this property are bound to statements.
    pub fn parameter_name(&self) -> String {
        format!("{}{}", self.parent_table, self.column_name)
    }

    /// Contributes the property's column to its own table definition.
    pub fn add_to_table(&self, table: &mut Table) {
        table.add_column(Column {
            name: self.column_name.clone(),
            ty: self.ty,
            max_length: self.max_length,
            nullable: self.nullable,
            auto_increment: self.auto_increment,
            primary_key: true,
            index: self.index,
            unique: self.unique,
            foreign_key: None,
            default_value: self.default_value.clone(),
            computed_spec: self.computed_spec.clone(),
        });
    }

    /// Contributes the property to a descendant type's table, prefixed with
    /// the owning table name and referencing it as a foreign key.
    pub fn add_to_child_table(&self, table: &mut Table) {
        table.add_column(Column {
            name: format!("{}{}", self.parent_table, self.column_name),
            ty: self.ty,
            max_length: self.max_length,
            nullable: self.nullable,
            auto_increment: false,
            primary_key: true,
            index: self.index,
            unique: false,
            foreign_key: Some(ForeignKey {
                table: self.parent_table.clone(),
                column: self.column_name.clone(),
            }),
            default_value: self.default_value.clone(),
            computed_spec: self.computed_spec.clone(),
        });
    }

    /// Extracts the instance's value for this property as a bound parameter.
    pub fn get_as_parameter(&self, entity: &dyn Entity) -> Parameter {
        Parameter::new(self.parameter_name(), entity.get(&self.name))
    }

    /// True when the instance still holds the unset default for this ID.
    pub fn is_default(&self, entity: &dyn Entity) -> bool {
        entity.get(&self.name).is_default()
    }
}

impl PartialEq for IdProperty {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.parent == other.parent
    }
}

impl Eq for IdProperty {}

impl Hash for IdProperty {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.parent.hash(state);
    }
}
