use crate::{
    entity::Entity,
    schema::{
        db::{Column, Table},
        Mapping,
    },
    stmt::{Parameter, Type, Value},
    Error, Result, TypeKey,
};

/// A plain scalar column.
#[derive(Debug, Clone)]
pub struct ReferenceProperty {
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
    pub index: bool,
    pub read_only: bool,
    pub unique: bool,
}

impl ReferenceProperty {
    pub fn new(name: &str, ty: Type, mapping: &Mapping) -> Result<ReferenceProperty> {
        if name.is_empty() {
            return Err(Error::invalid_property(
                "reference property name must not be empty",
            ));
        }

        Ok(ReferenceProperty {
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
            index: false,
            read_only: false,
            unique: false,
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

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
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

    pub fn add_to_table(&self, table: &mut Table) {
        table.add_column(Column {
            name: self.column_name.clone(),
            ty: self.ty,
            max_length: self.max_length,
            nullable: self.nullable,
            auto_increment: false,
            primary_key: false,
            index: self.index,
            unique: self.unique,
            foreign_key: None,
            default_value: self.default_value.clone(),
            computed_spec: self.computed_spec.clone(),
        });
    }

    pub fn get_as_parameter(&self, entity: &dyn Entity) -> Parameter {
        Parameter::new(self.column_name.clone(), entity.get(&self.name))
    }
}
