use crate::{
    entity::Entity,
    schema::{
        db::{Column, ForeignKey, Table},
        property::{LinkColumn, TypeNames},
        Mapping,
    },
    stmt::{Parameter, Value},
    Error, Result, TypeKey,
};

/// A one-to-one relationship stored as foreign key column(s) on the owning
/// mapping's table.
#[derive(Debug, Clone)]
pub struct MapProperty {
    /// Property name on the mapped type.
    pub name: String,

    /// The mapping that declared the property.
    pub parent: TypeKey,

    /// Table name of the declaring mapping.
    pub parent_table: String,

    /// Schema name of the declaring mapping.
    pub parent_schema: String,

    /// The referenced mapped type.
    pub foreign: TypeKey,

    /// Whether the referenced object is saved/deleted transitively.
    pub cascade: bool,

    /// Foreign key columns on the owning table, one per referenced ID
    /// property. Empty until setup resolves the foreign mapping.
    pub columns: Vec<LinkColumn>,
}

impl MapProperty {
    pub fn new(name: &str, foreign: impl Into<TypeKey>, mapping: &Mapping) -> Result<MapProperty> {
        if name.is_empty() {
            return Err(Error::invalid_property("map property name must not be empty"));
        }

        Ok(MapProperty {
            name: name.to_string(),
            parent: mapping.ty,
            parent_table: mapping.table_name.clone(),
            parent_schema: mapping.schema_name.clone(),
            foreign: foreign.into(),
            cascade: false,
            columns: vec![],
        })
    }

    pub fn cascade(mut self) -> Self {
        self.cascade = true;
        self
    }

    /// Resolves the foreign key column names once the foreign mapping is
    /// known. A missing foreign mapping leaves the columns unresolved and
    /// downstream generation degrades to empty results.
    pub(crate) fn setup(&mut self, foreign: Option<&TypeNames>) {
        let Some(foreign) = foreign else {
            return;
        };

        self.columns = foreign
            .ids
            .iter()
            .map(|id| LinkColumn {
                column_name: format!("{}{}", id.table, id.column_name),
                property: id.property.clone(),
                target_table: id.table.clone(),
                target_column: id.column_name.clone(),
                ty: id.ty,
            })
            .collect();
    }

    /// Contributes nullable foreign key columns to the owning table.
    pub fn add_to_table(&self, table: &mut Table) {
        for link in &self.columns {
            table.add_column(Column {
                name: link.column_name.clone(),
                ty: link.ty,
                max_length: None,
                nullable: true,
                auto_increment: false,
                primary_key: false,
                index: true,
                unique: false,
                foreign_key: Some(ForeignKey {
                    table: link.target_table.clone(),
                    column: link.target_column.clone(),
                }),
                default_value: Value::Null,
                computed_spec: String::new(),
            });
        }
    }

    /// Binds the referenced instance's ID values, `Null` when the property
    /// is unset.
    pub fn get_as_parameter(&self, entity: &dyn Entity) -> Vec<Parameter> {
        let related = entity.related(&self.name);
        let target = related.first();

        self.columns
            .iter()
            .map(|link| {
                let value = match target {
                    Some(target) => target.borrow().get(&link.property),
                    None => Value::Null,
                };
                Parameter::new(link.column_name.clone(), value)
            })
            .collect()
    }
}
