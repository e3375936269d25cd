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

/// Prefix applied to the owning side's ID columns when both sides of the
/// join reference the same mapping.
pub const SELF_REFERENCE_PREFIX: &str = "Parent_";

/// A many-to-many relationship stored in an auxiliary join table.
#[derive(Debug, Clone)]
pub struct ManyToManyProperty {
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

    /// Whether referenced objects are saved/deleted transitively.
    pub cascade: bool,

    /// Join table name. Empty until setup resolves the foreign mapping.
    pub table_name: String,

    /// Join table columns holding the referenced items' IDs.
    pub foreign_columns: Vec<LinkColumn>,

    /// Join table columns holding the owner's IDs. Prefixed with
    /// [`SELF_REFERENCE_PREFIX`] when the relationship is self-referencing.
    pub owner_columns: Vec<LinkColumn>,

    /// True when both sides reference the same mapping.
    pub self_referencing: bool,
}

impl ManyToManyProperty {
    pub fn new(
        name: &str,
        foreign: impl Into<TypeKey>,
        mapping: &Mapping,
    ) -> Result<ManyToManyProperty> {
        if name.is_empty() {
            return Err(Error::invalid_property(
                "many-to-many property name must not be empty",
            ));
        }

        Ok(ManyToManyProperty {
            name: name.to_string(),
            parent: mapping.ty,
            parent_table: mapping.table_name.clone(),
            parent_schema: mapping.schema_name.clone(),
            foreign: foreign.into(),
            cascade: false,
            table_name: String::new(),
            foreign_columns: vec![],
            owner_columns: vec![],
            self_referencing: false,
        })
    }

    pub fn cascade(mut self) -> Self {
        self.cascade = true;
        self
    }

    /// Resolves the join table and its column names once both participating
    /// mappings are known.
    pub(crate) fn setup(&mut self, own: &TypeNames, foreign: Option<&TypeNames>) {
        let Some(foreign) = foreign else {
            return;
        };

        self.self_referencing = self.foreign == self.parent;
        self.table_name = format!("{}_{}", foreign.table, own.table);

        self.foreign_columns = foreign
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

        let owner_prefix = if self.self_referencing {
            SELF_REFERENCE_PREFIX
        } else {
            ""
        };
        self.owner_columns = own
            .ids
            .iter()
            .map(|id| LinkColumn {
                column_name: format!("{owner_prefix}{}{}", id.table, id.column_name),
                property: id.property.clone(),
                target_table: id.table.clone(),
                target_column: id.column_name.clone(),
                ty: id.ty,
            })
            .collect();
    }

    /// Builds the join table definition: both sides' ID columns, each a
    /// foreign key back to its entity table.
    pub fn build_join_table(&self) -> Table {
        let mut table = Table::new(self.parent_schema.clone(), self.table_name.clone());

        for link in self.foreign_columns.iter().chain(&self.owner_columns) {
            table.add_column(Column {
                name: link.column_name.clone(),
                ty: link.ty,
                max_length: None,
                nullable: false,
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

        table
    }

    /// Binds one join row: the referenced item's ID values followed by the
    /// owner's ID values, in join-column order.
    pub fn get_as_parameter(&self, entity: &dyn Entity, item: &dyn Entity) -> Vec<Parameter> {
        let mut parameters = Vec::with_capacity(self.foreign_columns.len() + self.owner_columns.len());

        for link in &self.foreign_columns {
            parameters.push(Parameter::new(link.column_name.clone(), item.get(&link.property)));
        }
        for link in &self.owner_columns {
            parameters.push(Parameter::new(
                link.column_name.clone(),
                entity.get(&link.property),
            ));
        }

        parameters
    }
}
