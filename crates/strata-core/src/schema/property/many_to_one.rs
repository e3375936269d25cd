use crate::{
    entity::Entity,
    schema::{
        property::{LinkColumn, TypeNames},
        Mapping,
    },
    stmt::Parameter,
    Error, Result, TypeKey,
};

/// A many-to-one relationship owned on the "one" side.
///
/// The referenced type's table carries a back-reference foreign key to the
/// owner. The property value is either a collection of referenced instances
/// or a single scalar reference.
#[derive(Debug, Clone)]
pub struct ManyToOneProperty {
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

    /// True when the property holds a collection, false for a scalar.
    pub collection: bool,

    /// Whether referenced objects are saved/deleted transitively.
    pub cascade: bool,

    /// Back-reference columns on the referenced type's table, one per owner
    /// ID property. Empty until setup.
    pub back_columns: Vec<LinkColumn>,
}

impl ManyToOneProperty {
    /// Declares a collection-valued many-to-one property.
    pub fn many(
        name: &str,
        foreign: impl Into<TypeKey>,
        mapping: &Mapping,
    ) -> Result<ManyToOneProperty> {
        Self::new(name, foreign, mapping, true)
    }

    /// Declares a scalar-valued many-to-one property.
    pub fn single(
        name: &str,
        foreign: impl Into<TypeKey>,
        mapping: &Mapping,
    ) -> Result<ManyToOneProperty> {
        Self::new(name, foreign, mapping, false)
    }

    fn new(
        name: &str,
        foreign: impl Into<TypeKey>,
        mapping: &Mapping,
        collection: bool,
    ) -> Result<ManyToOneProperty> {
        if name.is_empty() {
            return Err(Error::invalid_property(
                "many-to-one property name must not be empty",
            ));
        }

        Ok(ManyToOneProperty {
            name: name.to_string(),
            parent: mapping.ty,
            parent_table: mapping.table_name.clone(),
            parent_schema: mapping.schema_name.clone(),
            foreign: foreign.into(),
            collection,
            cascade: false,
            back_columns: vec![],
        })
    }

    pub fn cascade(mut self) -> Self {
        self.cascade = true;
        self
    }

    /// Resolves the back-reference column names from the owner's effective
    /// ID properties.
    pub(crate) fn setup(&mut self, own: &TypeNames) {
        self.back_columns = own
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

    /// Binds the owner's ID values for the back-reference columns.
    pub fn get_as_parameter(&self, entity: &dyn Entity) -> Vec<Parameter> {
        self.back_columns
            .iter()
            .map(|link| Parameter::new(link.column_name.clone(), entity.get(&link.property)))
            .collect()
    }
}
