use strata_core::{
    schema::{IdProperty, MapProperty, ReferenceProperty},
    stmt::{Parameter, Type, Value},
    Database, DynamicEntity, Mapping, MappingManager, MappingSource, TypeKey,
};
use strata_sql::{QueryKind, QueryProviderManager, SqlGenerator};

use pretty_assertions::assert_eq;
use std::sync::Arc;

/// Items(ID auto-increment, Name) with Invoices(Total) deriving from it.
fn invoice_source() -> Arc<MappingSource> {
    let mut item = Mapping::new("Item", "Items");
    let id = IdProperty::new("ID", Type::I64, &item)
        .unwrap()
        .auto_increment();
    item.add_id(id);
    item.add_reference(ReferenceProperty::new("Name", Type::Text, &item).unwrap());

    let mut invoice = Mapping::new("Invoice", "Invoices").extends("Item");
    invoice.add_reference(ReferenceProperty::new("Total", Type::F64, &invoice).unwrap());

    let manager = MappingManager::new(vec![item, invoice]).unwrap();
    Arc::new(MappingSource::new(manager, Database::new("default")))
}

fn invoice_generator() -> SqlGenerator {
    SqlGenerator::new(TypeKey("Invoice"), invoice_source())
}

#[test]
fn insert_walks_chain_bottom_up() {
    let generator = invoice_generator();
    let invoice = DynamicEntity::new("Invoice")
        .with("Name", "October")
        .with("Total", 12.5f64);

    let queries = generator.generate_queries(QueryKind::Insert, &invoice, None);

    assert_eq!(queries.len(), 1);
    assert_eq!(
        queries[0].text,
        "INSERT INTO [dbo].[Items]([Name]) VALUES (@Name); \
         SET @ItemsID_Temp=SCOPE_IDENTITY(); \
         INSERT INTO [dbo].[Invoices]([ItemsID],[Total]) VALUES (@ItemsID_Temp,@Total); \
         SELECT @ItemsID_Temp AS [ID];"
    );
    assert_eq!(
        queries[0].parameters,
        [
            Parameter::new("Total", Value::F64(12.5)),
            Parameter::new("Name", Value::String("October".into())),
        ]
    );
}

#[test]
fn insert_declarations_declare_temp_ids() {
    let generator = invoice_generator();
    let declarations = generator.generate_declarations(QueryKind::Insert);

    assert_eq!(declarations.len(), 1);
    assert_eq!(declarations[0].text, "DECLARE @ItemsID_Temp AS BIGINT;");
    assert_eq!(declarations[0].kind, QueryKind::Declarations);
}

#[test]
fn update_touches_every_chain_table() {
    let generator = invoice_generator();
    let invoice = DynamicEntity::new("Invoice")
        .with("ID", 4i64)
        .with("Name", "October")
        .with("Total", 12.5f64);

    let queries = generator.generate_queries(QueryKind::Update, &invoice, None);

    assert_eq!(queries.len(), 1);
    assert_eq!(
        queries[0].text,
        "UPDATE [dbo].[Invoices] SET [dbo].[Invoices].[Total] = @Total \
         WHERE [dbo].[Invoices].[ItemsID] = @ItemsID; \
         UPDATE [dbo].[Items] SET [dbo].[Items].[Name] = @Name \
         WHERE [dbo].[Items].[ID] = @ItemsID;"
    );
    assert_eq!(
        queries[0].parameters,
        [
            Parameter::new("Total", Value::F64(12.5)),
            Parameter::new("Name", Value::String("October".into())),
            Parameter::new("ItemsID", Value::I64(4)),
        ]
    );
}

#[test]
fn delete_removes_derived_rows_first() {
    let generator = invoice_generator();
    let invoice = DynamicEntity::new("Invoice").with("ID", 4i64);

    let queries = generator.generate_queries(QueryKind::Delete, &invoice, None);

    assert_eq!(queries.len(), 1);
    assert_eq!(
        queries[0].text,
        "DELETE FROM [dbo].[Invoices] WHERE [dbo].[Invoices].[ItemsID] = @ItemsID; \
         DELETE FROM [dbo].[Items] WHERE [dbo].[Items].[ID] = @ItemsID;"
    );
    assert_eq!(
        queries[0].parameters,
        [Parameter::new("ItemsID", Value::I64(4))]
    );
}

#[test]
fn select_joins_inheritance_chain() {
    let generator = invoice_generator();
    let invoice = DynamicEntity::new("Invoice").with("ID", 4i64);

    let queries = generator.generate_queries(QueryKind::Select, &invoice, None);

    assert_eq!(queries.len(), 1);
    assert_eq!(
        queries[0].text,
        "SELECT [dbo].[Invoices].[Total] AS [Total],\
         [dbo].[Items].[ID] AS [ID],\
         [dbo].[Items].[Name] AS [Name] \
         FROM [dbo].[Invoices] \
         INNER JOIN [dbo].[Items] ON [dbo].[Items].[ID] = [dbo].[Invoices].[ItemsID] \
         WHERE [dbo].[Invoices].[ItemsID] = @ItemsID;"
    );
}

#[test]
fn map_property_save_updates_foreign_key() {
    let mut customer = Mapping::new("Customer", "Customers");
    let id = IdProperty::new("ID", Type::I64, &customer)
        .unwrap()
        .auto_increment();
    customer.add_id(id);

    let mut order = Mapping::new("Order", "Orders");
    let id = IdProperty::new("ID", Type::I64, &order)
        .unwrap()
        .auto_increment();
    order.add_id(id);
    order.add_map(MapProperty::new("Customer", "Customer", &order).unwrap().cascade());

    let manager = MappingManager::new(vec![customer, order]).unwrap();
    let source = Arc::new(MappingSource::new(manager, Database::new("default")));
    let generator = SqlGenerator::new(TypeKey("Order"), source);

    let mut entity = DynamicEntity::new("Order").with("ID", 5i64);
    entity.add_related(
        "Customer",
        DynamicEntity::new("Customer").with("ID", 9i64).into_ref(),
    );

    let queries = generator.generate_queries(QueryKind::JoinsSave, &entity, Some("Customer"));

    assert_eq!(queries.len(), 1);
    assert_eq!(
        queries[0].text,
        "UPDATE [dbo].[Orders] SET [dbo].[Orders].[CustomersID] = @CustomersID \
         WHERE [dbo].[Orders].[ID] = @OrdersID;"
    );
    assert_eq!(
        queries[0].parameters,
        [
            Parameter::new("CustomersID", Value::I64(9)),
            Parameter::new("OrdersID", Value::I64(5)),
        ]
    );
}

#[test]
fn provider_shares_generator_per_type_and_source() {
    let source = invoice_source();
    let provider = QueryProviderManager::new();

    let first = provider.generator(TypeKey("Invoice"), &source).unwrap();
    let second = provider.generator(TypeKey("Invoice"), &source).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    assert!(provider.generator(TypeKey("Ghost"), &source).is_none());
}
