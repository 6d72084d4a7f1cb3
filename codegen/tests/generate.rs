use froth_codegen::error::Error;
use froth_codegen::types::{Cardinality, Declaration, EnumType, InterfaceDescription, Property, RecordType};
use froth_wsdl::types::QualifiedName;
use pretty_assertions::assert_eq;

fn build(name: &str) -> Result<InterfaceDescription, Error> {
    froth_codegen::from_url(format!(
        "{}/tests/inputs/{}",
        env!("CARGO_MANIFEST_DIR"),
        name
    ))
    .map(|(description, _)| description)
}

fn record<'a>(description: &'a InterfaceDescription, name: &str) -> &'a RecordType {
    match declaration(description, name) {
        Declaration::Record(record) => record,
        Declaration::Enum(..) => panic!("{} is an enum, expected a record", name),
    }
}

fn enumeration<'a>(description: &'a InterfaceDescription, name: &str) -> &'a EnumType {
    match declaration(description, name) {
        Declaration::Enum(enumeration) => enumeration,
        Declaration::Record(..) => panic!("{} is a record, expected an enum", name),
    }
}

fn declaration<'a>(description: &'a InterfaceDescription, name: &str) -> &'a Declaration {
    description
        .declarations
        .iter()
        .find(|declaration| declaration.name() == name)
        .unwrap_or_else(|| panic!("no declaration named {}", name))
}

fn property(name: &str, type_name: &str, cardinality: Cardinality) -> Property {
    Property {
        name: name.to_owned(),
        type_name: type_name.to_owned(),
        cardinality,
    }
}

#[test]
fn number_conversion_client() {
    let description = build("numberconversion.wsdl").unwrap();

    assert_eq!(description.clients.len(), 1);
    let client = &description.clients[0];

    assert_eq!(client.name, "NumberConversionClient");
    assert_eq!(
        client.endpoint,
        "https://www.dataaccess.com/webservicesserver/NumberConversion.wso"
    );

    assert_eq!(client.methods.len(), 2);

    let words = &client.methods[0];
    assert_eq!(words.operation, "NumberToWords");
    assert_eq!(words.action, "");
    assert_eq!(
        words.input.element,
        QualifiedName::new("http://tempuri.org/", "NumberToWords")
    );
    assert_eq!(words.input.type_name, "NumberToWords");
    assert_eq!(words.output.type_name, "NumberToWordsResponse");
    assert_eq!(
        words.documentation.as_deref(),
        Some("Returns the word corresponding to the positive number passed as parameter.")
    );

    assert_eq!(description.clients[0].methods[1].operation, "NumberToDollars");
}

#[test]
fn inventory_declarations_in_source_order() {
    let description = build("inventory.wsdl").unwrap();

    let names: Vec<_> = description
        .declarations
        .iter()
        .map(Declaration::name)
        .collect();

    assert_eq!(
        names,
        vec!["Status", "Sku", "Item", "ItemLookup", "ItemLookupResponse", "Ack"]
    );
}

#[test]
fn enumeration_cases_keep_literals_and_order() {
    let description = build("inventory.wsdl").unwrap();
    let status = enumeration(&description, "Status");

    assert_eq!(status.raw_type, "String");
    let cases: Vec<_> = status
        .cases
        .iter()
        .map(|(case, literal)| (case.as_str(), literal.as_str()))
        .collect();
    assert_eq!(
        cases,
        vec![
            ("Available", "available"),
            ("OutOfStock", "out-of-stock"),
            ("Discontinued", "discontinued"),
        ]
    );
}

#[test]
fn facet_only_restriction_becomes_an_alias() {
    let description = build("inventory.wsdl").unwrap();
    let sku = record(&description, "Sku");

    assert_eq!(sku.base.as_deref(), Some("String"));
    assert!(sku.properties.is_empty());
}

#[test]
fn record_properties_carry_cardinalities() {
    let description = build("inventory.wsdl").unwrap();
    let item = record(&description, "Item");

    assert_eq!(item.base, None);
    assert_eq!(
        item.properties,
        vec![
            property("name", "String", Cardinality::Single),
            property("quantity", "Int", Cardinality::Single),
            property("status", "Status", Cardinality::Single),
            property("tags", "String", Cardinality::Sequence),
            property("note", "String", Cardinality::Optional),
        ]
    );
}

#[test]
fn anonymous_nested_type_is_scoped_inside_its_owner() {
    let description = build("inventory.wsdl").unwrap();
    let lookup = record(&description, "ItemLookup");

    assert_eq!(
        lookup.properties,
        vec![
            property("sku", "Sku", Cardinality::Single),
            property("details", "DetailsContents", Cardinality::Optional),
        ]
    );

    assert_eq!(lookup.nested.len(), 1);
    match &lookup.nested[0] {
        Declaration::Record(details) => {
            assert_eq!(details.name, "DetailsContents");
            assert_eq!(
                details.properties,
                vec![property("verbose", "Boolean", Cardinality::Single)]
            );
        }
        Declaration::Enum(..) => panic!("nested declaration should be a record"),
    }

    // Scoped, not hoisted.
    assert!(description
        .declarations
        .iter()
        .all(|declaration| declaration.name() != "DetailsContents"));
}

#[test]
fn wrapper_element_over_a_builtin_subtypes_it() {
    let description = build("inventory.wsdl").unwrap();
    let ack = record(&description, "Ack");

    assert_eq!(ack.base.as_deref(), Some("String"));
    assert!(ack.properties.is_empty());
}

#[test]
fn inventory_client_joins_binding_and_port_type() {
    let description = build("inventory.wsdl").unwrap();

    let client = &description.clients[0];
    assert_eq!(client.name, "InventoryClient");
    assert_eq!(client.endpoint, "http://example.com/inventory");

    let method = &client.methods[0];
    assert_eq!(method.operation, "ItemLookup");
    assert_eq!(method.action, "urn:inventory#lookup");
    assert_eq!(method.input.type_name, "ItemLookup");
    assert_eq!(method.output.type_name, "ItemLookupResponse");
}

#[test]
fn generation_is_deterministic() {
    let first = build("inventory.wsdl").unwrap();
    let second = build("inventory.wsdl").unwrap();

    assert_eq!(first, second);
}

#[test]
fn rpc_style_payload_anchors_on_a_type() {
    let description = build("rpc_message_with_type.wsdl").unwrap();

    let client = &description.clients[0];
    assert_eq!(client.name, "TestClient");
    assert_eq!(client.endpoint, "http://localhost:8080/test");

    let method = &client.methods[0];
    assert_eq!(
        method.input.element,
        QualifiedName::new("http://www.w3.org/2001/XMLSchema", "string")
    );
    assert_eq!(method.input.type_name, "String");
    assert_eq!(method.action, "urn:test#echo");
    assert!(method.documentation.is_some());
}

#[test]
fn soap11_port_is_selected_among_mixed_protocols() {
    let description = build("soap_mixed_with_http_endpoints.wsdl").unwrap();

    let client = &description.clients[0];
    assert_eq!(client.endpoint, "http://example.com/soap11/example.asmx");
    assert_eq!(client.methods.len(), 1);
}

#[test]
fn service_without_a_soap11_port_is_an_error() {
    match build("soap12_only.wsdl") {
        Err(Error::NoSoap11Port { service }) => {
            assert_eq!(service, QualifiedName::new("http://tempuri.org/", "Modern"))
        }
        other => panic!("expected a missing-port error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn operation_without_a_matching_binding_operation_is_an_error() {
    match build("unbound_operation.wsdl") {
        Err(Error::MissingBindingOperation { operation, binding }) => {
            assert_eq!(operation, QualifiedName::new("http://tempuri.org/", "Ping"));
            assert_eq!(binding, QualifiedName::new("http://tempuri.org/", "Loose"));
        }
        other => panic!("expected a missing-binding-operation error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn port_referencing_an_undefined_binding_is_an_error() {
    match build("dangling_binding.wsdl") {
        Err(Error::UnresolvedReference { name, collection }) => {
            assert_eq!(name, QualifiedName::new("http://tempuri.org/", "Nope"));
            assert_eq!(collection, "bindings");
        }
        other => panic!("expected an unresolved-reference error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn list_types_are_rejected_at_generation() {
    match build("list_type.xsd") {
        Err(Error::UnsupportedConstruct { construct }) => {
            assert!(construct.contains("list"), "unexpected construct: {}", construct)
        }
        other => panic!("expected an unsupported-construct error, got {:?}", other.map(|_| ())),
    }
}
