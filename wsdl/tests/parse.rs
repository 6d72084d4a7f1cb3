use froth_wsdl::error::Error;
use froth_wsdl::types::{PartTarget, PortAddress, QualifiedName, Schema, WebServiceDescription};
use pretty_assertions::assert_eq;

fn load(name: &str) -> Result<WebServiceDescription, Error> {
    froth_wsdl::parse(format!("{}/tests/inputs/{}", env!("CARGO_MANIFEST_DIR"), name))
}

fn qname(local: &str) -> QualifiedName {
    QualifiedName::new("http://tempuri.org/", local)
}

fn schema<'a>(description: &'a WebServiceDescription, namespace: &str) -> &'a Schema {
    description
        .schemas
        .iter()
        .find(|schema| schema.target_namespace == namespace)
        .unwrap_or_else(|| panic!("no schema for namespace {}", namespace))
}

#[test]
fn number_conversion() {
    let description = load("numberconversion.wsdl").unwrap();

    assert_eq!(description.bindings.len(), 2);
    assert_eq!(description.bindings[0].name, qname("NumberConversionSoapBinding"));
    assert_eq!(description.bindings[0].operations.len(), 2);

    assert_eq!(description.messages.len(), 4);
    assert_eq!(description.messages[0].name, qname("NumberToWordsSoapRequest"));
    assert_eq!(
        description.messages.iter().map(|m| m.parts.len()).sum::<usize>(),
        4
    );

    assert_eq!(description.port_types.len(), 1);
    assert_eq!(description.port_types[0].name, qname("NumberConversionSoapType"));
    assert_eq!(description.port_types[0].operations.len(), 2);

    assert_eq!(description.schemas.len(), 1);
    let schema = schema(&description, "http://tempuri.org/");
    assert_eq!(schema.entry_count(), 4);
    assert_eq!(schema.elements[0].name, qname("NumberToWords"));

    assert_eq!(description.services.len(), 1);
    assert_eq!(description.services[0].name, qname("NumberConversion"));
    assert_eq!(description.services[0].ports.len(), 2);
}

#[test]
fn qualified_name_lookups_resolve_across_collections() {
    let description = load("numberconversion.wsdl").unwrap();

    assert!(description.binding(&qname("NumberConversionSoapBinding12")).is_some());
    assert!(description.port_type(&qname("NumberConversionSoapType")).is_some());
    assert!(description.message(&qname("NumberToDollarsSoapResponse")).is_some());
    assert!(description.element(&qname("NumberToDollars")).is_some());

    assert!(description.binding(&qname("NoSuchBinding")).is_none());
}

#[test]
fn transitive_import_merges_one_schema_per_namespace() {
    let description = load("import.wsdl").unwrap();

    assert_eq!(description.schemas.len(), 3);

    for namespace in [
        "http://tempuri.org/",
        "http://tempuri.org/second",
        "http://tempuri.org/third",
    ] {
        assert_eq!(schema(&description, namespace).elements.len(), 1);
    }
}

#[test]
fn cyclic_import_terminates_and_loads_each_document_once() {
    let description = load("cycle.wsdl").unwrap();

    assert_eq!(description.schemas.len(), 3);
    assert_eq!(schema(&description, "http://tempuri.org/a").elements.len(), 1);
    assert_eq!(schema(&description, "http://tempuri.org/b").elements.len(), 1);
}

#[test]
fn broken_import_is_reported_as_not_found() {
    match load("broken_import.wsdl") {
        Err(Error::NotFound { url }) => assert!(url.path().ends_with("missing.xsd")),
        other => panic!("expected a not-found error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn zero_byte_import_is_not_misreported_as_not_found() {
    match load("empty_import.wsdl") {
        Err(Error::EmptyDocument { url }) => assert!(url.path().ends_with("empty.xsd")),
        other => panic!("expected an empty-document error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn rpc_style_part_references_a_type() {
    let description = load("rpc_message_with_type.wsdl").unwrap();

    let part = &description.messages[0].parts[0];
    match &part.target {
        PartTarget::Type(name) => {
            assert_eq!(name, &QualifiedName::new("http://www.w3.org/2001/XMLSchema", "string"))
        }
        PartTarget::Element(name) => panic!("expected a type reference, got element {}", name),
    }

    assert_eq!(
        description.port_types[0].operations[0].documentation.as_deref(),
        Some(
            &[
                "",
                "        This is the description of the Test operation.",
                "        Parameters:",
                "        * echo the string to echo",
                "      ",
            ]
            .join("\n")[..]
        )
    );
}

#[test]
fn binding_may_live_in_another_namespace_than_its_port_type() {
    let description = load("binding_other_namespace.wsdl").unwrap();

    assert_eq!(description.bindings.len(), 1);
    let binding = &description.bindings[0];
    assert_eq!(binding.name, QualifiedName::new("http://tempuri.org/other", "Test"));
    assert_eq!(binding.port_type, qname("Test"));

    let port = &description.services[0].ports[0];
    assert_eq!(port.binding, binding.name);
    assert!(description.binding(&port.binding).is_some());
}

#[test]
fn mixed_protocol_service_parses_every_port() {
    let description = load("soap_mixed_with_http_endpoints.wsdl").unwrap();

    assert_eq!(description.bindings.len(), 3);
    assert_eq!(description.services.len(), 1);

    let addresses: Vec<_> = description.services[0]
        .ports
        .iter()
        .map(|port| &port.address)
        .collect();

    assert_eq!(
        addresses,
        vec![
            &PortAddress::Http("http://example.com/example.asmx".to_owned()),
            &PortAddress::Soap12("http://example.com/example.asmx".to_owned()),
            &PortAddress::Soap11("http://example.com/soap11/example.asmx".to_owned()),
        ]
    );
}

#[test]
fn element_with_both_type_attribute_and_inline_definition_is_rejected() {
    match load("element_with_type_and_inline.xsd") {
        Err(Error::UnsupportedConstruct { construct, .. }) => {
            assert!(construct.contains("inline complexType"), "unexpected construct: {}", construct)
        }
        other => panic!("expected an unsupported-construct error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn duplicate_definitions_are_an_error() {
    match load("duplicate_message.wsdl") {
        Err(Error::DuplicateDefinition { name, collection }) => {
            assert_eq!(name, qname("Dup"));
            assert_eq!(collection, "messages");
        }
        other => panic!("expected a duplicate-definition error, got {:?}", other.map(|_| ())),
    }
}
