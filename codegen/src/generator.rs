use tracing::debug;

use froth_wsdl::types::{
    ComplexContent, ComplexType, Element, ElementContent, Occurs, PortAddress, QualifiedName,
    Service, SimpleContent, SimpleType, WebServiceDescription,
};
use indexmap::IndexMap;

use crate::{
    error::Error,
    mapping::{Ref, TypeMapping, XSD_NAMESPACE},
    types::{
        Cardinality, ClientInterface, Declaration, EnumType, InterfaceDescription, MethodPayload,
        Property, RecordType, ServiceMethod,
    },
};

/// Generates the Interface Description for a loaded web service
/// description, threading a fresh type mapping registry through the walk.
///
/// The output is a pure function of the input: all orderings derive from
/// source document order, so identical descriptions generate identical
/// models.
pub fn generate(
    description: &WebServiceDescription,
) -> Result<(InterfaceDescription, TypeMapping), Error> {
    generate_with(description, TypeMapping::new())
}

/// Like [`generate`], with a caller-supplied (empty) registry, e.g. one
/// carrying a custom naming policy.
pub fn generate_with(
    description: &WebServiceDescription,
    mapping: TypeMapping,
) -> Result<(InterfaceDescription, TypeMapping), Error> {
    let generator = Generator {
        description,
        mapping,
        declarations: Vec::new(),
    };

    generator.run()
}

struct Generator<'a> {
    description: &'a WebServiceDescription,
    mapping: TypeMapping,
    declarations: Vec<Declaration>,
}

fn cardinality(occurs: &Occurs) -> Cardinality {
    if occurs.is_sequence() {
        Cardinality::Sequence
    } else if occurs.is_optional() {
        Cardinality::Optional
    } else {
        Cardinality::Single
    }
}

impl<'a> Generator<'a> {
    fn run(mut self) -> Result<(InterfaceDescription, TypeMapping), Error> {
        let description = self.description;

        // Named declarations first, so service generation can resolve
        // message parts against an already-populated registry.
        for schema in &description.schemas {
            for simple in &schema.simple_types {
                let declaration = self.simple_declaration(simple)?;
                self.declarations.push(declaration);
            }

            for complex in &schema.complex_types {
                let declaration = self.complex_declaration(complex)?;
                self.declarations.push(declaration);
            }

            for element in &schema.elements {
                let declaration = self.element_declaration(element)?;
                self.declarations.push(declaration);
            }
        }

        let mut clients = Vec::new();
        for service in &description.services {
            clients.push(self.client(service)?);
        }

        Ok((
            InterfaceDescription {
                declarations: self.declarations,
                clients,
            },
            self.mapping,
        ))
    }

    /// Resolves a type reference to its generated identifier; the type
    /// must be an XSD built-in or declared in some merged schema.
    fn type_identifier(&mut self, name: &QualifiedName) -> Result<String, Error> {
        if name.namespace != XSD_NAMESPACE
            && self.description.complex_type(name).is_none()
            && self.description.simple_type(name).is_none()
        {
            return Err(Error::UnresolvedReference {
                name: name.clone(),
                collection: "schema types",
            });
        }

        self.mapping.identifier_for(&Ref::Type(name.clone()))
    }

    fn simple_declaration(&mut self, simple: &SimpleType) -> Result<Declaration, Error> {
        let name = simple.name.as_ref().ok_or_else(|| Error::UnsupportedConstruct {
            construct: String::from("anonymous top-level simpleType"),
        })?;

        let identifier = self.mapping.identifier_for(&Ref::Type(name.clone()))?;
        debug!(name = %name, identifier = %identifier, "generating simple type");

        match &simple.content {
            SimpleContent::Restriction { base, enumeration } if !enumeration.is_empty() => {
                let raw_type = self.type_identifier(base)?;
                let mut cases = IndexMap::new();

                for literal in enumeration {
                    let case = self.mapping.case_name(literal);
                    if cases.insert(case.clone(), literal.clone()).is_some() {
                        return Err(Error::DuplicateEnumCase {
                            enum_name: identifier,
                            case,
                        });
                    }
                }

                Ok(Declaration::Enum(EnumType {
                    name: identifier,
                    raw_type,
                    cases,
                }))
            }

            // A restriction without an enumeration narrows the value
            // space only; the generated type is an alias of its base.
            SimpleContent::Restriction { base, .. } => {
                let base = self.type_identifier(base)?;

                Ok(Declaration::Record(RecordType {
                    name: identifier,
                    base: Some(base),
                    properties: Vec::new(),
                    nested: Vec::new(),
                }))
            }

            SimpleContent::List { item } => Err(Error::UnsupportedConstruct {
                construct: format!("xsd:list of '{}' in '{}'", item, name),
            }),

            SimpleContent::ListWrapped => Err(Error::UnsupportedConstruct {
                construct: format!("xsd:list with inline item type in '{}'", name),
            }),
        }
    }

    fn complex_declaration(&mut self, complex: &ComplexType) -> Result<Declaration, Error> {
        let name = complex.name.as_ref().ok_or_else(|| Error::UnsupportedConstruct {
            construct: String::from("anonymous top-level complexType"),
        })?;

        let identifier = self.mapping.identifier_for(&Ref::Type(name.clone()))?;
        debug!(name = %name, identifier = %identifier, "generating complex type");

        Ok(Declaration::Record(self.record(identifier, complex)?))
    }

    /// Builds a record from a complex type's content, one property per
    /// sequence element in source order. Anonymous nested complex types
    /// are generated first (under a name synthesized from the owning
    /// element) so the property has an identifier to reference.
    fn record(&mut self, name: String, complex: &ComplexType) -> Result<RecordType, Error> {
        let mut record = RecordType {
            name,
            base: None,
            properties: Vec::new(),
            nested: Vec::new(),
        };

        let elements = match &complex.content {
            ComplexContent::Sequence(elements) => elements,
            // An empty type is still a valid, instantiable record.
            ComplexContent::Empty => return Ok(record),
        };

        for element in elements {
            let type_name = match &element.content {
                ElementContent::Base(base) => self.type_identifier(base)?,

                ElementContent::Complex(inner) => {
                    let nested_name = self.mapping.nested_type_name(&element.name.local_name);
                    let nested = self.record(nested_name.clone(), inner)?;
                    record.nested.push(Declaration::Record(nested));
                    nested_name
                }
            };

            record.properties.push(Property {
                name: self.mapping.property_name(&element.name.local_name),
                type_name,
                cardinality: cardinality(&element.occurs),
            });
        }

        Ok(record)
    }

    fn element_declaration(&mut self, element: &Element) -> Result<Declaration, Error> {
        let identifier = self
            .mapping
            .identifier_for(&Ref::Element(element.name.clone()))?;
        debug!(name = %element.name, identifier = %identifier, "generating element type");

        match &element.content {
            // A wrapper element over a named type still gets a distinct
            // generated type, subtyping the base's.
            ElementContent::Base(base) => {
                let base = self.type_identifier(base)?;

                Ok(Declaration::Record(RecordType {
                    name: identifier,
                    base: Some(base),
                    properties: Vec::new(),
                    nested: Vec::new(),
                }))
            }

            ElementContent::Complex(complex) => {
                Ok(Declaration::Record(self.record(identifier, complex)?))
            }
        }
    }

    fn payload(&mut self, message_name: &QualifiedName) -> Result<MethodPayload, Error> {
        let message =
            self.description
                .message(message_name)
                .ok_or_else(|| Error::UnresolvedReference {
                    name: message_name.clone(),
                    collection: "messages",
                })?;

        let part = message.parts.first().ok_or_else(|| Error::MessageWithoutParts {
            message: message.name.clone(),
        })?;

        match &part.target {
            froth_wsdl::types::PartTarget::Element(name) => {
                if self.description.element(name).is_none() {
                    return Err(Error::UnresolvedReference {
                        name: name.clone(),
                        collection: "schema elements",
                    });
                }

                Ok(MethodPayload {
                    element: name.clone(),
                    type_name: self.mapping.identifier_for(&Ref::Element(name.clone()))?,
                })
            }

            // RPC style: the part anchors on a type instead.
            froth_wsdl::types::PartTarget::Type(name) => Ok(MethodPayload {
                element: name.clone(),
                type_name: self.type_identifier(name)?,
            }),
        }
    }

    /// The central cross-referencing join: port -> binding -> port type,
    /// then per operation the same-named binding operation for the SOAP
    /// action, then message -> first part -> generated type.
    fn client(&mut self, service: &Service) -> Result<ClientInterface, Error> {
        // Deterministic port selection: the SOAP 1.1 address variant.
        // SOAP 1.2 and plain HTTP ports coexisting in the service are
        // ignored, not conflated.
        let (port, endpoint) = service
            .ports
            .iter()
            .find_map(|port| match &port.address {
                PortAddress::Soap11(location) => Some((port, location.clone())),
                _ => None,
            })
            .ok_or_else(|| Error::NoSoap11Port {
                service: service.name.clone(),
            })?;

        let binding =
            self.description
                .binding(&port.binding)
                .ok_or_else(|| Error::UnresolvedReference {
                    name: port.binding.clone(),
                    collection: "bindings",
                })?;

        let port_type = self
            .description
            .port_type(&binding.port_type)
            .ok_or_else(|| Error::UnresolvedReference {
                name: binding.port_type.clone(),
                collection: "port types",
            })?;

        debug!(service = %service.name, port = %port.name, "generating client interface");

        let mut methods = Vec::new();
        for operation in &port_type.operations {
            let bound = binding
                .operations
                .iter()
                .find(|candidate| candidate.name == operation.name.local_name)
                .ok_or_else(|| Error::MissingBindingOperation {
                    operation: operation.name.clone(),
                    binding: binding.name.clone(),
                })?;

            methods.push(ServiceMethod {
                operation: operation.name.local_name.clone(),
                input: self.payload(&operation.input_message)?,
                output: self.payload(&operation.output_message)?,
                action: bound.action.clone(),
                documentation: operation.documentation.clone(),
            });
        }

        Ok(ClientInterface {
            name: format!("{}Client", self.mapping.type_name(&service.name.local_name)),
            endpoint,
            methods,
        })
    }
}
