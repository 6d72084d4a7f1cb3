use std::collections::HashSet;
use std::io::BufRead;

use quick_xml::{
    events::{attributes::Attributes, BytesStart, BytesText, Event},
    Reader,
};
use tracing::{debug, trace};
use url::Url;

use super::{
    error::Error,
    types::{
        merge_schemas, Binding, BindingOperation, ComplexContent, ComplexType, Element,
        ElementContent, MaxOccurs, Message, MessagePart, Occurs, Operation, PartTarget, Port,
        PortAddress, PortType, QualifiedName, Schema, Service, SimpleContent, SimpleType,
        WebServiceDescription,
    },
};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
const SOAP11_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap/";
const SOAP12_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap12/";
const HTTP_NS: &str = "http://schemas.xmlsoap.org/wsdl/http/";

fn get_attributes<B: BufRead, const N: usize>(
    reader: &Reader<B>,
    attributes: Attributes<'_>,
    names: [&'static str; N],
) -> Result<[Option<String>; N], quick_xml::Error> {
    const INIT: Option<String> = None;
    let mut result = [INIT; N];

    for attribute in attributes {
        let attribute = attribute?;
        let key = reader.decode(attribute.key)?;

        for (index, name) in names.iter().enumerate() {
            if key == *name {
                result[index] = Some(reader.decode(attribute.value.as_ref())?.to_owned());
                break;
            }
        }
    }

    Ok(result)
}

fn split_prefixed_name(prefixed_name: &str) -> (Option<&str>, &str) {
    match prefixed_name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, prefixed_name),
    }
}

/// Per-document parsing context: the document's own URL (imports resolve
/// relative to it, not to the root), the in-scope namespace declarations
/// as a stack of per-element frames, and the target-namespace stack
/// (a schema nested in definitions may declare its own).
struct DocumentContext {
    url: Url,
    targets: Vec<String>,
    scopes: Vec<Vec<(Option<String>, String)>>,
}

impl DocumentContext {
    fn new(url: Url) -> Self {
        Self {
            url,
            targets: Vec::new(),
            scopes: vec![vec![(Some("xml".to_owned()), XML_NS.to_owned())]],
        }
    }

    fn push_scope(&mut self, frame: Vec<(Option<String>, String)>) {
        self.scopes.push(frame);
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        self.scopes.iter().rev().find_map(|frame| {
            frame
                .iter()
                .rev()
                .find(|(candidate, _)| candidate.as_deref() == prefix)
                .map(|(_, namespace)| namespace.as_str())
        })
    }

    fn target(&self) -> Option<&str> {
        self.targets.last().map(String::as_str)
    }

    /// Resolves a possibly-prefixed attribute value to a qualified name.
    /// Unprefixed names fall back to the default namespace, then to the
    /// target namespace; an unknown prefix is a hard error.
    fn resolve(&self, prefixed_name: &str, position: usize) -> Result<QualifiedName, Error> {
        let (prefix, local_name) = split_prefixed_name(prefixed_name);

        let namespace = match prefix {
            Some(prefix) => self.lookup(Some(prefix)).ok_or_else(|| Error::UnresolvedPrefix {
                prefix: prefix.to_owned(),
                url: self.url.clone(),
                position,
            })?,

            None => match self.lookup(None).or_else(|| self.target()) {
                Some(namespace) => namespace,
                None => {
                    return Err(Error::UnresolvedPrefix {
                        prefix: String::from("(default)"),
                        url: self.url.clone(),
                        position,
                    })
                }
            },
        };

        Ok(QualifiedName::new(namespace, local_name))
    }

    /// Qualifies a declaration's own name with the current target namespace.
    fn target_named(&self, local_name: String, position: usize) -> Result<QualifiedName, Error> {
        match self.target() {
            Some(target) => Ok(QualifiedName::new(target, local_name)),
            None => Err(Error::UnresolvedPrefix {
                prefix: String::from("(target namespace)"),
                url: self.url.clone(),
                position,
            }),
        }
    }
}

#[derive(Debug)]
enum ParseState {
    Definitions,
    Types,
    Schema(Schema),

    Element {
        name: String,
        content: Option<ElementContent>,
    },
    ComplexType {
        name: Option<String>,
        content: Option<ComplexContent>,
    },
    Sequence(Vec<Element>),
    SequenceElement {
        name: String,
        content: Option<ElementContent>,
        occurs: Occurs,
    },
    SimpleType {
        name: String,
        content: Option<SimpleContent>,
    },
    Restriction {
        base: QualifiedName,
        enumeration: Vec<String>,
    },
    List {
        item: Option<QualifiedName>,
        wrapped: bool,
    },

    Message {
        name: String,
        parts: Vec<MessagePart>,
    },

    PortType {
        name: String,
        operations: Vec<Operation>,
    },
    Operation {
        name: String,
        documentation: Option<String>,
        input: Option<QualifiedName>,
        output: Option<QualifiedName>,
    },
    Documentation(Option<String>),

    Binding {
        name: String,
        port_type: QualifiedName,
        operations: Vec<BindingOperation>,
    },
    BindingOperation {
        name: String,
        action: Option<String>,
    },

    Service {
        name: String,
        ports: Vec<Port>,
    },
    Port {
        name: String,
        binding: QualifiedName,
        address: Option<PortAddress>,
    },

    Import,
    Other(String),
}

#[derive(Default)]
struct Parser {
    visited: HashSet<Url>,

    bindings: Vec<Binding>,
    messages: Vec<Message>,
    port_types: Vec<PortType>,
    services: Vec<Service>,
    schemas: Vec<Schema>,
}

fn parse_occurs(
    min: Option<String>,
    max: Option<String>,
    url: &Url,
    position: usize,
) -> Result<Occurs, Error> {
    let mut occurs = Occurs::default();

    if let Some(min) = min {
        occurs.min = min.parse().map_err(|_| Error::InvalidAttribute {
            element: "element".to_owned(),
            attribute: "minOccurs",
            value: min.clone(),
            url: url.clone(),
            position,
        })?;
    }

    if let Some(max) = max {
        occurs.max = if max == "unbounded" {
            MaxOccurs::Unbounded
        } else {
            MaxOccurs::Bounded(max.parse().map_err(|_| Error::InvalidAttribute {
                element: "element".to_owned(),
                attribute: "maxOccurs",
                value: max.clone(),
                url: url.clone(),
                position,
            })?)
        };
    }

    Ok(occurs)
}

impl Parser {
    fn parse_url(&mut self, url: Url) -> Result<(), Error> {
        // Dedup by absolute URL so cyclic imports terminate: each document
        // loads at most once.
        if !self.visited.insert(url.clone()) {
            trace!(%url, "already loaded, skipping");
            return Ok(());
        }

        let bytes = super::loader::fetch(&url)?;
        debug!(%url, len = bytes.len(), "parsing document");

        let mut context = DocumentContext::new(url);
        self.parse_xml(&mut context, Reader::from_reader(bytes.as_slice()))
    }

    fn parse_xml<B: BufRead>(
        &mut self,
        context: &mut DocumentContext,
        mut reader: Reader<B>,
    ) -> Result<(), Error> {
        let mut stack = Vec::new();
        let mut buffer = Vec::new();
        let mut namespace_buffer = Vec::new();

        loop {
            let position = reader.buffer_position();
            let (namespace, event) = reader
                .read_namespaced_event(&mut buffer, &mut namespace_buffer)
                .map_err(|source| Error::Xml {
                    url: context.url.clone(),
                    position,
                    source,
                })?;

            match event {
                Event::Decl(..) | Event::Comment(..) | Event::CData(..) | Event::PI(..)
                | Event::DocType(..) => (),

                Event::Start(start) => {
                    self.handle_start(context, &mut stack, &reader, start, namespace)?
                }
                Event::End(..) => self.handle_end(context, &mut stack, &reader)?,

                Event::Empty(start) => {
                    self.handle_start(context, &mut stack, &reader, start, namespace)?;
                    self.handle_end(context, &mut stack, &reader)?;
                }

                Event::Text(text) => self.handle_text(context, &mut stack, &reader, text)?,

                Event::Eof => break,
            }
        }

        Ok(())
    }

    fn attr_error(
        &self,
        context: &DocumentContext,
        element: &str,
        attribute: &'static str,
        position: usize,
    ) -> Error {
        Error::MissingAttribute {
            element: element.to_owned(),
            attribute,
            url: context.url.clone(),
            position,
        }
    }

    fn unsupported(&self, context: &DocumentContext, construct: String, position: usize) -> Error {
        Error::UnsupportedConstruct {
            construct,
            url: context.url.clone(),
            position,
        }
    }

    fn schema_start<B: BufRead>(
        &mut self,
        context: &mut DocumentContext,
        reader: &Reader<B>,
        start: &BytesStart<'_>,
    ) -> Result<ParseState, Error> {
        let position = reader.buffer_position();
        let [namespace] = self
            .decode(context, position, get_attributes(reader, start.attributes(), ["targetNamespace"]))?;

        let namespace =
            namespace.ok_or_else(|| self.attr_error(context, "schema", "targetNamespace", position))?;

        context.targets.push(namespace.clone());
        Ok(ParseState::Schema(Schema::new(namespace)))
    }

    fn decode<T>(
        &self,
        context: &DocumentContext,
        position: usize,
        result: Result<T, quick_xml::Error>,
    ) -> Result<T, Error> {
        result.map_err(|source| Error::Xml {
            url: context.url.clone(),
            position,
            source,
        })
    }

    fn import(
        &mut self,
        context: &DocumentContext,
        location: Option<String>,
    ) -> Result<ParseState, Error> {
        // Location hints resolve relative to the importing document, not
        // the root; an import without a hint contributes nothing to load.
        if let Some(location) = location {
            let target = context.url.join(&location)?;
            self.parse_url(target)?;
            trace!(url = %context.url, "resumed");
        }

        Ok(ParseState::Import)
    }

    fn handle_start<B: BufRead>(
        &mut self,
        context: &mut DocumentContext,
        stack: &mut Vec<ParseState>,
        reader: &Reader<B>,
        start: BytesStart<'_>,
        namespace_bytes: Option<&[u8]>,
    ) -> Result<(), Error> {
        let position = reader.buffer_position();
        let name = self.decode(context, position, reader.decode(start.name()).map_err(Into::into))?;
        let (_, local_name) = split_prefixed_name(name);
        let local_name = local_name.to_owned();
        let element_namespace = namespace_bytes.and_then(|ns| std::str::from_utf8(ns).ok());

        // Namespace declarations on this element come into scope before
        // any of its attribute values are resolved.
        let mut frame = Vec::new();
        for attribute in start.attributes() {
            let attribute = self.decode(context, position, attribute.map_err(Into::into))?;
            let key = self.decode(context, position, reader.decode(attribute.key).map_err(Into::into))?;
            let value = self
                .decode(context, position, reader.decode(attribute.value.as_ref()).map_err(Into::into))?
                .to_owned();

            match split_prefixed_name(key) {
                (Some("xmlns"), prefix) => frame.push((Some(prefix.to_owned()), value)),
                (None, "xmlns") => frame.push((None, value)),
                _ => (),
            }
        }
        context.push_scope(frame);

        let mut state = stack.pop();
        let mut new_state = ParseState::Other(local_name.clone());

        match state {
            None => match local_name.as_str() {
                "definitions" => {
                    let [namespace] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["targetNamespace"]),
                    )?;

                    let namespace = namespace.ok_or_else(|| {
                        self.attr_error(context, "definitions", "targetNamespace", position)
                    })?;

                    context.targets.push(namespace);
                    new_state = ParseState::Definitions;
                }

                // A bare XSD document is a valid root too.
                "schema" => new_state = self.schema_start(context, reader, &start)?,

                other => {
                    return Err(self.unsupported(
                        context,
                        format!("document root '{}'", other),
                        position,
                    ))
                }
            },

            Some(ParseState::Definitions) => match local_name.as_str() {
                "import" => {
                    let [location, _namespace] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["location", "namespace"]),
                    )?;

                    new_state = self.import(context, location)?;
                }

                "types" => new_state = ParseState::Types,

                "message" => {
                    let [name] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["name"]),
                    )?;

                    let name =
                        name.ok_or_else(|| self.attr_error(context, "message", "name", position))?;

                    new_state = ParseState::Message {
                        name,
                        parts: Vec::new(),
                    };
                }

                "portType" => {
                    let [name] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["name"]),
                    )?;

                    let name =
                        name.ok_or_else(|| self.attr_error(context, "portType", "name", position))?;

                    new_state = ParseState::PortType {
                        name,
                        operations: Vec::new(),
                    };
                }

                "binding" => {
                    let [name, ty] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["name", "type"]),
                    )?;

                    let name =
                        name.ok_or_else(|| self.attr_error(context, "binding", "name", position))?;
                    let ty =
                        ty.ok_or_else(|| self.attr_error(context, "binding", "type", position))?;

                    new_state = ParseState::Binding {
                        name,
                        port_type: context.resolve(&ty, position)?,
                        operations: Vec::new(),
                    };
                }

                "service" => {
                    let [name] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["name"]),
                    )?;

                    let name =
                        name.ok_or_else(|| self.attr_error(context, "service", "name", position))?;

                    new_state = ParseState::Service {
                        name,
                        ports: Vec::new(),
                    };
                }

                other => trace!(element = other, "skipping inside definitions"),
            },

            Some(ParseState::Types) => match local_name.as_str() {
                "schema" => new_state = self.schema_start(context, reader, &start)?,
                other => trace!(element = other, "skipping inside types"),
            },

            Some(ParseState::Schema(..)) => match local_name.as_str() {
                "element" => {
                    let [name, ty, substitution] = self.decode(
                        context,
                        position,
                        get_attributes(
                            reader,
                            start.attributes(),
                            ["name", "type", "substitutionGroup"],
                        ),
                    )?;

                    if substitution.is_some() {
                        return Err(self.unsupported(
                            context,
                            String::from("substitution group"),
                            position,
                        ));
                    }

                    let name =
                        name.ok_or_else(|| self.attr_error(context, "element", "name", position))?;

                    let content = match ty {
                        Some(ty) => Some(ElementContent::Base(context.resolve(&ty, position)?)),
                        None => None,
                    };

                    new_state = ParseState::Element { name, content };
                }

                "complexType" => {
                    let [name, mixed] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["name", "mixed"]),
                    )?;

                    if mixed.as_deref() == Some("true") {
                        return Err(self.unsupported(context, String::from("mixed content"), position));
                    }

                    let name = name
                        .ok_or_else(|| self.attr_error(context, "complexType", "name", position))?;

                    new_state = ParseState::ComplexType {
                        name: Some(name),
                        content: None,
                    };
                }

                "simpleType" => {
                    let [name] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["name"]),
                    )?;

                    let name = name
                        .ok_or_else(|| self.attr_error(context, "simpleType", "name", position))?;

                    new_state = ParseState::SimpleType {
                        name,
                        content: None,
                    };
                }

                "include" | "import" => {
                    let [location, _namespace] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["schemaLocation", "namespace"]),
                    )?;

                    new_state = self.import(context, location)?;
                }

                "annotation" => (),

                other => {
                    return Err(self.unsupported(
                        context,
                        format!("'{}' inside schema", other),
                        position,
                    ))
                }
            },

            Some(ParseState::Element { .. }) => match local_name.as_str() {
                "complexType" => {
                    let [mixed] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["mixed"]),
                    )?;

                    if mixed.as_deref() == Some("true") {
                        return Err(self.unsupported(context, String::from("mixed content"), position));
                    }

                    new_state = ParseState::ComplexType {
                        name: None,
                        content: None,
                    };
                }

                "simpleType" => {
                    return Err(self.unsupported(
                        context,
                        String::from("inline simpleType inside element"),
                        position,
                    ))
                }

                "annotation" => (),

                other => trace!(element = other, "skipping inside element"),
            },

            Some(ParseState::ComplexType { .. }) => match local_name.as_str() {
                "sequence" => new_state = ParseState::Sequence(Vec::new()),
                "annotation" => (),

                other => {
                    return Err(self.unsupported(
                        context,
                        format!("'{}' inside complexType", other),
                        position,
                    ))
                }
            },

            Some(ParseState::Sequence(..)) => match local_name.as_str() {
                "element" => {
                    let [name, ty, reference, min, max] = self.decode(
                        context,
                        position,
                        get_attributes(
                            reader,
                            start.attributes(),
                            ["name", "type", "ref", "minOccurs", "maxOccurs"],
                        ),
                    )?;

                    if reference.is_some() {
                        return Err(self.unsupported(
                            context,
                            String::from("element reference"),
                            position,
                        ));
                    }

                    let name =
                        name.ok_or_else(|| self.attr_error(context, "element", "name", position))?;

                    let content = match ty {
                        Some(ty) => Some(ElementContent::Base(context.resolve(&ty, position)?)),
                        None => None,
                    };

                    new_state = ParseState::SequenceElement {
                        name,
                        content,
                        occurs: parse_occurs(min, max, &context.url, position)?,
                    };
                }

                "annotation" => (),

                other => {
                    return Err(self.unsupported(
                        context,
                        format!("'{}' inside sequence", other),
                        position,
                    ))
                }
            },

            Some(ParseState::SequenceElement { .. }) => match local_name.as_str() {
                "complexType" => {
                    new_state = ParseState::ComplexType {
                        name: None,
                        content: None,
                    }
                }

                "simpleType" => {
                    return Err(self.unsupported(
                        context,
                        String::from("inline simpleType inside element"),
                        position,
                    ))
                }

                "annotation" => (),

                other => trace!(element = other, "skipping inside sequence element"),
            },

            Some(ParseState::SimpleType { .. }) => match local_name.as_str() {
                "restriction" => {
                    let [base] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["base"]),
                    )?;

                    let base = base
                        .ok_or_else(|| self.attr_error(context, "restriction", "base", position))?;

                    new_state = ParseState::Restriction {
                        base: context.resolve(&base, position)?,
                        enumeration: Vec::new(),
                    };
                }

                "list" => {
                    let [item] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["itemType"]),
                    )?;

                    let item = match item {
                        Some(item) => Some(context.resolve(&item, position)?),
                        None => None,
                    };

                    new_state = ParseState::List {
                        item,
                        wrapped: false,
                    };
                }

                "union" => {
                    return Err(self.unsupported(context, String::from("simpleType union"), position))
                }

                "annotation" => (),

                other => trace!(element = other, "skipping inside simpleType"),
            },

            Some(ParseState::Restriction {
                ref mut enumeration,
                ..
            }) => match local_name.as_str() {
                "enumeration" => {
                    let [value] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["value"]),
                    )?;

                    let value = value
                        .ok_or_else(|| self.attr_error(context, "enumeration", "value", position))?;

                    enumeration.push(value);
                }

                // Other facets (pattern, length bounds) restrict the value
                // space without changing the modeled shape.
                other => trace!(facet = other, "ignoring restriction facet"),
            },

            Some(ParseState::List { ref mut wrapped, .. }) => match local_name.as_str() {
                "simpleType" => *wrapped = true,
                other => trace!(element = other, "skipping inside list"),
            },

            Some(ParseState::Message { ref mut parts, .. }) => match local_name.as_str() {
                "part" => {
                    let [name, element, ty] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["name", "element", "type"]),
                    )?;

                    let name =
                        name.ok_or_else(|| self.attr_error(context, "part", "name", position))?;

                    // Document style references an element, RPC style a
                    // type; exactly one of the two.
                    let target = match (element, ty) {
                        (Some(element), None) => {
                            PartTarget::Element(context.resolve(&element, position)?)
                        }
                        (None, Some(ty)) => PartTarget::Type(context.resolve(&ty, position)?),
                        _ => {
                            return Err(Error::InvalidPart {
                                part: name,
                                url: context.url.clone(),
                            })
                        }
                    };

                    parts.push(MessagePart { name, target });
                }

                other => trace!(element = other, "skipping inside message"),
            },

            Some(ParseState::PortType { .. }) => match local_name.as_str() {
                "operation" => {
                    let [name] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["name"]),
                    )?;

                    let name =
                        name.ok_or_else(|| self.attr_error(context, "operation", "name", position))?;

                    new_state = ParseState::Operation {
                        name,
                        documentation: None,
                        input: None,
                        output: None,
                    };
                }

                other => trace!(element = other, "skipping inside portType"),
            },

            Some(ParseState::Operation {
                ref mut input,
                ref mut output,
                ..
            }) => match local_name.as_str() {
                "documentation" => new_state = ParseState::Documentation(None),

                "input" | "output" => {
                    let [message] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["message"]),
                    )?;

                    let message = message
                        .ok_or_else(|| self.attr_error(context, &local_name, "message", position))?;
                    let message = context.resolve(&message, position)?;

                    if local_name == "input" {
                        input.get_or_insert(message);
                    } else {
                        output.get_or_insert(message);
                    }
                }

                other => trace!(element = other, "skipping inside operation"),
            },

            Some(ParseState::Documentation(..)) => {
                trace!(element = %local_name, "skipping markup inside documentation")
            }

            Some(ParseState::Binding { .. }) => match local_name.as_str() {
                // The inner soap:binding carries transport and style; the
                // model keys on the address variant instead.
                "binding" => trace!("skipping transport declaration"),

                "operation" => {
                    let [name] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["name"]),
                    )?;

                    let name =
                        name.ok_or_else(|| self.attr_error(context, "operation", "name", position))?;

                    new_state = ParseState::BindingOperation { name, action: None };
                }

                other => trace!(element = other, "skipping inside binding"),
            },

            Some(ParseState::BindingOperation { ref mut action, .. }) => match local_name.as_str() {
                // soap:operation or soap12:operation
                "operation" => {
                    let [soap_action] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["soapAction"]),
                    )?;

                    action.get_or_insert(soap_action.unwrap_or_default());
                }

                other => trace!(element = other, "skipping inside binding operation"),
            },

            Some(ParseState::Service { .. }) => match local_name.as_str() {
                "port" => {
                    let [name, binding] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["name", "binding"]),
                    )?;

                    let name =
                        name.ok_or_else(|| self.attr_error(context, "port", "name", position))?;
                    let binding = binding
                        .ok_or_else(|| self.attr_error(context, "port", "binding", position))?;

                    new_state = ParseState::Port {
                        name,
                        binding: context.resolve(&binding, position)?,
                        address: None,
                    };
                }

                other => trace!(element = other, "skipping inside service"),
            },

            Some(ParseState::Port { ref mut address, .. }) => match local_name.as_str() {
                "address" => {
                    let [location] = self.decode(
                        context,
                        position,
                        get_attributes(reader, start.attributes(), ["location"]),
                    )?;

                    let location = location
                        .ok_or_else(|| self.attr_error(context, "address", "location", position))?;

                    let parsed = match element_namespace {
                        Some(SOAP11_NS) => PortAddress::Soap11(location),
                        Some(SOAP12_NS) => PortAddress::Soap12(location),
                        Some(HTTP_NS) => PortAddress::Http(location),
                        other => {
                            return Err(self.unsupported(
                                context,
                                format!("address binding '{}'", other.unwrap_or("")),
                                position,
                            ))
                        }
                    };

                    address.get_or_insert(parsed);
                }

                other => trace!(element = other, "skipping inside port"),
            },

            Some(ParseState::Import) => trace!(element = %local_name, "skipping inside import"),

            Some(ParseState::Other(ref parent)) => {
                trace!(element = %local_name, parent = %parent, "skipping unknown element")
            }
        }

        stack.extend(state);
        stack.push(new_state);

        Ok(())
    }

    fn handle_end<B: BufRead>(
        &mut self,
        context: &mut DocumentContext,
        stack: &mut Vec<ParseState>,
        reader: &Reader<B>,
    ) -> Result<(), Error> {
        let position = reader.buffer_position();
        let finished = stack.pop();
        let mut next = stack.pop();

        match finished {
            Some(ParseState::Definitions) => {
                context.targets.pop();
            }

            Some(ParseState::Schema(schema)) => {
                context.targets.pop();
                self.schemas.push(schema);
            }

            Some(ParseState::Element { name, content }) => {
                let content = content.ok_or_else(|| Error::MissingChild {
                    element: "element",
                    child: "type attribute or complexType",
                    url: context.url.clone(),
                    position,
                })?;

                let name = context.target_named(name, position)?;

                match next {
                    Some(ParseState::Schema(ref mut schema)) => schema.elements.push(Element {
                        name,
                        content,
                        occurs: Occurs::default(),
                    }),

                    _ => {
                        return Err(self.unsupported(
                            context,
                            String::from("element outside schema"),
                            position,
                        ))
                    }
                }
            }

            Some(ParseState::ComplexType { name, content }) => {
                let content = content.unwrap_or(ComplexContent::Empty);

                match next {
                    // Anonymous type nested directly inside an element.
                    Some(
                        ParseState::Element {
                            content: ref mut element_content,
                            ..
                        }
                        | ParseState::SequenceElement {
                            content: ref mut element_content,
                            ..
                        },
                    ) => {
                        // A type attribute and an inline definition are
                        // mutually exclusive.
                        if element_content.is_some() {
                            return Err(self.unsupported(
                                context,
                                String::from(
                                    "element with both a 'type' attribute and an inline complexType",
                                ),
                                position,
                            ));
                        }

                        *element_content = Some(ElementContent::Complex(ComplexType {
                            name: None,
                            content,
                        }));
                    }

                    Some(ParseState::Schema(ref mut schema)) => {
                        let name = name.ok_or_else(|| {
                            self.attr_error(context, "complexType", "name", position)
                        })?;

                        schema.complex_types.push(ComplexType {
                            name: Some(context.target_named(name, position)?),
                            content,
                        });
                    }

                    _ => {
                        return Err(self.unsupported(
                            context,
                            String::from("complexType in unexpected position"),
                            position,
                        ))
                    }
                }
            }

            Some(ParseState::Sequence(elements)) => match next {
                Some(ParseState::ComplexType {
                    ref mut content, ..
                }) if content.is_none() => *content = Some(ComplexContent::Sequence(elements)),

                _ => {
                    return Err(self.unsupported(
                        context,
                        String::from("sequence in unexpected position"),
                        position,
                    ))
                }
            },

            Some(ParseState::SequenceElement {
                name,
                content,
                occurs,
            }) => {
                let content = content.ok_or_else(|| Error::MissingChild {
                    element: "element",
                    child: "type attribute or complexType",
                    url: context.url.clone(),
                    position,
                })?;

                match next {
                    Some(ParseState::Sequence(ref mut elements)) => elements.push(Element {
                        name: context.target_named(name, position)?,
                        content,
                        occurs,
                    }),

                    _ => {
                        return Err(self.unsupported(
                            context,
                            String::from("element in unexpected position"),
                            position,
                        ))
                    }
                }
            }

            Some(ParseState::SimpleType { name, content }) => {
                let content = content.ok_or_else(|| Error::MissingChild {
                    element: "simpleType",
                    child: "restriction or list",
                    url: context.url.clone(),
                    position,
                })?;

                match next {
                    Some(ParseState::Schema(ref mut schema)) => {
                        schema.simple_types.push(SimpleType {
                            name: Some(context.target_named(name, position)?),
                            content,
                        })
                    }

                    _ => {
                        return Err(self.unsupported(
                            context,
                            String::from("simpleType in unexpected position"),
                            position,
                        ))
                    }
                }
            }

            Some(ParseState::Restriction { base, enumeration }) => match next {
                Some(ParseState::SimpleType {
                    ref mut content, ..
                }) if content.is_none() => {
                    *content = Some(SimpleContent::Restriction { base, enumeration })
                }

                _ => {
                    return Err(self.unsupported(
                        context,
                        String::from("restriction in unexpected position"),
                        position,
                    ))
                }
            },

            Some(ParseState::List { item, wrapped }) => {
                let content = match (item, wrapped) {
                    (Some(item), false) => SimpleContent::List { item },
                    (_, true) => SimpleContent::ListWrapped,
                    (None, false) => {
                        return Err(self.attr_error(context, "list", "itemType", position))
                    }
                };

                match next {
                    Some(ParseState::SimpleType {
                        content: ref mut slot,
                        ..
                    }) if slot.is_none() => *slot = Some(content),

                    _ => {
                        return Err(self.unsupported(
                            context,
                            String::from("list in unexpected position"),
                            position,
                        ))
                    }
                }
            }

            Some(ParseState::Message { name, parts }) => self.messages.push(Message {
                name: context.target_named(name, position)?,
                parts,
            }),

            Some(ParseState::PortType { name, operations }) => self.port_types.push(PortType {
                name: context.target_named(name, position)?,
                operations,
            }),

            Some(ParseState::Operation {
                name,
                documentation,
                input,
                output,
            }) => {
                let input_message = input.ok_or_else(|| Error::MissingChild {
                    element: "operation",
                    child: "input",
                    url: context.url.clone(),
                    position,
                })?;
                let output_message = output.ok_or_else(|| Error::MissingChild {
                    element: "operation",
                    child: "output",
                    url: context.url.clone(),
                    position,
                })?;

                match next {
                    Some(ParseState::PortType {
                        ref mut operations, ..
                    }) => operations.push(Operation {
                        name: context.target_named(name, position)?,
                        input_message,
                        output_message,
                        documentation,
                    }),

                    _ => {
                        return Err(self.unsupported(
                            context,
                            String::from("operation in unexpected position"),
                            position,
                        ))
                    }
                }
            }

            Some(ParseState::Documentation(text)) => match next {
                Some(ParseState::Operation {
                    ref mut documentation,
                    ..
                }) => *documentation = text,

                _ => {
                    return Err(self.unsupported(
                        context,
                        String::from("documentation in unexpected position"),
                        position,
                    ))
                }
            },

            Some(ParseState::Binding {
                name,
                port_type,
                operations,
            }) => self.bindings.push(Binding {
                name: context.target_named(name, position)?,
                port_type,
                operations,
            }),

            Some(ParseState::BindingOperation { name, action }) => match next {
                Some(ParseState::Binding {
                    ref mut operations, ..
                }) => operations.push(BindingOperation {
                    name,
                    action: action.unwrap_or_default(),
                }),

                _ => {
                    return Err(self.unsupported(
                        context,
                        String::from("binding operation in unexpected position"),
                        position,
                    ))
                }
            },

            Some(ParseState::Service { name, ports }) => self.services.push(Service {
                name: context.target_named(name, position)?,
                ports,
            }),

            Some(ParseState::Port {
                name,
                binding,
                address,
            }) => {
                let address = address.ok_or_else(|| Error::MissingChild {
                    element: "port",
                    child: "address",
                    url: context.url.clone(),
                    position,
                })?;

                match next {
                    Some(ParseState::Service { ref mut ports, .. }) => ports.push(Port {
                        name: context.target_named(name, position)?,
                        binding,
                        address,
                    }),

                    _ => {
                        return Err(self.unsupported(
                            context,
                            String::from("port in unexpected position"),
                            position,
                        ))
                    }
                }
            }

            Some(ParseState::Types | ParseState::Import | ParseState::Other(..)) | None => (),
        }

        stack.extend(next);
        context.pop_scope();
        Ok(())
    }

    fn handle_text<B: BufRead>(
        &mut self,
        context: &DocumentContext,
        stack: &mut Vec<ParseState>,
        reader: &Reader<B>,
        text: BytesText<'_>,
    ) -> Result<(), Error> {
        let position = reader.buffer_position();
        let unescaped = self.decode(context, position, text.unescaped().map_err(Into::into))?;
        let decoded = self.decode(context, position, reader.decode(unescaped.as_ref()).map_err(Into::into))?;

        if let Some(ParseState::Documentation(text)) = stack.last_mut() {
            // Captured verbatim, whitespace intact.
            text.get_or_insert_with(String::new).push_str(decoded);
        }

        Ok(())
    }
}

pub(crate) fn parse(url: Url) -> Result<WebServiceDescription, Error> {
    let mut parser = Parser::default();
    parser.parse_url(url)?;

    WebServiceDescription::from_parts(
        parser.bindings,
        parser.messages,
        parser.port_types,
        parser.services,
        merge_schemas(parser.schemas),
    )
}
