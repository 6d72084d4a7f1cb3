use std::fmt;

use indexmap::IndexMap;

use crate::error::Error;

/// The universal cross-reference key: a (namespace URI, local name) pair.
///
/// Equality and hashing are structural, so references resolve across
/// documents by value rather than by any same-namespace assumption.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub namespace: String,
    pub local_name: String,
}

impl QualifiedName {
    pub fn new<N: Into<String>, L: Into<String>>(namespace: N, local_name: L) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

/// Occurrence bounds on a sequence element; decides whether the generated
/// property is scalar, optional or a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    pub min: u32,
    pub max: MaxOccurs,
}

impl Default for Occurs {
    fn default() -> Self {
        Self {
            min: 1,
            max: MaxOccurs::Bounded(1),
        }
    }
}

impl Occurs {
    pub fn is_optional(&self) -> bool {
        self.min == 0 && self.max == MaxOccurs::Bounded(1)
    }

    pub fn is_sequence(&self) -> bool {
        match self.max {
            MaxOccurs::Unbounded => true,
            MaxOccurs::Bounded(max) => max > 1,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ElementContent {
    /// A reference to a named type.
    Base(QualifiedName),
    /// An anonymous complex type nested directly inside the element.
    Complex(ComplexType),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: QualifiedName,
    pub content: ElementContent,
    pub occurs: Occurs,
}

#[derive(Debug, Clone)]
pub enum ComplexContent {
    Sequence(Vec<Element>),
    Empty,
}

/// `name` is absent only for anonymous types nested inside an element.
#[derive(Debug, Clone)]
pub struct ComplexType {
    pub name: Option<QualifiedName>,
    pub content: ComplexContent,
}

#[derive(Debug, Clone)]
pub enum SimpleContent {
    Restriction {
        base: QualifiedName,
        enumeration: Vec<String>,
    },
    /// `xsd:list` with an `itemType` reference. Recognized but not
    /// generatable; the generator rejects it explicitly.
    List { item: QualifiedName },
    /// `xsd:list` wrapping an inline simple type. Same as `List`.
    ListWrapped,
}

#[derive(Debug, Clone)]
pub struct SimpleType {
    pub name: Option<QualifiedName>,
    pub content: SimpleContent,
}

/// One logical schema per target namespace after merging. Fragments found
/// through imports are unioned append-only, in discovery order.
#[derive(Debug, Clone)]
pub struct Schema {
    pub target_namespace: String,
    pub complex_types: Vec<ComplexType>,
    pub simple_types: Vec<SimpleType>,
    pub elements: Vec<Element>,
}

impl Schema {
    pub fn new<S: Into<String>>(target_namespace: S) -> Self {
        Self {
            target_namespace: target_namespace.into(),
            complex_types: Vec::new(),
            simple_types: Vec::new(),
            elements: Vec::new(),
        }
    }

    pub fn entry_count(&self) -> usize {
        self.complex_types.len() + self.simple_types.len() + self.elements.len()
    }
}

/// A part references either a schema element (document style) or a type
/// (RPC style); the variant enforces the exactly-one rule.
#[derive(Debug, Clone)]
pub enum PartTarget {
    Element(QualifiedName),
    Type(QualifiedName),
}

#[derive(Debug, Clone)]
pub struct MessagePart {
    pub name: String,
    pub target: PartTarget,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub name: QualifiedName,
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub name: QualifiedName,
    pub input_message: QualifiedName,
    pub output_message: QualifiedName,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PortType {
    pub name: QualifiedName,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone)]
pub struct BindingOperation {
    pub name: String,
    pub action: String,
}

/// `port_type` need not share a namespace with `name`; a binding may live
/// in a different namespace than the port type it binds.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: QualifiedName,
    pub port_type: QualifiedName,
    pub operations: Vec<BindingOperation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortAddress {
    Soap11(String),
    Soap12(String),
    Http(String),
}

#[derive(Debug, Clone)]
pub struct Port {
    pub name: QualifiedName,
    pub binding: QualifiedName,
    pub address: PortAddress,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub name: QualifiedName,
    pub ports: Vec<Port>,
}

/// Where a schema-level declaration lives: (schema index, item index).
type SchemaSlot = (usize, usize);

#[derive(Debug, Default, Clone)]
struct Indices {
    bindings: IndexMap<QualifiedName, usize>,
    messages: IndexMap<QualifiedName, usize>,
    port_types: IndexMap<QualifiedName, usize>,
    services: IndexMap<QualifiedName, usize>,
    elements: IndexMap<QualifiedName, SchemaSlot>,
    complex_types: IndexMap<QualifiedName, SchemaSlot>,
    simple_types: IndexMap<QualifiedName, SchemaSlot>,
}

/// The raw, validated union of every document reachable from the root,
/// indexed by qualified name for O(1) cross-reference lookups.
#[derive(Debug, Default, Clone)]
pub struct WebServiceDescription {
    pub bindings: Vec<Binding>,
    pub messages: Vec<Message>,
    pub port_types: Vec<PortType>,
    pub services: Vec<Service>,
    pub schemas: Vec<Schema>,
    indices: Indices,
}

fn insert_unique<V>(
    index: &mut IndexMap<QualifiedName, V>,
    name: &QualifiedName,
    value: V,
    collection: &'static str,
) -> Result<(), Error> {
    if index.insert(name.clone(), value).is_some() {
        return Err(Error::DuplicateDefinition {
            name: name.clone(),
            collection,
        });
    }

    Ok(())
}

impl WebServiceDescription {
    /// Assembles the aggregate root from loaded collections and builds
    /// the lookup indices; the result is immutable from here on.
    pub(crate) fn from_parts(
        bindings: Vec<Binding>,
        messages: Vec<Message>,
        port_types: Vec<PortType>,
        services: Vec<Service>,
        schemas: Vec<Schema>,
    ) -> Result<Self, Error> {
        let mut description = Self {
            bindings,
            messages,
            port_types,
            services,
            schemas,
            indices: Indices::default(),
        };

        description.build_indices()?;
        Ok(description)
    }

    /// Builds the qualified-name indices over every collection. A duplicate
    /// top-level name anywhere is a definition error, never silent
    /// shadowing. Called once after loading and merging complete.
    fn build_indices(&mut self) -> Result<(), Error> {
        let mut indices = Indices::default();

        for (idx, binding) in self.bindings.iter().enumerate() {
            insert_unique(&mut indices.bindings, &binding.name, idx, "bindings")?;
        }

        for (idx, message) in self.messages.iter().enumerate() {
            insert_unique(&mut indices.messages, &message.name, idx, "messages")?;
        }

        for (idx, port_type) in self.port_types.iter().enumerate() {
            insert_unique(&mut indices.port_types, &port_type.name, idx, "port types")?;
        }

        for (idx, service) in self.services.iter().enumerate() {
            insert_unique(&mut indices.services, &service.name, idx, "services")?;
        }

        for (schema_idx, schema) in self.schemas.iter().enumerate() {
            for (idx, element) in schema.elements.iter().enumerate() {
                insert_unique(
                    &mut indices.elements,
                    &element.name,
                    (schema_idx, idx),
                    "schema elements",
                )?;
            }

            // Top-level types are always named; the parser rejects
            // anonymous declarations outside of an element.
            for (idx, complex) in schema.complex_types.iter().enumerate() {
                if let Some(name) = &complex.name {
                    insert_unique(
                        &mut indices.complex_types,
                        name,
                        (schema_idx, idx),
                        "schema complex types",
                    )?;
                }
            }

            for (idx, simple) in schema.simple_types.iter().enumerate() {
                if let Some(name) = &simple.name {
                    insert_unique(
                        &mut indices.simple_types,
                        name,
                        (schema_idx, idx),
                        "schema simple types",
                    )?;
                }
            }
        }

        self.indices = indices;
        Ok(())
    }

    pub fn binding(&self, name: &QualifiedName) -> Option<&Binding> {
        self.indices.bindings.get(name).map(|&idx| &self.bindings[idx])
    }

    pub fn message(&self, name: &QualifiedName) -> Option<&Message> {
        self.indices.messages.get(name).map(|&idx| &self.messages[idx])
    }

    pub fn port_type(&self, name: &QualifiedName) -> Option<&PortType> {
        self.indices.port_types.get(name).map(|&idx| &self.port_types[idx])
    }

    pub fn service(&self, name: &QualifiedName) -> Option<&Service> {
        self.indices.services.get(name).map(|&idx| &self.services[idx])
    }

    pub fn element(&self, name: &QualifiedName) -> Option<&Element> {
        self.indices
            .elements
            .get(name)
            .map(|&(schema, idx)| &self.schemas[schema].elements[idx])
    }

    pub fn complex_type(&self, name: &QualifiedName) -> Option<&ComplexType> {
        self.indices
            .complex_types
            .get(name)
            .map(|&(schema, idx)| &self.schemas[schema].complex_types[idx])
    }

    pub fn simple_type(&self, name: &QualifiedName) -> Option<&SimpleType> {
        self.indices
            .simple_types
            .get(name)
            .map(|&(schema, idx)| &self.schemas[schema].simple_types[idx])
    }
}

/// Unions schema fragments per target namespace, preserving the order in
/// which each namespace was first discovered and the order of entries
/// within it.
pub(crate) fn merge_schemas(fragments: Vec<Schema>) -> Vec<Schema> {
    let mut merged: IndexMap<String, Schema> = IndexMap::new();

    for fragment in fragments {
        let entry = merged
            .entry(fragment.target_namespace.clone())
            .or_insert_with(|| Schema::new(fragment.target_namespace.clone()));

        entry.complex_types.extend(fragment.complex_types);
        entry.simple_types.extend(fragment.simple_types);
        entry.elements.extend(fragment.elements);
    }

    merged.into_values().collect()
}
