//! The target-agnostic Interface Description: what a renderer consumes to
//! emit source text without re-consulting the raw WSDL/XSD model.

use indexmap::IndexMap;

use froth_wsdl::types::QualifiedName;

/// How often a property value occurs in an instance document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Optional,
    Sequence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub type_name: String,
    pub cardinality: Cardinality,
}

/// A generated record. `base` marks the record as a subtype/alias of an
/// already-generated type (wrapper elements over primitive content keep
/// their own named type this way). Nested declarations are scoped inside
/// the record and are not visible at top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    pub name: String,
    pub base: Option<String>,
    pub properties: Vec<Property>,
    pub nested: Vec<Declaration>,
}

/// A closed string-backed enumeration; `cases` maps each generated case
/// identifier to the original literal, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub raw_type: String,
    pub cases: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Record(RecordType),
    Enum(EnumType),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Record(record) => &record.name,
            Declaration::Enum(enumeration) => &enumeration.name,
        }
    }
}

/// A method payload: the message part's anchor element (or, for RPC-style
/// messages, its type) and the generated type that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPayload {
    pub element: QualifiedName,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMethod {
    pub operation: String,
    pub input: MethodPayload,
    pub output: MethodPayload,
    pub action: String,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInterface {
    pub name: String,
    pub endpoint: String,
    pub methods: Vec<ServiceMethod>,
}

/// The generated model: top-level declarations in source order plus one
/// client interface per service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceDescription {
    pub declarations: Vec<Declaration>,
    pub clients: Vec<ClientInterface>,
}
