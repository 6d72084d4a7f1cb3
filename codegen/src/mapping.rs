//! The type mapping registry: assigns every referenced type or element
//! qualified name a unique, stable generated identifier.
//!
//! Types and elements live in separate keyspaces because XSD allows a type
//! and an element to share a local name. Identifiers are derived from the
//! local name through a pluggable, deterministic [`NamingPolicy`];
//! injectivity over visible declarations is enforced at assignment time.

use indexmap::IndexMap;

use froth_wsdl::types::QualifiedName;

use crate::error::Error;

pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Suffix for the synthesized name of an anonymous complex type nested
/// inside a sequence element.
const NESTED_SUFFIX: &str = "Contents";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ref {
    Type(QualifiedName),
    Element(QualifiedName),
}

impl Ref {
    fn qualified_name(&self) -> &QualifiedName {
        match self {
            Ref::Type(name) | Ref::Element(name) => name,
        }
    }
}

/// Sanitization of XML local names into generated-code identifiers. Any
/// implementation must be deterministic and total over legal XML local
/// names; injectivity is checked by the registry, not assumed.
pub trait NamingPolicy {
    /// Identifier for a type or element declaration.
    fn type_name(&self, local_name: &str) -> String;

    /// Identifier for a record property.
    fn property_name(&self, local_name: &str) -> String;

    /// Identifier for an enum case, derived from the literal.
    fn case_name(&self, literal: &str) -> String;
}

/// Words escaped (with a trailing underscore) regardless of target
/// language; the list errs on the side of the common keyword pool.
const RESERVED: &[&str] = &[
    "abstract", "as", "break", "case", "catch", "class", "const", "continue", "default", "do",
    "else", "enum", "false", "final", "fn", "for", "func", "if", "impl", "import", "in",
    "interface", "internal", "let", "loop", "match", "new", "nil", "null", "private", "protected",
    "public", "return", "self", "static", "struct", "super", "switch", "throw", "trait", "true",
    "try", "type", "use", "var", "where", "while",
];

fn escape_reserved(mut identifier: String) -> String {
    if RESERVED.contains(&identifier.as_str()) {
        identifier.push('_');
    }

    identifier
}

fn guard_leading_digit(identifier: String) -> String {
    match identifier.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("_{}", identifier),
        Some(_) => identifier,
        None => String::from("_"),
    }
}

/// Splits on identifier-invalid characters and upper-cases each segment's
/// first letter, keeping inner capitalization.
fn upper_camel(name: &str) -> String {
    let mut result = String::with_capacity(name.len());

    for segment in name.split(|c: char| !c.is_alphanumeric()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.extend(chars);
        }
    }

    guard_leading_digit(result)
}

pub struct DefaultNaming;

impl NamingPolicy for DefaultNaming {
    fn type_name(&self, local_name: &str) -> String {
        escape_reserved(upper_camel(local_name))
    }

    fn property_name(&self, local_name: &str) -> String {
        let mut result = String::with_capacity(local_name.len());
        let mut previous_breaks = false;

        for c in local_name.chars() {
            if !c.is_alphanumeric() {
                result.push('_');
                previous_breaks = false;
                continue;
            }

            if c.is_uppercase() {
                if previous_breaks {
                    result.push('_');
                }
                result.extend(c.to_lowercase());
            } else {
                result.push(c);
            }

            previous_breaks = c.is_lowercase() || c.is_ascii_digit();
        }

        escape_reserved(guard_leading_digit(result))
    }

    fn case_name(&self, literal: &str) -> String {
        escape_reserved(upper_camel(literal))
    }
}

/// Fixed target-agnostic identifiers for the XSD built-in types. An
/// unmapped built-in is an unsupported construct, never a guess.
fn builtin_identifier(local_name: &str) -> Option<&'static str> {
    Some(match local_name {
        "string" | "normalizedString" | "token" | "NMTOKEN" | "NCName" | "Name" | "language"
        | "ID" | "IDREF" => "String",
        "boolean" => "Boolean",
        "byte" => "Byte",
        "short" => "Short",
        "int" => "Int",
        "long" => "Long",
        "unsignedByte" => "UnsignedByte",
        "unsignedShort" => "UnsignedShort",
        "unsignedInt" => "UnsignedInt",
        "unsignedLong" => "UnsignedLong",
        "integer" | "nonNegativeInteger" | "positiveInteger" | "nonPositiveInteger"
        | "negativeInteger" => "Integer",
        "decimal" => "Decimal",
        "float" => "Float",
        "double" => "Double",
        "dateTime" => "DateTime",
        "date" => "Date",
        "time" => "Time",
        "duration" => "Duration",
        "base64Binary" => "Base64Binary",
        "hexBinary" => "HexBinary",
        "anyURI" => "Uri",
        "QName" => "QualifiedName",
        _ => return None,
    })
}

pub struct TypeMapping {
    policy: Box<dyn NamingPolicy>,
    identifiers: IndexMap<Ref, String>,
    assigned_types: IndexMap<String, QualifiedName>,
    assigned_elements: IndexMap<String, QualifiedName>,
}

impl Default for TypeMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeMapping {
    pub fn new() -> Self {
        Self::with_policy(Box::new(DefaultNaming))
    }

    pub fn with_policy(policy: Box<dyn NamingPolicy>) -> Self {
        Self {
            policy,
            identifiers: IndexMap::new(),
            assigned_types: IndexMap::new(),
            assigned_elements: IndexMap::new(),
        }
    }

    /// Returns the generated identifier for a reference, assigning a fresh
    /// one on first lookup. Idempotent: the same reference always yields
    /// the same identifier.
    pub fn identifier_for(&mut self, reference: &Ref) -> Result<String, Error> {
        if let Some(existing) = self.identifiers.get(reference) {
            return Ok(existing.clone());
        }

        let name = reference.qualified_name();

        let identifier = if name.namespace == XSD_NAMESPACE {
            builtin_identifier(&name.local_name)
                .map(ToOwned::to_owned)
                .ok_or_else(|| Error::UnsupportedConstruct {
                    construct: format!("built-in type xsd:{}", name.local_name),
                })?
        } else {
            let identifier = self.policy.type_name(&name.local_name);

            let assigned = match reference {
                Ref::Type(..) => &mut self.assigned_types,
                Ref::Element(..) => &mut self.assigned_elements,
            };

            if let Some(first) = assigned.get(&identifier) {
                return Err(Error::NameCollision {
                    identifier,
                    first: first.clone(),
                    second: name.clone(),
                });
            }

            assigned.insert(identifier.clone(), name.clone());
            identifier
        };

        self.identifiers.insert(reference.clone(), identifier.clone());
        Ok(identifier)
    }

    /// Lookup without assignment, for references that must already have
    /// been generated.
    pub fn lookup(&self, reference: &Ref) -> Option<&str> {
        self.identifiers.get(reference).map(String::as_str)
    }

    /// Synthesized name for an anonymous complex type nested inside the
    /// element with the given local name: the owner's identifier plus a
    /// fixed suffix. Nested names are scoped inside their parent and are
    /// not entered into the top-level keyspaces.
    pub fn nested_type_name(&self, owner_local_name: &str) -> String {
        format!("{}{}", self.policy.type_name(owner_local_name), NESTED_SUFFIX)
    }

    pub fn property_name(&self, local_name: &str) -> String {
        self.policy.property_name(local_name)
    }

    pub fn case_name(&self, literal: &str) -> String {
        self.policy.case_name(literal)
    }

    pub fn type_name(&self, local_name: &str) -> String {
        self.policy.type_name(local_name)
    }
}

impl std::fmt::Debug for TypeMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMapping")
            .field("identifiers", &self.identifiers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn qname(local: &str) -> QualifiedName {
        QualifiedName::new("http://tempuri.org/", local)
    }

    #[test]
    fn repeated_lookups_return_the_same_identifier() {
        let mut mapping = TypeMapping::new();
        let reference = Ref::Type(qname("NumberToWords"));

        let first = mapping.identifier_for(&reference).unwrap();
        let second = mapping.identifier_for(&reference).unwrap();

        assert_eq!(first, "NumberToWords");
        assert_eq!(first, second);
    }

    #[test]
    fn type_and_element_keyspaces_never_collide() {
        let mut mapping = TypeMapping::new();

        let as_type = mapping.identifier_for(&Ref::Type(qname("Order"))).unwrap();
        let as_element = mapping.identifier_for(&Ref::Element(qname("Order"))).unwrap();

        assert_eq!(as_type, as_element);
        assert_eq!(mapping.lookup(&Ref::Type(qname("Order"))), Some("Order"));
        assert_eq!(mapping.lookup(&Ref::Element(qname("Order"))), Some("Order"));
    }

    #[test]
    fn distinct_names_with_equal_sanitization_collide() {
        let mut mapping = TypeMapping::new();

        mapping.identifier_for(&Ref::Type(qname("my-type"))).unwrap();
        let error = mapping.identifier_for(&Ref::Type(qname("my.type"))).unwrap_err();

        assert!(matches!(error, Error::NameCollision { identifier, .. } if identifier == "MyType"));
    }

    #[test]
    fn builtins_map_to_fixed_identifiers() {
        let mut mapping = TypeMapping::new();
        let string = Ref::Type(QualifiedName::new(XSD_NAMESPACE, "string"));

        assert_eq!(mapping.identifier_for(&string).unwrap(), "String");
    }

    #[test]
    fn unknown_builtin_is_an_unsupported_construct() {
        let mut mapping = TypeMapping::new();
        let any = Ref::Type(QualifiedName::new(XSD_NAMESPACE, "anyType"));

        assert!(matches!(
            mapping.identifier_for(&any).unwrap_err(),
            Error::UnsupportedConstruct { .. }
        ));
    }

    #[test]
    fn sanitization_handles_awkward_local_names() {
        let naming = DefaultNaming;

        assert_eq!(naming.type_name("say_nothingResponse"), "SayNothingResponse");
        assert_eq!(naming.type_name("2fast"), "_2fast");
        assert_eq!(naming.property_name("NumberToWordsResult"), "number_to_words_result");
        assert_eq!(naming.property_name("type"), "type_");
        assert_eq!(naming.case_name("in-progress"), "InProgress");
        assert_eq!(naming.case_name("100"), "_100");
    }
}
