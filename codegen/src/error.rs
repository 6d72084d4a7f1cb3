use thiserror::Error;

use froth_wsdl::types::QualifiedName;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error loading web service description")]
    Wsdl(#[from] froth_wsdl::error::Error),

    /// A qualified-name reference with no definition in the collection it
    /// was expected in.
    #[error("'{name}' not found in {collection}")]
    UnresolvedReference {
        name: QualifiedName,
        collection: &'static str,
    },

    /// A port type operation with no same-named operation in the binding.
    #[error("operation '{operation}' has no matching operation in binding '{binding}'")]
    MissingBindingOperation {
        operation: QualifiedName,
        binding: QualifiedName,
    },

    #[error("message '{message}' has no parts")]
    MessageWithoutParts { message: QualifiedName },

    /// Mixed-protocol services are expected input; a service with no
    /// SOAP 1.1 port fails rather than picking an arbitrary binding.
    #[error("service '{service}' has no SOAP 1.1 port")]
    NoSoap11Port { service: QualifiedName },

    /// A recognized-but-unimplemented schema shape; a modeling gap, not a
    /// malformed document.
    #[error("unsupported schema construct: {construct}")]
    UnsupportedConstruct { construct: String },

    /// Two distinct top-level qualified names sanitized to the same
    /// generated identifier.
    #[error("generated identifier '{identifier}' collides: '{first}' and '{second}'")]
    NameCollision {
        identifier: String,
        first: QualifiedName,
        second: QualifiedName,
    },

    #[error("enum '{enum_name}' has duplicate case '{case}'")]
    DuplicateEnumCase { enum_name: String, case: String },
}
