use thiserror::Error;
use url::Url;

use crate::types::QualifiedName;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to parse provided URL")]
    UrlParse(#[from] url::ParseError),

    #[error("unable to convert provided path to a URL")]
    PathConversion(Option<std::io::Error>),

    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("document not found: {url}")]
    NotFound { url: Url },

    #[error("document is empty: {url}")]
    EmptyDocument { url: Url },

    #[error("unable to read {url}: {source}")]
    Io {
        url: Url,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to fetch {url}: {source}")]
    Fetch {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed XML in {url} at byte {position}: {source}")]
    Xml {
        url: Url,
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("element '{element}' in {url} at byte {position} is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
        url: Url,
        position: usize,
    },

    #[error("attribute '{attribute}' on '{element}' in {url} at byte {position} has invalid value '{value}'")]
    InvalidAttribute {
        element: String,
        attribute: &'static str,
        value: String,
        url: Url,
        position: usize,
    },

    #[error("element '{element}' in {url} at byte {position} has no '{child}' child")]
    MissingChild {
        element: &'static str,
        child: &'static str,
        url: Url,
        position: usize,
    },

    #[error("unresolvable namespace prefix '{prefix}' in {url} at byte {position}")]
    UnresolvedPrefix {
        prefix: String,
        url: Url,
        position: usize,
    },

    #[error("message part '{part}' in {url} must have exactly one of 'element' or 'type'")]
    InvalidPart { part: String, url: Url },

    #[error("unsupported construct '{construct}' in {url} at byte {position}")]
    UnsupportedConstruct {
        construct: String,
        url: Url,
        position: usize,
    },

    #[error("duplicate definition of '{name}' in {collection}")]
    DuplicateDefinition {
        name: QualifiedName,
        collection: &'static str,
    },
}
