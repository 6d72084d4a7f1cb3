//! Loading and modeling of SOAP web service descriptions.
//!
//! Given the URI of a root WSDL (or bare XSD) document, this crate fetches
//! it, recursively resolves every `import`/`include` it reaches, merges
//! same-namespace schema fragments, and produces an immutable
//! [`types::WebServiceDescription`] indexed by qualified name.

use std::path::Path;
use url::Url;

mod loader;
mod parser;

pub mod error;
pub mod types;

/// Loads a web service description from a URL or a local file path.
pub fn parse<S: AsRef<str>>(url: S) -> Result<types::WebServiceDescription, error::Error> {
    let url = match Url::parse(url.as_ref()) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let path = Path::new(url.as_ref())
                .canonicalize()
                .map_err(|err| error::Error::PathConversion(Some(err)))?;

            Url::from_file_path(&path).map_err(|()| error::Error::PathConversion(None))?
        }
        Err(err) => return Err(err.into()),
    };

    parser::parse(url)
}
