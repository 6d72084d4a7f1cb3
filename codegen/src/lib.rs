//! Transformation of a loaded web service description into a
//! target-agnostic Interface Description: record types, enum types, and
//! one client interface per service, ready for a renderer to emit as
//! source text.

mod generator;

pub mod error;
pub mod mapping;
pub mod types;

pub use generator::{generate, generate_with};

use mapping::TypeMapping;
use types::InterfaceDescription;

/// Loads the web service description at the given URL or path and
/// generates its Interface Description.
pub fn from_url<S: AsRef<str>>(
    url: S,
) -> Result<(InterfaceDescription, TypeMapping), error::Error> {
    let description = froth_wsdl::parse(url)?;
    generate(&description)
}
