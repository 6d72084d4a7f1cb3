use std::fs;
use std::io;

use tracing::debug;
use url::Url;

use crate::error::Error;

/// Fetches the raw bytes of a WSDL/XSD document.
///
/// The failure modes are kept distinct so a broken import is never
/// misreported further up as a valid-but-empty document: a missing
/// resource is `NotFound`, a zero-byte resource is `EmptyDocument`, and
/// anything else surfaces the underlying I/O or network error together
/// with the originating URL.
pub(crate) fn fetch(url: &Url) -> Result<Vec<u8>, Error> {
    debug!(%url, "fetching document");

    let bytes = match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|()| Error::PathConversion(None))?;

            fs::read(&path).map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => Error::NotFound { url: url.clone() },
                _ => Error::Io {
                    url: url.clone(),
                    source,
                },
            })?
        }

        "http" | "https" => {
            let response = reqwest::blocking::get(url.clone()).map_err(|source| Error::Fetch {
                url: url.clone(),
                source,
            })?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(Error::NotFound { url: url.clone() });
            }

            let response = response.error_for_status().map_err(|source| Error::Fetch {
                url: url.clone(),
                source,
            })?;

            response
                .bytes()
                .map_err(|source| Error::Fetch {
                    url: url.clone(),
                    source,
                })?
                .to_vec()
        }

        other => return Err(Error::UnsupportedScheme(other.to_owned())),
    };

    if bytes.is_empty() {
        return Err(Error::EmptyDocument { url: url.clone() });
    }

    Ok(bytes)
}
