//! URL Composition
//!
//! Textual URL composition shared by the OAuth2 client: append a path
//! suffix and a query fragment to a base URL without normalizing it.

use url::Url;

use crate::error::Error;

/// Append `path` and `query` to `base`.
///
/// The base is parsed into scheme/host/path/query; the new path is the
/// existing path (leading slash stripped) followed by `path`, and the new
/// query is the existing query followed by `&` and `query` when both are
/// non-empty. The result keeps query keys in order, with the existing query
/// first, and performs no percent-re-encoding or de-duplication.
pub fn compose(base: &str, path: &str, query: &str) -> Result<String, Error> {
    let parsed = Url::parse(base).map_err(|_| Error::MalformedUrl {
        url: base.to_string(),
    })?;

    let host = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => {
            return Err(Error::MalformedUrl {
                url: base.to_string(),
            })
        }
    };

    let base_path = parsed.path().trim_start_matches('/');
    let joined_path = format!("{base_path}{path}");

    let joined_query = match (parsed.query(), query.is_empty()) {
        (Some(existing), false) => format!("{existing}&{query}"),
        (Some(existing), true) => existing.to_string(),
        (None, _) => query.to_string(),
    };

    Ok(format!(
        "{}://{}/{}?{}",
        parsed.scheme(),
        host,
        joined_path,
        joined_query
    ))
}

/// URL-encode ordered key/value pairs as a query string.
pub fn encode_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
