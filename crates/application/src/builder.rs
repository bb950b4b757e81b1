//! Request builder: definition + globals + run-time inputs → wire-ready
//! request.

use quiver_domain::{BodyEncoding, Header, RequestDef, RequestSpec};
use thiserror::Error;
use url::Url;
use url::form_urlencoded;

use crate::globals::Globals;
use crate::ports::cache::ResponseCache;
use crate::resolve::body::{BodyError, resolve_body};
use crate::resolve::reference::{ReferenceError, resolve_reference};

/// The user-agent sent when a definition does not set its own.
pub const USER_AGENT: &str = concat!("quiver/", env!("CARGO_PKG_VERSION"));

/// Errors from request building.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A `@token` path segment resolved to a value with no textual form.
    #[error("path segment '{segment}' resolved to {type_name}; expected a string, number or boolean")]
    InvalidPathSegmentType {
        /// The segment token as written.
        segment: String,
        /// JSON type the reference resolved to.
        type_name: &'static str,
    },

    /// A `@token` query value resolved to a value with no textual form.
    #[error("query parameter '{name}' resolved to {type_name}; expected a string, number or boolean")]
    InvalidQueryValueType {
        /// The query parameter name.
        name: String,
        /// JSON type the reference resolved to.
        type_name: &'static str,
    },

    /// The base URL cannot carry path segments.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// A path or query reference failed to resolve.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// The body failed to resolve.
    #[error(transparent)]
    Body(#[from] BodyError),
}

/// Builds a fully resolved request from a definition.
///
/// Path segments and query values beginning with `@` are resolved
/// through `cache`/`args`; the body is resolved per its encoding; headers
/// are merged later-wins: global defaults, then the definition's own
/// headers, then computed gap-fillers (`host`, `user-agent`, and
/// `content-type: application/json` for JSON bodies).
///
/// Any resolution failure aborts the whole build — a partially resolved
/// request is never returned.
///
/// # Errors
///
/// See [`BuildError`].
pub fn build_request(
    def: &RequestDef,
    globals: &Globals,
    args: &[String],
    cache: &dyn ResponseCache,
) -> Result<RequestSpec, BuildError> {
    let (path_text, query_text) = match def.path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (def.path.as_str(), None),
    };

    let mut url = globals.base_url.clone();
    resolve_path(&mut url, path_text, args, cache)?;

    let query_string = match query_text {
        Some(text) => resolve_query(text, args, cache)?,
        None => String::new(),
    };

    let mut body = None;
    let mut body_is_json = false;
    if let Some(body_def) = &def.body {
        body = Some(resolve_body(body_def, &mut |token| {
            resolve_reference(token, args, cache)
        })?);
        body_is_json = body_def.encoding == BodyEncoding::YamlToJson;
    }

    let authority = authority_of(&url);
    let headers = merge_headers(def, globals, &authority, body_is_json);

    Ok(RequestSpec {
        method: def.method.clone(),
        scheme: url.scheme().to_string(),
        host: authority,
        path: url.path().to_string(),
        query_string,
        headers,
        body,
    })
}

/// Joins the definition path onto the base URL, resolving `@` segments.
/// Segments are pushed through the URL's segment writer, which applies
/// percent-escaping to resolved values.
fn resolve_path(
    url: &mut Url,
    path_text: &str,
    args: &[String],
    cache: &dyn ResponseCache,
) -> Result<(), BuildError> {
    let mut resolved = Vec::new();
    for segment in path_text.split('/').filter(|s| !s.is_empty()) {
        if segment.starts_with('@') {
            let scalar = resolve_reference(segment, args, cache)?;
            let text = scalar
                .as_url_text()
                .ok_or_else(|| BuildError::InvalidPathSegmentType {
                    segment: segment.to_string(),
                    type_name: scalar.type_name(),
                })?;
            resolved.push(text);
        } else {
            resolved.push(segment.to_string());
        }
    }

    let mut segments = url
        .path_segments_mut()
        .map_err(|()| BuildError::InvalidUrl("base URL cannot carry a path".to_string()))?;
    segments.pop_if_empty();
    for segment in &resolved {
        segments.push(segment);
    }
    Ok(())
}

/// Re-encodes the query string canonically, resolving `@` values.
fn resolve_query(
    query_text: &str,
    args: &[String],
    cache: &dyn ResponseCache,
) -> Result<String, BuildError> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in form_urlencoded::parse(query_text.as_bytes()) {
        if value.starts_with('@') {
            let scalar = resolve_reference(&value, args, cache)?;
            let text = scalar
                .as_url_text()
                .ok_or_else(|| BuildError::InvalidQueryValueType {
                    name: name.to_string(),
                    type_name: scalar.type_name(),
                })?;
            serializer.append_pair(&name, &text);
        } else {
            serializer.append_pair(&name, &value);
        }
    }
    Ok(serializer.finish())
}

/// URL authority: host, plus the port when one is present.
fn authority_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    url.port()
        .map_or_else(|| host.to_string(), |port| format!("{host}:{port}"))
}

/// Header merge, later wins: global defaults, the definition's own
/// headers, then computed defaults filling gaps only.
fn merge_headers(
    def: &RequestDef,
    globals: &Globals,
    authority: &str,
    body_is_json: bool,
) -> Vec<Header> {
    let mut headers: Vec<Header> = globals
        .headers
        .iter()
        .map(|(name, value)| Header::new(name.clone(), value.clone()))
        .collect();

    for (name, values) in &def.headers {
        headers.retain(|h| !h.is_named(name));
        for value in values {
            headers.push(Header::new(name.clone(), value.clone()));
        }
    }

    if !headers.iter().any(|h| h.is_named("host")) {
        headers.push(Header::new("host", authority));
    }
    if !headers.iter().any(|h| h.is_named("user-agent")) {
        headers.push(Header::new("user-agent", USER_AGENT));
    }
    if body_is_json && !headers.iter().any(|h| h.is_named("content-type")) {
        headers.push(Header::new("content-type", "application/json"));
    }

    headers
}
